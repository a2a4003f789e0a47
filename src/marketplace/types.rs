use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of pending item the marketplace tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Feedback,
    Question,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feedback => "feedback",
            Self::Question => "question",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product reference attached to every feedback and question
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(default)]
    pub imt_id: Option<i64>,
    #[serde(default)]
    pub nm_id: i64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub supplier_article: String,
    #[serde(default)]
    pub brand_name: String,
}

/// Photo attachment URLs as the marketplace delivers them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoLink {
    #[serde(default)]
    pub full_size: Option<String>,
    #[serde(default)]
    pub mini_size: Option<String>,
}

/// Seller answer already attached to a feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAnswer {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// One product review from the feedbacks endpoint. Read-only to this
/// application apart from the answer submitted back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub pros: Option<String>,
    #[serde(default)]
    pub cons: Option<String>,
    #[serde(default)]
    pub product_valuation: u8,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub answer: Option<FeedbackAnswer>,
    #[serde(default)]
    pub product_details: ProductDetails,
    #[serde(default)]
    pub photo_links: Option<Vec<PhotoLink>>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub was_viewed: bool,
}

impl FeedbackItem {
    /// Review body, trimmed; empty string when the buyer left no text
    pub fn body(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }

    /// Buyer display name, when present
    pub fn author(&self) -> Option<&str> {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    /// Smallest photo variant, for card thumbnails
    pub fn thumbnail_url(&self) -> Option<&str> {
        let links = self.photo_links.as_deref()?;
        links
            .iter()
            .find_map(|link| link.mini_size.as_deref().or(link.full_size.as_deref()))
    }
}

/// Seller answer already attached to a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    #[serde(default)]
    pub text: String,
}

/// One buyer question from the questions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItem {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub answer: Option<QuestionAnswer>,
    #[serde(default)]
    pub product_details: ProductDetails,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub was_viewed: bool,
}

impl QuestionItem {
    pub fn body(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn author(&self) -> Option<&str> {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

// Response envelopes. Every payload nests the item array under `data` and
// carries an error flag that can be set even on HTTP 200.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbacksResponse {
    #[serde(default)]
    pub data: Option<FeedbacksData>,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub error_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbacksData {
    #[serde(default)]
    pub count_unanswered: u64,
    #[serde(default)]
    pub feedbacks: Vec<FeedbackItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResponse {
    #[serde(default)]
    pub data: Option<QuestionsData>,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub error_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsData {
    #[serde(default)]
    pub count_unanswered: u64,
    #[serde(default)]
    pub questions: Vec<QuestionItem>,
}

// Submit payloads

#[derive(Debug, Serialize)]
pub struct FeedbackAnswerRequest<'a> {
    pub id: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct QuestionAnswerRequest<'a> {
    pub id: &'a str,
    pub answer: QuestionAnswerBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct QuestionAnswerBody<'a> {
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const FEEDBACKS_FIXTURE: &str = r#"{
        "data": {
            "countUnanswered": 2,
            "feedbacks": [
                {
                    "id": "rJnXanABQxyQdA1w",
                    "text": "Куртка отличная, размер подошёл.",
                    "pros": "Тёплая",
                    "cons": "",
                    "productValuation": 5,
                    "createdDate": "2024-01-09T17:24:13+03:00",
                    "state": "none",
                    "answer": null,
                    "productDetails": {
                        "imtId": 12345678,
                        "nmId": 87654321,
                        "productName": "Куртка зимняя",
                        "supplierArticle": "JKT-001",
                        "brandName": "NordWear"
                    },
                    "photoLinks": [
                        {
                            "fullSize": "https://feedback.example/full/1.jpg",
                            "miniSize": "https://feedback.example/mini/1.jpg"
                        }
                    ],
                    "userName": "Анна",
                    "wasViewed": false
                },
                {
                    "id": "kLmNop123",
                    "text": null,
                    "productValuation": 2,
                    "createdDate": "2024-01-08T09:00:00Z",
                    "productDetails": {
                        "nmId": 11111111,
                        "productName": "Носки",
                        "supplierArticle": "SCK-9",
                        "brandName": "NordWear"
                    },
                    "photoLinks": null,
                    "wasViewed": true
                }
            ]
        },
        "error": false,
        "errorText": ""
    }"#;

    #[test]
    fn test_parse_feedbacks_envelope() {
        let parsed: FeedbacksResponse = serde_json::from_str(FEEDBACKS_FIXTURE).unwrap();
        assert!(!parsed.error);

        let data = parsed.data.unwrap();
        assert_eq!(data.count_unanswered, 2);
        assert_eq!(data.feedbacks.len(), 2);

        // One listing never carries the same id twice
        let ids: HashSet<&str> = data.feedbacks.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids.len(), data.feedbacks.len());

        let first = &data.feedbacks[0];
        assert_eq!(first.product_valuation, 5);
        assert_eq!(first.body(), "Куртка отличная, размер подошёл.");
        assert_eq!(first.author(), Some("Анна"));
        assert_eq!(first.product_details.product_name, "Куртка зимняя");
        assert_eq!(
            first.thumbnail_url(),
            Some("https://feedback.example/mini/1.jpg")
        );
        assert!(!first.is_answered());

        let second = &data.feedbacks[1];
        assert_eq!(second.body(), "");
        assert_eq!(second.author(), None);
        assert_eq!(second.thumbnail_url(), None);
        assert_eq!(second.created_date.to_rfc3339(), "2024-01-08T09:00:00+00:00");
    }

    #[test]
    fn test_parse_questions_envelope() {
        let fixture = r#"{
            "data": {
                "countUnanswered": 1,
                "questions": [
                    {
                        "id": "q-77",
                        "text": "Есть ли размер 46?",
                        "createdDate": "2024-02-01T10:30:00+03:00",
                        "state": "suppliersPortalSynch",
                        "answer": null,
                        "productDetails": {
                            "nmId": 87654321,
                            "productName": "Куртка зимняя",
                            "supplierArticle": "JKT-001",
                            "brandName": "NordWear"
                        },
                        "wasViewed": false
                    }
                ]
            },
            "error": false,
            "errorText": ""
        }"#;

        let parsed: QuestionsResponse = serde_json::from_str(fixture).unwrap();
        let data = parsed.data.unwrap();
        assert_eq!(data.questions.len(), 1);
        assert_eq!(data.questions[0].body(), "Есть ли размер 46?");
        assert!(!data.questions[0].is_answered());
    }

    #[test]
    fn test_parse_error_envelope() {
        let fixture = r#"{"data": null, "error": true, "errorText": "token problem"}"#;
        let parsed: FeedbacksResponse = serde_json::from_str(fixture).unwrap();
        assert!(parsed.error);
        assert_eq!(parsed.error_text.as_deref(), Some("token problem"));
        assert!(parsed.data.is_none());
    }

    #[test]
    fn test_feedback_answer_request_shape() {
        let request = FeedbackAnswerRequest { id: "fb-1", text: "Спасибо за отзыв!" };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["id"], "fb-1");
        assert_eq!(value["text"], "Спасибо за отзыв!");
    }

    #[test]
    fn test_question_answer_request_state_omitted_when_absent() {
        let with_state = QuestionAnswerRequest {
            id: "q-1",
            answer: QuestionAnswerBody { text: "Да, есть." },
            state: Some("wbViewed"),
        };
        let value = serde_json::to_value(&with_state).unwrap();
        assert_eq!(value["state"], "wbViewed");
        assert_eq!(value["answer"]["text"], "Да, есть.");

        let without_state = QuestionAnswerRequest {
            id: "q-1",
            answer: QuestionAnswerBody { text: "Да, есть." },
            state: None,
        };
        let value = serde_json::to_value(&without_state).unwrap();
        assert!(value.get("state").is_none());
    }

    #[test]
    fn test_thumbnail_falls_back_to_full_size() {
        let item: FeedbackItem = serde_json::from_str(
            r#"{
                "id": "fb-2",
                "productValuation": 4,
                "createdDate": "2024-01-01T00:00:00Z",
                "photoLinks": [{"fullSize": "https://feedback.example/full/2.jpg", "miniSize": null}]
            }"#,
        )
        .unwrap();
        assert_eq!(
            item.thumbnail_url(),
            Some("https://feedback.example/full/2.jpg")
        );
    }
}
