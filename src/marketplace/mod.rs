pub mod types;

use reqwest::{header, Client};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::MarketplaceConfig;
use crate::error::{ReviewDeskError, ReviewDeskResult};

pub use types::{
    FeedbackItem, ItemCategory, PhotoLink, ProductDetails, QuestionItem,
};

use types::{
    FeedbackAnswerRequest, FeedbacksResponse, QuestionAnswerBody, QuestionAnswerRequest,
    QuestionsResponse,
};

/// Request counters surfaced in the status bar
#[derive(Debug, Default)]
pub struct ClientStats {
    success_count: AtomicU64,
    error_count: AtomicU64,
}

impl ClientStats {
    fn record(&self, success: bool) {
        if success {
            self.success_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ClientStatsSnapshot {
        let success_count = self.success_count.load(Ordering::Relaxed);
        let error_count = self.error_count.load(Ordering::Relaxed);
        ClientStatsSnapshot {
            total_requests: success_count + error_count,
            success_count,
            error_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClientStatsSnapshot {
    pub total_requests: u64,
    pub success_count: u64,
    pub error_count: u64,
}

/// Authenticated client for the Wildberries seller feedbacks API.
///
/// Listing and submitting only; it keeps no item state of its own. Callers
/// treat every listing as a full replacement snapshot.
pub struct MarketplaceClient {
    client: Client,
    feedbacks_url: Url,
    questions_url: Url,
    token: String,
    page_size: usize,
    order: String,
    question_answer_state: String,
    stats: ClientStats,
}

impl MarketplaceClient {
    /// Create new client with pooled connections
    pub fn new(config: &MarketplaceConfig) -> ReviewDeskResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ReviewDeskError::config(format!("invalid marketplace base_url: {e}"))
        })?;
        let feedbacks_url = base_url
            .join("api/v1/feedbacks")
            .map_err(|e| ReviewDeskError::config(format!("invalid marketplace base_url: {e}")))?;
        let questions_url = base_url
            .join("api/v1/questions")
            .map_err(|e| ReviewDeskError::config(format!("invalid marketplace base_url: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ReviewDeskError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            feedbacks_url,
            questions_url,
            token: config.api_token.trim().to_string(),
            page_size: config.page_size,
            order: config.order.clone(),
            question_answer_state: config.question_answer_state.clone(),
            stats: ClientStats::default(),
        })
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    fn auth_token(&self) -> ReviewDeskResult<&str> {
        if self.token.is_empty() {
            return Err(ReviewDeskError::MissingCredential {
                name: "marketplace API token".to_string(),
            });
        }
        Ok(&self.token)
    }

    /// List feedbacks; `answered = false` is the pending queue, `true` the archive
    pub async fn list_feedbacks(&self, answered: bool) -> ReviewDeskResult<Vec<FeedbackItem>> {
        self.list_feedbacks_page(answered, self.page_size, 0).await
    }

    /// Same listing with explicit pagination, for callers that walk deeper
    /// than the configured page size
    pub async fn list_feedbacks_page(
        &self,
        answered: bool,
        take: usize,
        skip: usize,
    ) -> ReviewDeskResult<Vec<FeedbackItem>> {
        let token = self.auth_token()?;
        debug!("Listing feedbacks (answered: {}, take: {}, skip: {})", answered, take, skip);

        let request = self
            .client
            .get(self.feedbacks_url.clone())
            .header(header::AUTHORIZATION, token)
            .query(&[
                ("isAnswered", answered.to_string()),
                ("take", take.to_string()),
                ("skip", skip.to_string()),
                ("order", self.order.clone()),
            ]);

        let response = self.send_checked(request).await?;
        let envelope: FeedbacksResponse = response.json().await?;
        if envelope.error {
            return Err(ReviewDeskError::marketplace_api(
                envelope
                    .error_text
                    .unwrap_or_else(|| "unspecified feedbacks error".to_string()),
            ));
        }

        let data = envelope.data.unwrap_or_default();
        debug!(
            "Received {} feedbacks, {} unanswered in total",
            data.feedbacks.len(),
            data.count_unanswered
        );
        Ok(data.feedbacks)
    }

    /// List questions; same filter semantics as feedbacks
    pub async fn list_questions(&self, answered: bool) -> ReviewDeskResult<Vec<QuestionItem>> {
        self.list_questions_page(answered, self.page_size, 0).await
    }

    pub async fn list_questions_page(
        &self,
        answered: bool,
        take: usize,
        skip: usize,
    ) -> ReviewDeskResult<Vec<QuestionItem>> {
        let token = self.auth_token()?;
        debug!("Listing questions (answered: {}, take: {}, skip: {})", answered, take, skip);

        let request = self
            .client
            .get(self.questions_url.clone())
            .header(header::AUTHORIZATION, token)
            .query(&[
                ("isAnswered", answered.to_string()),
                ("take", take.to_string()),
                ("skip", skip.to_string()),
                ("order", self.order.clone()),
            ]);

        let response = self.send_checked(request).await?;
        let envelope: QuestionsResponse = response.json().await?;
        if envelope.error {
            return Err(ReviewDeskError::marketplace_api(
                envelope
                    .error_text
                    .unwrap_or_else(|| "unspecified questions error".to_string()),
            ));
        }

        let data = envelope.data.unwrap_or_default();
        debug!(
            "Received {} questions, {} unanswered in total",
            data.questions.len(),
            data.count_unanswered
        );
        Ok(data.questions)
    }

    /// Submit an answer for either category. Success is HTTP 2xx; anything
    /// else is returned with the raw status and body for operator display.
    pub async fn submit_answer(
        &self,
        category: ItemCategory,
        id: &str,
        text: &str,
    ) -> ReviewDeskResult<()> {
        match category {
            ItemCategory::Feedback => self.submit_feedback_answer(id, text).await,
            ItemCategory::Question => self.submit_question_answer(id, text).await,
        }
    }

    async fn submit_feedback_answer(&self, id: &str, text: &str) -> ReviewDeskResult<()> {
        let token = self.auth_token()?;
        let payload = FeedbackAnswerRequest { id, text };

        let request = self
            .client
            .patch(self.feedbacks_url.clone())
            .header(header::AUTHORIZATION, token)
            .json(&payload);

        match self.send_checked(request).await {
            Ok(_) => {
                info!("Feedback {} answered", id);
                Ok(())
            }
            Err(e) => Err(Self::as_submit_rejection(id, e)),
        }
    }

    async fn submit_question_answer(&self, id: &str, text: &str) -> ReviewDeskResult<()> {
        let token = self.auth_token()?;
        // The accepted `state` value has been a moving target upstream, so it
        // is configurable; empty means leave the field out entirely.
        let state = match self.question_answer_state.as_str() {
            "" => None,
            value => Some(value),
        };
        let payload = QuestionAnswerRequest {
            id,
            answer: QuestionAnswerBody { text },
            state,
        };

        let request = self
            .client
            .patch(self.questions_url.clone())
            .header(header::AUTHORIZATION, token)
            .json(&payload);

        match self.send_checked(request).await {
            Ok(_) => {
                info!("Question {} answered", id);
                Ok(())
            }
            Err(e) => Err(Self::as_submit_rejection(id, e)),
        }
    }

    /// Send a request, record counters, and turn non-2xx statuses into errors
    async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ReviewDeskResult<reqwest::Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.stats.record(false);
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            self.stats.record(true);
            Ok(response)
        } else {
            self.stats.record(false);
            let body = snippet(&response.text().await.unwrap_or_default());
            Err(ReviewDeskError::MarketplaceStatus {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn as_submit_rejection(id: &str, error: ReviewDeskError) -> ReviewDeskError {
        match error {
            ReviewDeskError::MarketplaceStatus { status, body } => {
                ReviewDeskError::SubmitRejected { id: id.to_string(), status, body }
            }
            other => other,
        }
    }
}

/// Body excerpt for error display. Char-based: response bodies are routinely
/// Cyrillic and a byte slice could split a code point.
fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 300;
    if body.chars().count() <= MAX_CHARS {
        body.trim().to_string()
    } else {
        let mut cut: String = body.chars().take(MAX_CHARS).collect();
        cut.push('…');
        cut.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn test_config() -> crate::config::MarketplaceConfig {
        let mut config = AppConfig::default().marketplace;
        config.api_token = "test-token".to_string();
        config
    }

    #[test]
    fn test_client_builds_endpoint_urls() {
        let client = MarketplaceClient::new(&test_config()).unwrap();
        assert_eq!(
            client.feedbacks_url.as_str(),
            "https://feedbacks-api.wildberries.ru/api/v1/feedbacks"
        );
        assert_eq!(
            client.questions_url.as_str(),
            "https://feedbacks-api.wildberries.ru/api/v1/questions"
        );
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let mut config = test_config();
        config.base_url = "not a url".to_string();
        assert!(MarketplaceClient::new(&config).is_err());
    }

    #[test]
    fn test_missing_token_detected_before_any_request() {
        let mut config = test_config();
        config.api_token = "   ".to_string();
        let client = MarketplaceClient::new(&config).unwrap();
        let error = client.auth_token().unwrap_err();
        assert_eq!(error.category(), "configuration");
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = ClientStats::default();
        stats.record(true);
        stats.record(true);
        stats.record(false);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.success_count, 2);
        assert_eq!(snapshot.error_count, 1);
    }

    #[test]
    fn test_snippet_is_char_safe() {
        let long: String = "ы".repeat(500);
        let cut = snippet(&long);
        assert!(cut.chars().count() <= 301);
        assert!(cut.ends_with('…'));

        assert_eq!(snippet("  короткий текст  "), "короткий текст");
    }

    #[test]
    fn test_submit_rejection_carries_item_id() {
        let error = MarketplaceClient::as_submit_rejection(
            "fb-9",
            ReviewDeskError::MarketplaceStatus { status: 400, body: "bad state".to_string() },
        );
        match error {
            ReviewDeskError::SubmitRejected { id, status, .. } => {
                assert_eq!(id, "fb-9");
                assert_eq!(status, 400);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
