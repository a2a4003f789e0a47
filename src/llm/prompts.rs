/// Prompt templates for reply drafting
use crate::marketplace::{FeedbackItem, ProductDetails, QuestionItem};

/// Tone requested from the model, derived from the buyer's rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneHint {
    Grateful,
    Apologetic,
}

impl ToneHint {
    /// Ratings of 4 and 5 get a thank-you, everything below an apology
    pub fn from_rating(rating: u8) -> Self {
        if rating >= 4 {
            Self::Grateful
        } else {
            Self::Apologetic
        }
    }

    pub fn as_russian(&self) -> &'static str {
        match self {
            Self::Grateful => "благодарный и тёплый",
            Self::Apologetic => "извиняющийся, доброжелательный и конструктивный",
        }
    }
}

/// Build the single user-turn prompt for answering a product review
pub fn build_feedback_prompt(item: &FeedbackItem, instruction: &str, signature: &str) -> String {
    let tone = ToneHint::from_rating(item.product_valuation);
    let mut sections: Vec<String> = Vec::new();

    sections.push(
        "Ты менеджер магазина на маркетплейсе Wildberries. Напиши ответ покупателю на отзыв о товаре."
            .to_string(),
    );
    sections.push(format!("Товар: {}", product_label(&item.product_details)));
    if let Some(author) = item.author() {
        sections.push(format!("Имя покупателя: {author}"));
    }
    sections.push(format!("Оценка: {} из 5", item.product_valuation));
    sections.push(format!("Текст отзыва: {}", feedback_body(item)));
    if let Some(pros) = non_empty(item.pros.as_deref()) {
        sections.push(format!("Достоинства по мнению покупателя: {pros}"));
    }
    if let Some(cons) = non_empty(item.cons.as_deref()) {
        sections.push(format!("Недостатки по мнению покупателя: {cons}"));
    }
    sections.push(format!("Тон ответа: {}.", tone.as_russian()));
    push_shared_requirements(&mut sections, instruction, signature);

    sections.join("\n")
}

/// Build the single user-turn prompt for answering a buyer question
pub fn build_question_prompt(item: &QuestionItem, instruction: &str, signature: &str) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(
        "Ты менеджер магазина на маркетплейсе Wildberries. Ответь покупателю на вопрос о товаре."
            .to_string(),
    );
    sections.push(format!("Товар: {}", product_label(&item.product_details)));
    if let Some(author) = item.author() {
        sections.push(format!("Имя покупателя: {author}"));
    }
    sections.push(format!("Вопрос покупателя: {}", question_body(item)));
    sections.push("Тон ответа: вежливый и информативный.".to_string());
    push_shared_requirements(&mut sections, instruction, signature);

    sections.join("\n")
}

fn push_shared_requirements(sections: &mut Vec<String>, instruction: &str, signature: &str) {
    let instruction = instruction.trim();
    if !instruction.is_empty() {
        sections.push(format!("Дополнительные указания: {instruction}"));
    }
    sections.push(
        "Ответ должен быть на русском языке, без markdown-разметки, длиной 2-4 предложения."
            .to_string(),
    );
    sections.push(format!("Обязательно заверши ответ подписью: «{}»", signature.trim()));
}

fn product_label(details: &ProductDetails) -> String {
    let name = details.product_name.trim();
    let brand = details.brand_name.trim();
    match (name.is_empty(), brand.is_empty()) {
        (false, false) => format!("{name} ({brand})"),
        (false, true) => name.to_string(),
        (true, false) => brand.to_string(),
        (true, true) => "товар без названия".to_string(),
    }
}

fn feedback_body(item: &FeedbackItem) -> &str {
    let body = item.body();
    if body.is_empty() {
        "отзыв без текста, покупатель поставил только оценку"
    } else {
        body
    }
}

fn question_body(item: &QuestionItem) -> &str {
    let body = item.body();
    if body.is_empty() {
        "вопрос без текста"
    } else {
        body
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feedback(rating: u8, text: &str) -> FeedbackItem {
        serde_json::from_value(json!({
            "id": "fb-1",
            "text": text,
            "pros": "Качество",
            "cons": "",
            "productValuation": rating,
            "createdDate": "2024-01-09T17:24:13+03:00",
            "productDetails": {
                "nmId": 87654321,
                "productName": "Куртка зимняя",
                "supplierArticle": "JKT-001",
                "brandName": "NordWear"
            },
            "userName": "Анна"
        }))
        .unwrap()
    }

    #[test]
    fn test_tone_boundary_is_at_four() {
        assert_eq!(ToneHint::from_rating(5), ToneHint::Grateful);
        assert_eq!(ToneHint::from_rating(4), ToneHint::Grateful);
        assert_eq!(ToneHint::from_rating(3), ToneHint::Apologetic);
        assert_eq!(ToneHint::from_rating(1), ToneHint::Apologetic);
    }

    #[test]
    fn test_feedback_prompt_high_rating() {
        let prompt = build_feedback_prompt(
            &feedback(5, "Куртка отличная!"),
            "Не обещай скидок.",
            "С уважением, NordWear",
        );

        assert!(prompt.contains("Куртка зимняя (NordWear)"));
        assert!(prompt.contains("Имя покупателя: Анна"));
        assert!(prompt.contains("Оценка: 5 из 5"));
        assert!(prompt.contains("Куртка отличная!"));
        assert!(prompt.contains("благодарный"));
        assert!(prompt.contains("Дополнительные указания: Не обещай скидок."));
        assert!(prompt.contains("«С уважением, NordWear»"));
        // pros present, empty cons omitted
        assert!(prompt.contains("Достоинства по мнению покупателя: Качество"));
        assert!(!prompt.contains("Недостатки"));
    }

    #[test]
    fn test_feedback_prompt_low_rating_is_apologetic() {
        let prompt = build_feedback_prompt(&feedback(2, "Пришла с браком"), "", "Подпись");
        assert!(prompt.contains("извиняющийся"));
        assert!(!prompt.contains("благодарный"));
        assert!(!prompt.contains("Дополнительные указания"));
    }

    #[test]
    fn test_feedback_prompt_without_text() {
        let prompt = build_feedback_prompt(&feedback(4, "   "), "", "Подпись");
        assert!(prompt.contains("отзыв без текста"));
    }

    #[test]
    fn test_question_prompt() {
        let item: QuestionItem = serde_json::from_value(json!({
            "id": "q-1",
            "text": "Есть ли размер 46?",
            "createdDate": "2024-02-01T10:30:00+03:00",
            "productDetails": {
                "nmId": 87654321,
                "productName": "Куртка зимняя",
                "supplierArticle": "JKT-001",
                "brandName": "NordWear"
            }
        }))
        .unwrap();

        let prompt = build_question_prompt(&item, "", "Подпись магазина");
        assert!(prompt.contains("Вопрос покупателя: Есть ли размер 46?"));
        assert!(prompt.contains("вежливый и информативный"));
        assert!(prompt.contains("«Подпись магазина»"));
        // questions carry no rating, so no rating line and no rating-derived tone
        assert!(!prompt.contains("Оценка:"));
    }

    #[test]
    fn test_product_label_fallbacks() {
        let full: ProductDetails = serde_json::from_value(json!({
            "nmId": 1, "productName": "Носки", "supplierArticle": "S", "brandName": "Бренд"
        }))
        .unwrap();
        assert_eq!(product_label(&full), "Носки (Бренд)");

        let nameless = ProductDetails::default();
        assert_eq!(product_label(&nameless), "товар без названия");
    }
}
