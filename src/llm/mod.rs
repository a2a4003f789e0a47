use tracing::{debug, warn};

pub mod prompts;
pub mod providers;

use crate::config::{LlmConfig, ReplyConfig};
use crate::error::ReviewDeskResult;
use crate::marketplace::{FeedbackItem, QuestionItem};

pub use providers::{create_provider, ChatProvider};

/// Drafts replies by sending one prompt per item to the configured
/// chat-completion provider. Model output is passed through verbatim
/// (trimmed) for operator review.
pub struct ReplyGenerator {
    provider: Box<dyn ChatProvider>,
    retry_once: bool,
    instruction: String,
    signature: String,
}

impl ReplyGenerator {
    /// Create generator for the configured provider
    pub fn new(llm: &LlmConfig, reply: &ReplyConfig) -> ReviewDeskResult<Self> {
        let provider = create_provider(llm)?;
        debug!("Reply generator using provider {}", provider.name());

        Ok(Self {
            provider,
            retry_once: llm.retry_once,
            instruction: reply.instruction.clone(),
            signature: reply.signature.clone(),
        })
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Draft a reply to a product review
    pub async fn draft_for_feedback(&self, item: &FeedbackItem) -> ReviewDeskResult<String> {
        let prompt = prompts::build_feedback_prompt(item, &self.instruction, &self.signature);
        self.complete_with_retry(&prompt).await
    }

    /// Draft a reply to a buyer question
    pub async fn draft_for_question(&self, item: &QuestionItem) -> ReviewDeskResult<String> {
        let prompt = prompts::build_question_prompt(item, &self.instruction, &self.signature);
        self.complete_with_retry(&prompt).await
    }

    /// One immediate retry on recoverable failures, nothing more. Items that
    /// still fail stay pending and can be retried on a later pass.
    async fn complete_with_retry(&self, prompt: &str) -> ReviewDeskResult<String> {
        match self.provider.complete(prompt).await {
            Ok(text) => Ok(text),
            Err(e) if self.retry_once && e.is_recoverable() => {
                warn!("Draft generation failed, retrying once: {}", e);
                self.provider.complete(prompt).await
            }
            Err(e) => Err(e),
        }
    }

    #[cfg(test)]
    fn with_provider(provider: Box<dyn ChatProvider>, retry_once: bool) -> Self {
        Self {
            provider,
            retry_once,
            instruction: String::new(),
            signature: "Подпись".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviewDeskError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyProvider {
        calls: AtomicU32,
        fail_first: bool,
        recoverable: bool,
    }

    impl FlakyProvider {
        fn new(fail_first: bool, recoverable: bool) -> Self {
            Self { calls: AtomicU32::new(0), fail_first, recoverable }
        }
    }

    #[async_trait]
    impl ChatProvider for FlakyProvider {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn complete(&self, _prompt: &str) -> ReviewDeskResult<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 && self.fail_first {
                if self.recoverable {
                    Err(ReviewDeskError::provider("flaky", "temporary outage"))
                } else {
                    Err(ReviewDeskError::MissingCredential { name: "LLM API key".to_string() })
                }
            } else {
                Ok("Спасибо за отзыв!".to_string())
            }
        }
    }

    fn sample_feedback() -> FeedbackItem {
        serde_json::from_value(serde_json::json!({
            "id": "fb-1",
            "text": "Всё отлично",
            "productValuation": 5,
            "createdDate": "2024-01-09T17:24:13+03:00",
            "productDetails": {"nmId": 1, "productName": "Куртка", "supplierArticle": "A", "brandName": "B"}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let generator =
            ReplyGenerator::with_provider(Box::new(FlakyProvider::new(true, true)), true);
        let draft = generator.draft_for_feedback(&sample_feedback()).await.unwrap();
        assert_eq!(draft, "Спасибо за отзыв!");
    }

    #[tokio::test]
    async fn test_no_retry_when_disabled() {
        let generator =
            ReplyGenerator::with_provider(Box::new(FlakyProvider::new(true, true)), false);
        assert!(generator.draft_for_feedback(&sample_feedback()).await.is_err());
    }

    #[tokio::test]
    async fn test_no_retry_for_unrecoverable_errors() {
        let provider = FlakyProvider::new(true, false);
        let generator = ReplyGenerator::with_provider(Box::new(provider), true);
        let error = generator.draft_for_feedback(&sample_feedback()).await.unwrap_err();
        assert_eq!(error.category(), "configuration");
    }

    #[test]
    fn test_generator_rejects_unknown_provider() {
        let mut config = crate::config::AppConfig::default();
        config.llm.provider = "local-llama".to_string();
        assert!(ReplyGenerator::new(&config.llm, &config.reply).is_err());
    }
}
