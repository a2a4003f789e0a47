use tracing::{info, warn};

pub mod autopilot;
pub mod session;

use crate::config::AppConfig;
use crate::error::{ReviewDeskError, ReviewDeskResult};
use crate::llm::ReplyGenerator;
use crate::marketplace::{
    ClientStatsSnapshot, FeedbackItem, ItemCategory, MarketplaceClient, QuestionItem,
};

pub use autopilot::{AutopilotEvent, AutopilotHandle, PassSummary};
pub use session::SessionState;

/// Answers shorter than this (after trimming) are rejected before any
/// network call is made
pub const MIN_ANSWER_CHARS: usize = 2;

/// Results of background work, delivered back to the presentation layer
#[derive(Debug)]
pub enum CoreEvent {
    FeedbacksLoaded {
        items: Vec<FeedbackItem>,
        archive: bool,
        notice: Option<String>,
    },
    QuestionsLoaded {
        items: Vec<QuestionItem>,
        archive: bool,
        notice: Option<String>,
    },
    DraftReady {
        category: ItemCategory,
        id: String,
        text: String,
    },
    DraftFailed {
        category: ItemCategory,
        id: String,
        message: String,
    },
    AnswerSubmitted {
        category: ItemCategory,
        id: String,
    },
    SubmitFailed {
        category: ItemCategory,
        id: String,
        message: String,
    },
    Autopilot(AutopilotEvent),
}

/// Core application: marketplace client and reply generator composed from
/// one configuration. Rebuilt from scratch when the operator changes
/// credentials; all listing/draft state lives in [`SessionState`].
pub struct ReviewDeskStudio {
    config: AppConfig,
    marketplace: MarketplaceClient,
    generator: ReplyGenerator,
}

impl ReviewDeskStudio {
    /// Initialize the core with all subsystems
    pub fn new(config: AppConfig) -> ReviewDeskResult<Self> {
        info!("Initializing ReviewDesk Studio core");

        let marketplace = MarketplaceClient::new(&config.marketplace)?;
        info!("Marketplace client initialized");

        let generator = ReplyGenerator::new(&config.llm, &config.reply)?;
        info!("Reply generator initialized ({})", generator.provider_name());

        Ok(Self { config, marketplace, generator })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.generator.provider_name()
    }

    pub fn stats(&self) -> ClientStatsSnapshot {
        self.marketplace.stats().snapshot()
    }

    /// List feedbacks, surfacing the failure to the caller
    pub async fn list_feedbacks(&self, answered: bool) -> ReviewDeskResult<Vec<FeedbackItem>> {
        self.marketplace.list_feedbacks(answered).await
    }

    /// List questions, surfacing the failure to the caller
    pub async fn list_questions(&self, answered: bool) -> ReviewDeskResult<Vec<QuestionItem>> {
        self.marketplace.list_questions(answered).await
    }

    /// Listing with explicit pagination, used by the CLI
    pub async fn list_feedbacks_page(
        &self,
        answered: bool,
        take: usize,
        skip: usize,
    ) -> ReviewDeskResult<Vec<FeedbackItem>> {
        self.marketplace.list_feedbacks_page(answered, take, skip).await
    }

    pub async fn list_questions_page(
        &self,
        answered: bool,
        take: usize,
        skip: usize,
    ) -> ReviewDeskResult<Vec<QuestionItem>> {
        self.marketplace.list_questions_page(answered, take, skip).await
    }

    /// Fail-soft listing: a failure degrades to an empty snapshot and a
    /// logged warning. Missing data means "nothing to do", never an abort.
    pub async fn fetch_feedbacks(&self, answered: bool) -> Vec<FeedbackItem> {
        match self.marketplace.list_feedbacks(answered).await {
            Ok(items) => items,
            Err(e) => {
                warn!(category = e.category(), "Failed to list feedbacks: {}", e);
                Vec::new()
            }
        }
    }

    /// Fail-soft listing for questions, same contract as feedbacks
    pub async fn fetch_questions(&self, answered: bool) -> Vec<QuestionItem> {
        match self.marketplace.list_questions(answered).await {
            Ok(items) => items,
            Err(e) => {
                warn!(category = e.category(), "Failed to list questions: {}", e);
                Vec::new()
            }
        }
    }

    /// Draft a reply for a review
    pub async fn draft_for_feedback(&self, item: &FeedbackItem) -> ReviewDeskResult<String> {
        self.generator.draft_for_feedback(item).await
    }

    /// Draft a reply for a question
    pub async fn draft_for_question(&self, item: &QuestionItem) -> ReviewDeskResult<String> {
        self.generator.draft_for_question(item).await
    }

    /// Local check applied before any network call. Char-based: answers are
    /// routinely Cyrillic, so a byte count would be wrong.
    pub fn validate_answer(text: &str) -> ReviewDeskResult<()> {
        let chars = text.trim().chars().count();
        if chars < MIN_ANSWER_CHARS {
            return Err(ReviewDeskError::DraftTooShort { chars });
        }
        Ok(())
    }

    /// Validate, then submit an answer. The item is removed from the
    /// session's pending set by the caller only when this returns Ok.
    pub async fn submit_answer(
        &self,
        category: ItemCategory,
        id: &str,
        text: &str,
    ) -> ReviewDeskResult<()> {
        Self::validate_answer(text)?;
        self.marketplace.submit_answer(category, id, text.trim()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_studio() -> ReviewDeskStudio {
        // Empty credentials: every marketplace call fails before any socket
        // is opened, which keeps these tests fully offline
        ReviewDeskStudio::new(AppConfig::default()).unwrap()
    }

    #[test]
    fn test_validate_answer_minimum_length() {
        assert!(ReviewDeskStudio::validate_answer("").is_err());
        assert!(ReviewDeskStudio::validate_answer("a").is_err());
        assert!(ReviewDeskStudio::validate_answer("  й  ").is_err());
        assert!(ReviewDeskStudio::validate_answer("ok").is_ok());
        assert!(ReviewDeskStudio::validate_answer("да").is_ok());
        assert!(ReviewDeskStudio::validate_answer("Спасибо за отзыв!").is_ok());
    }

    #[test]
    fn test_validate_answer_counts_chars_not_bytes() {
        // Two Cyrillic characters are four bytes; the check must pass
        let two_chars = "да";
        assert_eq!(two_chars.len(), 4);
        assert!(ReviewDeskStudio::validate_answer(two_chars).is_ok());
    }

    #[tokio::test]
    async fn test_submit_rejects_short_draft_before_network() {
        let studio = offline_studio();
        let error = studio
            .submit_answer(ItemCategory::Feedback, "fb-1", " a ")
            .await
            .unwrap_err();
        assert_eq!(error.category(), "validation");
        // Nothing was sent, so the request counters stay at zero
        assert_eq!(studio.stats().total_requests, 0);
    }

    #[tokio::test]
    async fn test_fetch_degrades_to_empty_on_failure() {
        let studio = offline_studio();
        assert!(studio.list_feedbacks(false).await.is_err());
        assert!(studio.fetch_feedbacks(false).await.is_empty());
        assert!(studio.fetch_questions(false).await.is_empty());
    }

    #[test]
    fn test_studio_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.llm.provider = "unknown".to_string();
        assert!(ReviewDeskStudio::new(config).is_err());
    }
}
