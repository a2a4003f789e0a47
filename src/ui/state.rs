#[cfg(feature = "ui")]
use std::collections::HashSet;

#[cfg(feature = "ui")]
use crate::config::AppConfig;
#[cfg(feature = "ui")]
use crate::config::AutopilotConfig;
#[cfg(feature = "ui")]
use crate::core::SessionState;
#[cfg(feature = "ui")]
use crate::marketplace::{FeedbackItem, QuestionItem};

/// How many autopilot log lines the view keeps
#[cfg(feature = "ui")]
const AUTOPILOT_LOG_LINES: usize = 200;

/// UI application state
#[cfg(feature = "ui")]
pub struct UiState {
    pub current_view: View,
    pub session: SessionState,
    pub archived_feedbacks: Vec<FeedbackItem>,
    pub archived_questions: Vec<QuestionItem>,
    pub show_feedback_archive: bool,
    pub show_question_archive: bool,
    pub loading_feedbacks: bool,
    pub loading_questions: bool,
    /// Item ids with a draft generation in flight
    pub generating: HashSet<String>,
    /// Item ids with a submit in flight
    pub sending: HashSet<String>,
    pub toasts: Vec<Toast>,
    /// Latest notification text, kept visible in the status bar
    pub status_line: String,
    pub autopilot_log: Vec<String>,
    pub autopilot_form: AutopilotForm,
    pub settings_form: SettingsForm,
    pub initial_refresh_done: bool,
}

#[cfg(feature = "ui")]
impl UiState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            current_view: View::Reviews,
            session: SessionState::new(),
            archived_feedbacks: Vec::new(),
            archived_questions: Vec::new(),
            show_feedback_archive: false,
            show_question_archive: false,
            loading_feedbacks: false,
            loading_questions: false,
            generating: HashSet::new(),
            sending: HashSet::new(),
            toasts: Vec::new(),
            status_line: String::new(),
            autopilot_log: Vec::new(),
            autopilot_form: AutopilotForm::from_config(config),
            settings_form: SettingsForm::from_config(config),
            initial_refresh_done: false,
        }
    }

    pub fn busy(&self, id: &str) -> bool {
        self.generating.contains(id) || self.sending.contains(id)
    }

    pub fn push_log(&mut self, line: String) {
        self.autopilot_log.push(line);
        if self.autopilot_log.len() > AUTOPILOT_LOG_LINES {
            let excess = self.autopilot_log.len() - AUTOPILOT_LOG_LINES;
            self.autopilot_log.drain(..excess);
        }
    }
}

/// UI views
#[cfg(feature = "ui")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Reviews,
    Questions,
    Autopilot,
    Settings,
}

/// Transient notification shown in the corner of the window
#[cfg(feature = "ui")]
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: String,
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "ui")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[cfg(feature = "ui")]
impl Toast {
    const LIFETIME_SECONDS: i64 = 6;

    pub fn new(level: ToastLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            level,
            title: title.into(),
            message: message.into(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        chrono::Utc::now() - self.created_at > chrono::Duration::seconds(Self::LIFETIME_SECONDS)
    }
}

/// Editable autopilot knobs, seeded from the configuration
#[cfg(feature = "ui")]
#[derive(Debug, Clone)]
pub struct AutopilotForm {
    pub item_delay_seconds: u64,
    pub pass_delay_seconds: u64,
    pub include_questions: bool,
}

#[cfg(feature = "ui")]
impl AutopilotForm {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            item_delay_seconds: config.autopilot.item_delay_seconds,
            pass_delay_seconds: config.autopilot.pass_delay_seconds,
            include_questions: config.autopilot.include_questions,
        }
    }

    pub fn settings(&self) -> AutopilotConfig {
        AutopilotConfig {
            item_delay_seconds: self.item_delay_seconds,
            pass_delay_seconds: self.pass_delay_seconds.max(1),
            include_questions: self.include_questions,
        }
    }
}

/// The settings form. Secrets are edited here in memory and only reach
/// disk through [`AppConfig::save`] when the operator applies them.
#[cfg(feature = "ui")]
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub base_url: String,
    pub api_token: String,
    pub question_answer_state: String,
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub instruction: String,
    pub signature: String,
    pub theme: String,
    pub font_size: f32,
    pub language: String,
}

#[cfg(feature = "ui")]
impl SettingsForm {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.marketplace.base_url.clone(),
            api_token: config.marketplace.api_token.clone(),
            question_answer_state: config.marketplace.question_answer_state.clone(),
            provider: config.llm.provider.clone(),
            api_key: config.llm.api_key.clone(),
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            instruction: config.reply.instruction.clone(),
            signature: config.reply.signature.clone(),
            theme: config.ui.theme.clone(),
            font_size: config.ui.font_size,
            language: config.ui.language.clone(),
        }
    }

    pub fn apply_to(&self, config: &mut AppConfig) {
        config.marketplace.base_url = self.base_url.trim().to_string();
        config.marketplace.api_token = self.api_token.trim().to_string();
        config.marketplace.question_answer_state = self.question_answer_state.clone();
        config.llm.provider = self.provider.clone();
        config.llm.api_key = self.api_key.trim().to_string();
        config.llm.model = self.model.trim().to_string();
        config.llm.temperature = self.temperature;
        config.reply.instruction = self.instruction.trim().to_string();
        config.reply.signature = self.signature.trim().to_string();
        config.ui.theme = self.theme.clone();
        config.ui.font_size = self.font_size;
        config.ui.language = self.language.clone();
    }
}

#[cfg(all(test, feature = "ui"))]
mod tests {
    use super::*;

    #[test]
    fn test_settings_form_round_trip() {
        let mut config = AppConfig::default();
        config.llm.provider = "groq".to_string();
        config.marketplace.api_token = "token".to_string();

        let mut form = SettingsForm::from_config(&config);
        assert_eq!(form.provider, "groq");
        form.model = "  llama-3.1-70b  ".to_string();
        form.api_key = " key ".to_string();

        form.apply_to(&mut config);
        assert_eq!(config.llm.model, "llama-3.1-70b");
        assert_eq!(config.llm.api_key, "key");
        assert_eq!(config.marketplace.api_token, "token");
    }

    #[test]
    fn test_autopilot_form_enforces_minimum_pass_delay() {
        let config = AppConfig::default();
        let mut form = AutopilotForm::from_config(&config);
        form.pass_delay_seconds = 0;
        assert_eq!(form.settings().pass_delay_seconds, 1);
    }

    #[test]
    fn test_log_is_capped() {
        let config = AppConfig::default();
        let mut state = UiState::new(&config);
        for i in 0..500 {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.autopilot_log.len(), 200);
        assert_eq!(state.autopilot_log.last().map(String::as_str), Some("line 499"));
    }

    #[test]
    fn test_fresh_toast_is_not_expired() {
        let toast = Toast::new(ToastLevel::Info, "title", "message");
        assert!(!toast.is_expired());
        assert!(!toast.id.is_empty());
    }
}
