use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub marketplace: MarketplaceConfig,
    pub llm: LlmConfig,
    pub reply: ReplyConfig,
    pub autopilot: AutopilotConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    pub base_url: String,
    pub api_token: String,
    pub page_size: usize,
    pub order: String,
    pub request_timeout_seconds: u64,
    pub question_answer_state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_seconds: u64,
    pub retry_once: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    pub instruction: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutopilotConfig {
    pub item_delay_seconds: u64,
    pub pass_delay_seconds: u64,
    pub include_questions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub theme: String,
    pub font_size: f32,
    pub window_width: f32,
    pub window_height: f32,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub max_files: usize,
    pub directory: PathBuf,
}

/// Providers selectable via `llm.provider`
pub const SUPPORTED_PROVIDERS: [&str; 4] = ["openai", "groq", "deepseek", "gemini"];

/// Accepted values for `marketplace.question_answer_state`; the empty string
/// omits the field from the submit payload entirely
pub const QUESTION_ANSWER_STATES: [&str; 3] = ["wbViewed", "none", ""];

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = get_data_directory();

        Self {
            marketplace: MarketplaceConfig {
                base_url: "https://feedbacks-api.wildberries.ru".to_string(),
                api_token: String::new(),
                page_size: 100,
                order: "dateDesc".to_string(),
                request_timeout_seconds: 30,
                question_answer_state: "wbViewed".to_string(),
            },
            llm: LlmConfig {
                provider: "openai".to_string(),
                api_key: String::new(),
                model: "gpt-4o-mini".to_string(),
                temperature: 0.6,
                max_tokens: 400,
                request_timeout_seconds: 60,
                retry_once: true,
            },
            reply: ReplyConfig {
                instruction: "Отвечай вежливо, кратко и по существу. Не обещай компенсаций."
                    .to_string(),
                signature: "С уважением, команда магазина".to_string(),
            },
            autopilot: AutopilotConfig {
                item_delay_seconds: 5,
                pass_delay_seconds: 60,
                include_questions: false,
            },
            ui: UiConfig {
                theme: "dark".to_string(),
                font_size: 14.0,
                window_width: 1200.0,
                window_height: 800.0,
                language: "ru".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_enabled: true,
                console_enabled: true,
                max_files: 5,
                directory: data_dir.join("logs"),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from default locations
    pub async fn load() -> Result<Self> {
        let config_path = get_config_path();

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            info!("No configuration file found, using defaults");
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Load configuration from specific file
    pub async fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to default location
    pub async fn save(&self) -> Result<()> {
        let config_path = get_config_path();

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(&config_path, content).await?;

        info!("Configuration saved to: {}", config_path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate marketplace configuration
        let base = url::Url::parse(&self.marketplace.base_url)
            .map_err(|e| anyhow::anyhow!("Marketplace base_url is not a valid URL: {e}"))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!("Marketplace base_url must use http or https"));
        }

        if self.marketplace.page_size == 0 {
            return Err(anyhow::anyhow!("Marketplace page_size must be > 0"));
        }

        if !QUESTION_ANSWER_STATES.contains(&self.marketplace.question_answer_state.as_str()) {
            return Err(anyhow::anyhow!(
                "Marketplace question_answer_state must be one of {:?}",
                QUESTION_ANSWER_STATES
            ));
        }

        // Validate LLM configuration
        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(anyhow::anyhow!(
                "LLM provider must be one of {:?}",
                SUPPORTED_PROVIDERS
            ));
        }

        if self.llm.model.is_empty() {
            return Err(anyhow::anyhow!("LLM model must not be empty"));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow::anyhow!("LLM temperature must be between 0.0 and 2.0"));
        }

        if self.llm.max_tokens == 0 {
            return Err(anyhow::anyhow!("LLM max_tokens must be > 0"));
        }

        // Validate autopilot configuration
        if self.autopilot.pass_delay_seconds == 0 {
            return Err(anyhow::anyhow!("Autopilot pass_delay_seconds must be > 0"));
        }

        // Validate UI configuration
        if self.ui.font_size <= 0.0 {
            return Err(anyhow::anyhow!("UI font_size must be > 0"));
        }

        if !matches!(self.ui.language.as_str(), "ru" | "en") {
            return Err(anyhow::anyhow!("UI language must be \"ru\" or \"en\""));
        }

        info!("Configuration validation passed");
        Ok(())
    }
}

/// Get the default data directory
fn get_data_directory() -> PathBuf {
    directories::ProjectDirs::from("com", "reviewdesk", "studio")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("data"))
}

/// Get the configuration file path
pub fn get_config_path() -> PathBuf {
    directories::ProjectDirs::from("com", "reviewdesk", "studio")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("config.toml"))
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        // Marketplace overrides
        if let Ok(token) = std::env::var("RDS_WB_TOKEN") {
            config.marketplace.api_token = token;
        }

        if let Ok(base_url) = std::env::var("RDS_WB_BASE_URL") {
            config.marketplace.base_url = base_url;
        }

        if let Ok(state) = std::env::var("RDS_QUESTION_STATE") {
            config.marketplace.question_answer_state = state;
        }

        // LLM overrides
        if let Ok(api_key) = std::env::var("RDS_LLM_API_KEY") {
            config.llm.api_key = api_key;
        }

        if let Ok(provider) = std::env::var("RDS_LLM_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("RDS_LLM_MODEL") {
            config.llm.model = model;
        }

        if let Ok(temp_str) = std::env::var("RDS_LLM_TEMPERATURE") {
            if let Ok(temp) = temp_str.parse::<f32>() {
                config.llm.temperature = temp;
            }
        }

        // Logging overrides
        if let Ok(log_level) = std::env::var("RDS_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        info!("Applied environment variable overrides");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.marketplace.question_answer_state, "wbViewed");
        assert_eq!(config.llm.temperature, 0.6);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.marketplace.base_url, config.marketplace.base_url);
        assert_eq!(parsed.llm.provider, config.llm.provider);
        assert_eq!(parsed.reply.signature, config.reply.signature);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "anthropic-bedrock".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_state_value() {
        let mut config = AppConfig::default();
        config.marketplace.question_answer_state = "viewed".to_string();
        assert!(config.validate().is_err());

        // Empty string is legal: it omits the field from the payload
        config.marketplace.question_answer_state = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = AppConfig::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.marketplace.page_size = 25;
        config.ui.language = "en".to_string();
        tokio::fs::write(&path, toml::to_string_pretty(&config).unwrap())
            .await
            .unwrap();

        let loaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.marketplace.page_size, 25);
        assert_eq!(loaded.ui.language, "en");
    }

    #[tokio::test]
    async fn test_load_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.llm.max_tokens = 0;
        tokio::fs::write(&path, toml::to_string_pretty(&config).unwrap())
            .await
            .unwrap();

        assert!(AppConfig::load_from_file(&path).await.is_err());
    }
}
