use thiserror::Error;

/// Error types for ReviewDesk Studio
#[derive(Error, Debug)]
pub enum ReviewDeskError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration file: {path}")]
    InvalidConfig { path: String },

    #[error("Missing credential: {name}")]
    MissingCredential { name: String },

    // Transport errors
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    // Marketplace API errors
    #[error("Marketplace request failed: HTTP {status} - {body}")]
    MarketplaceStatus { status: u16, body: String },

    #[error("Marketplace API error: {message}")]
    MarketplaceApi { message: String },

    #[error("Answer rejected for item {id}: HTTP {status} - {body}")]
    SubmitRejected { id: String, status: u16, body: String },

    // Reply generation errors
    #[error("Chat provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Chat provider {provider} returned an empty completion")]
    EmptyCompletion { provider: String },

    #[error("Unknown chat provider: {name}")]
    UnknownProvider { name: String },

    // Local validation errors
    #[error("Draft answer is too short ({chars} characters)")]
    DraftTooShort { chars: usize },

    #[error("No pending item with id {id}")]
    ItemNotFound { id: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ReviewDeskError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Create a marketplace API error
    pub fn marketplace_api(message: impl Into<String>) -> Self {
        Self::MarketplaceApi { message: message.into() }
    }

    /// Create a chat provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider { provider: provider.into(), message: message.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Check if error is recoverable (worth retrying on a later pass)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Recoverable errors
            Self::Network { .. } |
            Self::Timeout { .. } |
            Self::Provider { .. } |
            Self::EmptyCompletion { .. } => true,

            // Server-side failures recover, client-side rejections do not
            Self::MarketplaceStatus { status, .. } |
            Self::SubmitRejected { status, .. } => *status >= 500,

            // Non-recoverable errors
            Self::Configuration { .. } |
            Self::InvalidConfig { .. } |
            Self::MissingCredential { .. } |
            Self::MarketplaceApi { .. } |
            Self::UnknownProvider { .. } |
            Self::DraftTooShort { .. } |
            Self::ItemNotFound { .. } |
            Self::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } | Self::InvalidConfig { .. } | Self::MissingCredential { .. } => "configuration",
            Self::Network { .. } | Self::Timeout { .. } => "network",
            Self::MarketplaceStatus { .. } | Self::MarketplaceApi { .. } | Self::SubmitRejected { .. } => "marketplace",
            Self::Provider { .. } | Self::EmptyCompletion { .. } | Self::UnknownProvider { .. } => "llm",
            Self::DraftTooShort { .. } | Self::ItemNotFound { .. } => "validation",
            Self::Internal { .. } => "internal",
        }
    }

    /// Get suggested retry delay for recoverable errors
    pub fn retry_delay(&self) -> Option<std::time::Duration> {
        match self {
            Self::Network { .. } => Some(std::time::Duration::from_secs(5)),
            Self::Timeout { .. } => Some(std::time::Duration::from_secs(15)),
            Self::MarketplaceStatus { status, .. } if *status >= 500 => {
                Some(std::time::Duration::from_secs(10))
            }
            Self::Provider { .. } | Self::EmptyCompletion { .. } => {
                Some(std::time::Duration::from_secs(5))
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ReviewDeskError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        if err.is_timeout() {
            Self::Timeout { url }
        } else if err.is_connect() {
            Self::Network { message: format!("connection failed: {err}") }
        } else if err.is_decode() {
            Self::MarketplaceApi { message: format!("malformed response body: {err}") }
        } else {
            Self::Network { message: err.to_string() }
        }
    }
}

/// Result type alias for ReviewDesk Studio
pub type ReviewDeskResult<T> = std::result::Result<T, ReviewDeskError>;
