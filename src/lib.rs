//! ReviewDesk Studio - a seller dashboard for marketplace reviews and questions
//!
//! This library provides the core functionality for ReviewDesk Studio, including:
//! - Marketplace API client for unanswered reviews and buyer questions
//! - LLM-backed draft replies through OpenAI-compatible providers
//! - An unattended autopilot loop that answers everything pending
//! - Session state shared between the GUI and the CLI

pub mod config;
pub mod core;
pub mod error;
pub mod i18n;
pub mod llm;
pub mod logging;
pub mod marketplace;

#[cfg(feature = "ui")]
pub mod ui;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::core::ReviewDeskStudio;
pub use crate::error::{ReviewDeskError, ReviewDeskResult};
