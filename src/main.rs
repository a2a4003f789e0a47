use anyhow::Result;
use std::sync::Arc;
use tracing::info;

mod config;
mod core;
mod error;
mod i18n;
mod llm;
mod logging;
mod marketplace;
mod ui;

use crate::config::{AppConfig, ConfigOverrides};
use crate::core::ReviewDeskStudio;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let mut config = AppConfig::load().await?;
    ConfigOverrides::apply(&mut config);

    // Initialize logging
    logging::init_logging(&config.logging)?;
    info!("Starting ReviewDesk Studio v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the core application
    let studio = Arc::new(ReviewDeskStudio::new(config)?);
    info!(
        "Core application initialized (provider: {})",
        studio.provider_name()
    );

    run_ui(studio)?;

    info!("ReviewDesk Studio shutting down");
    Ok(())
}

/// Start the GUI. eframe takes over the main thread while marketplace
/// and LLM calls run on the tokio worker threads.
#[cfg(feature = "ui")]
fn run_ui(studio: Arc<ReviewDeskStudio>) -> Result<()> {
    let ui_config = &studio.config().ui;
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([ui_config.window_width, ui_config.window_height])
            .with_min_inner_size([800.0, 600.0])
            .with_icon(ui::app_icon()),
        ..Default::default()
    };

    let app = ui::ReviewDeskUI::new(studio);
    eframe::run_native(
        "ReviewDesk Studio",
        options,
        Box::new(|_cc| Box::new(app)),
    )
    .map_err(|e| anyhow::anyhow!("GUI execution failed: {}", e))
}

#[cfg(not(feature = "ui"))]
fn run_ui(_studio: Arc<ReviewDeskStudio>) -> Result<()> {
    anyhow::bail!("this build has no GUI; use the rds-cli binary instead")
}
