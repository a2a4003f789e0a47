use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

mod config;
mod core;
mod error;
mod llm;
mod marketplace;

use crate::config::{AppConfig, ConfigOverrides};
use crate::core::{autopilot, AutopilotEvent, CoreEvent, ReviewDeskStudio};
use crate::error::ReviewDeskError;
use crate::marketplace::ItemCategory;

#[derive(Parser)]
#[command(name = "rds-cli")]
#[command(about = "ReviewDesk Studio Command Line Interface")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, help = "Configuration file path")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List pending reviews or questions
    List {
        #[arg(long, help = "List buyer questions instead of reviews")]
        questions: bool,

        #[arg(long, help = "List already answered items")]
        answered: bool,

        #[arg(long, help = "Page size (defaults to the configured one)")]
        take: Option<usize>,

        #[arg(long, default_value_t = 0, help = "Items to skip from the top")]
        skip: usize,
    },

    /// Generate a draft reply for one pending item
    Draft {
        #[arg(help = "Item ID")]
        id: String,

        #[arg(long, help = "The ID refers to a question")]
        question: bool,
    },

    /// Submit a reply to the marketplace
    Answer {
        #[arg(help = "Item ID")]
        id: String,

        #[arg(short, long, help = "Reply text")]
        text: String,

        #[arg(long, help = "The ID refers to a question")]
        question: bool,
    },

    /// Run the unattended reply loop
    Auto {
        #[arg(long, help = "Run a single pass and exit")]
        once: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.verbose { "debug" } else { "info" };
    std::env::set_var("RUST_LOG", format!("reviewdesk_studio={}", log_level));

    tracing_subscriber::fmt::init();

    info!("ReviewDesk Studio CLI v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = if let Some(config_path) = cli.config {
        AppConfig::load_from_file(&config_path).await?
    } else {
        AppConfig::load().await?
    };
    ConfigOverrides::apply(&mut config);

    // Initialize core application
    let studio = Arc::new(ReviewDeskStudio::new(config)?);

    // Execute command
    match cli.command {
        Commands::List { questions, answered, take, skip } => {
            list_items(&studio, questions, answered, take, skip).await?;
        }
        Commands::Draft { id, question } => {
            draft_item(&studio, id, question).await?;
        }
        Commands::Answer { id, text, question } => {
            answer_item(&studio, id, text, question).await?;
        }
        Commands::Auto { once } => {
            run_autopilot(studio, once).await?;
        }
    }

    Ok(())
}

async fn list_items(
    studio: &ReviewDeskStudio,
    questions: bool,
    answered: bool,
    take: Option<usize>,
    skip: usize,
) -> Result<()> {
    let heading = if answered { "Answered" } else { "Unanswered" };
    let take = take.unwrap_or(studio.config().marketplace.page_size);

    if questions {
        let items = studio.list_questions_page(answered, take, skip).await?;
        println!("{} questions: {}", heading, items.len());
        println!("{:<24} {:<24} {:<17} {}", "ID", "Product", "Created", "Text");
        println!("{}", "-".repeat(90));

        for item in items {
            println!(
                "{:<24} {:<24} {:<17} {}",
                item.id,
                excerpt(&item.product_details.product_name, 22),
                item.created_date.format("%Y-%m-%d %H:%M"),
                excerpt(item.body(), 48)
            );
        }
    } else {
        let items = studio.list_feedbacks_page(answered, take, skip).await?;
        println!("{} reviews: {}", heading, items.len());
        println!("{:<24} {:<5} {:<24} {:<17} {}", "ID", "Stars", "Product", "Created", "Text");
        println!("{}", "-".repeat(96));

        for item in items {
            println!(
                "{:<24} {:<5} {:<24} {:<17} {}",
                item.id,
                item.product_valuation,
                excerpt(&item.product_details.product_name, 22),
                item.created_date.format("%Y-%m-%d %H:%M"),
                excerpt(item.body(), 48)
            );
        }
    }

    Ok(())
}

async fn draft_item(studio: &ReviewDeskStudio, id: String, question: bool) -> Result<()> {
    if question {
        let items = studio.list_questions(false).await?;
        let item = items
            .iter()
            .find(|item| item.id == id)
            .ok_or(ReviewDeskError::ItemNotFound { id: id.clone() })?;

        let text = studio.draft_for_question(item).await?;
        println!("Draft reply for question {}:\n", id);
        println!("{}", text);
    } else {
        let items = studio.list_feedbacks(false).await?;
        let item = items
            .iter()
            .find(|item| item.id == id)
            .ok_or(ReviewDeskError::ItemNotFound { id: id.clone() })?;

        let text = studio.draft_for_feedback(item).await?;
        println!("Draft reply for review {}:\n", id);
        println!("{}", text);
    }

    Ok(())
}

async fn answer_item(
    studio: &ReviewDeskStudio,
    id: String,
    text: String,
    question: bool,
) -> Result<()> {
    let category = if question {
        ItemCategory::Question
    } else {
        ItemCategory::Feedback
    };

    studio.submit_answer(category, &id, &text).await?;
    println!("Answer sent for {} {}.", category, id);

    Ok(())
}

async fn run_autopilot(studio: Arc<ReviewDeskStudio>, once: bool) -> Result<()> {
    let settings = studio.config().autopilot.clone();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    if once {
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                print_event(&event);
            }
        });

        let summary = autopilot::run_once(&studio, &settings, &tx).await;
        drop(tx);
        let _ = printer.await;

        println!(
            "Pass finished: {} answered, {} skipped out of {}.",
            summary.answered, summary.skipped, summary.total
        );
        return Ok(());
    }

    let handle = autopilot::start(studio, settings, tx);
    println!("Autopilot running. Press Ctrl+C to stop after the current pass.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("Stopping...");
                handle.stop();
            }
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        let stopped = matches!(
                            event,
                            CoreEvent::Autopilot(AutopilotEvent::Stopped)
                        );
                        print_event(&event);
                        if stopped {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    Ok(())
}

fn print_event(event: &CoreEvent) {
    if let CoreEvent::Autopilot(event) = event {
        match event {
            AutopilotEvent::PassStarted { number } => {
                println!("Pass #{} started.", number);
            }
            AutopilotEvent::ItemAnswered { category, id } => {
                println!("  answered {} {}", category, id);
            }
            AutopilotEvent::ItemSkipped { category, id, message } => {
                println!("  skipped {} {} ({})", category, id, message);
            }
            AutopilotEvent::PassFinished(summary) => {
                println!(
                    "Pass #{} finished: {} answered, {} skipped.",
                    summary.number, summary.answered, summary.skipped
                );
            }
            AutopilotEvent::Stopped => {
                println!("Autopilot stopped.");
            }
        }
    }
}

fn excerpt(text: &str, limit: usize) -> String {
    let flat = text.replace('\n', " ");
    let mut out: String = flat.chars().take(limit).collect();
    if flat.chars().count() > limit {
        out.push('…');
    }
    out
}
