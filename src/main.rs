use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use autodeliver::classifier::classify;
use autodeliver::generator::TemplateGenerator;
use autodeliver::notify::{self, QueueProducer, Relay, RelayConfig, status};
use autodeliver::processor::{Processor, ProcessorOptions};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(default_level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!("{}.log", env!("CARGO_PKG_NAME")));

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Flip the shutdown channel on Ctrl-C.
fn spawn_ctrl_c(tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            println!("{}", "Shutting down...".yellow());
            let _ = tx.send(true);
        }
    });
}

fn processor_options(config: &Config) -> ProcessorOptions {
    ProcessorOptions::new(config.storage.signups_path(), config.storage.solutions_path())
        .with_batch_size(config.processor.batch_size)
        .with_interval(config.processor.interval())
}

fn relay_config(config: &Config) -> RelayConfig {
    RelayConfig {
        queue_path: config.storage.queue_path(),
        outbound_path: config.storage.outbound_path(),
        cursor_path: config.storage.relay_cursor_path(),
        recipient: config.relay.recipient.clone(),
        poll_interval: config.relay.poll_interval(),
    }
}

async fn handle_processor_command(once: bool, config: &Config) -> Result<()> {
    let processor = Arc::new(Processor::new(
        processor_options(config),
        TemplateGenerator::new(&config.storage.artifacts_dir),
        QueueProducer::new(config.storage.queue_path()),
    ));

    if once {
        let report = tokio::task::spawn_blocking(move || processor.run_cycle())
            .await
            .context("Cycle task panicked")?
            .context("Cycle failed")?;
        println!(
            "{} selected {}, delivered {}, failed {}",
            "Cycle complete:".green(),
            report.selected,
            report.delivered.to_string().green(),
            report.failed.to_string().red()
        );
        return Ok(());
    }

    println!(
        "{} every {}s, {} per cycle",
        "Processor running:".cyan(),
        config.processor.interval().as_secs(),
        config.processor.batch_size
    );

    let (tx, rx) = watch::channel(false);
    spawn_ctrl_c(tx);
    processor.run(rx).await.context("Processor failed")?;
    Ok(())
}

async fn handle_relay_command(once: bool, config: &Config) -> Result<()> {
    let mut relay = Relay::new(relay_config(config));

    if once {
        let report = relay.poll_once().context("Relay poll failed")?;
        println!(
            "{} republished {}, already sent {}, malformed {}",
            "Poll complete:".green(),
            report.republished,
            report.already_sent,
            report.malformed
        );
        return Ok(());
    }

    let addr = config.relay.socket_addr()?;
    println!(
        "{} watching {} (status on http://{}{})",
        "Relay running:".cyan(),
        relay.config().queue_path.display(),
        addr,
        status::STATUS_PATH
    );

    let (tx, rx) = watch::channel(false);
    spawn_ctrl_c(tx);

    notify::run_with_status(relay, addr, rx)
        .await
        .context("Relay stopped")?;
    Ok(())
}

fn handle_classify_command(text: &str) -> Result<()> {
    let judgment = classify(text);
    println!("{} {}", "Category:".green(), judgment.category());
    println!("{} {}/5", "Priority:".green(), judgment.priority());
    println!("{} {}", "Effort:".green(), judgment.effort());
    println!("{} {}", "Integrations:".green(), judgment.integrations().join(", "));
    println!("{} {}", "ROI:".green(), judgment.estimated_roi());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Processor { once } => handle_processor_command(*once, config).await,
        Commands::Relay { once } => handle_relay_command(*once, config).await,
        Commands::Classify { text } => handle_classify_command(text),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = if cli.is_verbose() {
        "debug".to_string()
    } else {
        config.log_level.clone().unwrap_or_else(|| "info".to_string())
    };
    setup_logging(&level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
