use chrono::Utc;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use smsched::config::Config;
use smsched::daemon::Trigger;
use smsched::dispatch::DispatchEngine;
use smsched::domain::RunReport;

fn setup_logging(level: &str, to_stderr: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if to_stderr {
        builder.target(env_logger::Target::Stderr).init();
        return Ok(());
    }

    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smsched")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("smsched.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Directory relative source paths are resolved against
fn base_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine working directory")
}

fn log_settings(config: &Config) {
    // Never log the API key
    info!(
        "Using SMS API at {}{} with SenderId {}, Type {}, EnableSending={}",
        config.sms.api_base_url,
        config.sms.messages_endpoint,
        config.sms.sender_id,
        config.sms.message_type,
        config.sms.enable_sending
    );
}

async fn run_application(cli: &Cli, config: Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match cli.command.clone().unwrap_or(Commands::Start { now: false }) {
        Commands::Start { now } => handle_start(config, now).await,
        Commands::RunOnce { dry_run } => handle_run_once(config, dry_run).await,
        Commands::Check { count } => handle_check(&config, count),
    }
}

async fn handle_start(config: Config, now: bool) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    log_settings(&config);

    let engine = DispatchEngine::from_config(&config, &base_dir()?).context("Failed to build dispatch engine")?;
    let trigger = Trigger::from_config(&config.schedule)?.with_run_on_start(config.schedule.run_on_start || now);

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            interrupt.cancel();
        }
    });

    println!(
        "{} {} (source: {})",
        "Scheduler started:".green(),
        config.schedule.cron,
        engine.source_path().display()
    );

    let state = trigger.run(token, || engine.run()).await;

    info!(
        "Scheduler stopped after {} runs ({} completed, {} failed)",
        state.runs, state.completed_runs, state.failed_runs
    );
    println!("{}", "Scheduler stopped".cyan());
    Ok(())
}

async fn handle_run_once(mut config: Config, dry_run: bool) -> Result<()> {
    if dry_run {
        config.sms.enable_sending = false;
    }
    config.validate().context("Invalid configuration")?;
    log_settings(&config);

    let engine = DispatchEngine::from_config(&config, &base_dir()?).context("Failed to build dispatch engine")?;
    let report = engine.run().await.context("Dispatch run failed")?;

    print_report(&report);
    Ok(())
}

fn handle_check(config: &Config, count: usize) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let trigger = Trigger::from_config(&config.schedule)?;
    println!("{}", "Configuration OK".green());
    println!("  Source: {} ({:?})", config.source.resolve(&base_dir()?).display(), config.source.format);
    println!("  Sending enabled: {}", config.sms.enable_sending);
    println!(
        "  Retry: {} attempts, {:?}",
        config.retry.max_attempts, config.retry.backoff
    );
    println!("  Next runs:");
    for time in trigger.upcoming(Utc::now(), count) {
        println!("    {}", time.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    let summary = &report.summary;
    println!(
        "{} total={} succeeded={} failed={}",
        "Run complete:".green(),
        summary.total_recipients,
        summary.succeeded.to_string().green(),
        if summary.failed > 0 {
            summary.failed.to_string().red()
        } else {
            summary.failed.to_string().normal()
        }
    );

    for failure in report.failures() {
        println!(
            "  {} {} ({}): {}",
            "FAILED".red(),
            failure.recipient.address,
            failure.recipient.name,
            failure.outcome.error_detail().unwrap_or("(unknown error)")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging at the configured level
    let level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    setup_logging(&level, cli.is_verbose()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, config).await.context("Application failed")?;

    Ok(())
}
