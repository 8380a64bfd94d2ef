//! Logs query command
//!
//! Runs ListLogs against the configured backend and prints the result.

use analytics_service::config;
use analytics_service::models::{ListLogsRequest, LogEntry};
use analytics_service::window::TimeWindow;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Query and display logs
#[derive(Debug, Clone, Parser)]
pub struct LogsArgs {
    /// Time window: unspecified, today, yesterday, last-week, last-month,
    /// last-three-months
    #[arg(short, long, default_value = "UNSPECIFIED", value_parser = TimeWindow::from_str)]
    pub window: TimeWindow,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the logs command
pub async fn execute(config_path: &Path, args: LogsArgs) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let service = super::open_service(&cfg).await?;

    let response = service
        .list_logs(ListLogsRequest {
            window: args.window,
        })
        .await?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            if response.logs.is_empty() {
                println!("{}", format!("No logs found in window {}", args.window).yellow());
                return Ok(());
            }
            display_logs_text(&response.logs);
        }
    }

    Ok(())
}

/// Display logs in human-friendly text format
fn display_logs_text(logs: &[LogEntry]) {
    println!("{}", format!("Found {} log entries", logs.len()).bold());
    println!();

    for log in logs {
        let timestamp = log.created_at.format("%Y-%m-%d %H:%M:%S%.3f");

        // Levels are free-form; only the common ones get a color
        let level_colored = match log.level.to_ascii_uppercase().as_str() {
            "ERROR" | "FATAL" => log.level.red().bold(),
            "WARN" | "WARNING" => log.level.yellow().bold(),
            "INFO" => log.level.green(),
            "DEBUG" => log.level.blue(),
            _ => log.level.normal(),
        };

        println!(
            "{} {} {} {}",
            timestamp.to_string().dimmed(),
            level_colored,
            log.service_name.cyan(),
            log.message
        );

        if log.metadata != "{}" && !log.metadata.is_empty() {
            println!("  {}", format!("metadata: {}", log.metadata).dimmed());
        }
    }
}
