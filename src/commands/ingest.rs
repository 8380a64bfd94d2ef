//! Ingest command
//!
//! Stores one entry through the Log operation against the configured backend.

use analytics_service::config;
use analytics_service::models::LogRequest;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::Path;

/// Store one log entry
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// Name of the reporting service
    #[arg(short, long)]
    pub service: String,

    /// Severity label (e.g. ERROR, WARN, INFO)
    #[arg(short, long)]
    pub level: String,

    /// Free-text message
    #[arg(short, long)]
    pub message: Option<String>,

    /// Metadata as a JSON object
    #[arg(long, default_value = "{}")]
    pub metadata: String,
}

impl IngestArgs {
    fn into_request(self) -> LogRequest {
        LogRequest {
            service_name: self.service,
            level: self.level,
            message: self.message,
            metadata: self.metadata,
        }
    }
}

/// Execute the ingest command
pub async fn execute(config_path: &Path, args: IngestArgs) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let service = super::open_service(&cfg).await?;

    let response = service.log(args.into_request()).await?;

    println!("{} {}", "✓".green(), response.message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_args_into_request() {
        let args = IngestArgs::parse_from([
            "ingest",
            "--service",
            "billing",
            "--level",
            "ERROR",
            "--message",
            "charge failed",
        ]);

        let request = args.into_request();
        assert_eq!(request.service_name, "billing");
        assert_eq!(request.message.as_deref(), Some("charge failed"));
        assert_eq!(request.metadata, "{}");
    }
}
