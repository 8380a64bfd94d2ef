use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "analytics-service", version, about = "Centralized log ingestion and query service")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// List stored log entries in a time window
    Logs(crate::commands::logs::LogsArgs),

    /// Store one log entry
    Ingest(crate::commands::ingest::IngestArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_service::window::TimeWindow;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };

        assert!(matches!(cli.get_command(), Commands::Serve));
    }

    #[test]
    fn test_cli_parsing_global_config() {
        let args = vec!["analytics-service", "serve", "--config", "/etc/analytics.toml"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/analytics.toml"));
        assert!(matches!(cli.get_command(), Commands::Serve));
    }

    #[test]
    fn test_cli_parsing_logs() {
        let args = vec!["analytics-service", "logs", "--window", "last-week"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Logs(args) => assert_eq!(args.window, TimeWindow::LastWeek),
            _ => panic!("Expected Logs command"),
        }
    }

    #[test]
    fn test_cli_parsing_ingest() {
        let args = vec![
            "analytics-service",
            "ingest",
            "--service",
            "billing",
            "--level",
            "ERROR",
            "--metadata",
            r#"{"order_id":42}"#,
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Ingest(args) => {
                assert_eq!(args.service, "billing");
                assert_eq!(args.level, "ERROR");
                assert!(args.message.is_none());
                assert_eq!(args.metadata, r#"{"order_id":42}"#);
            }
            _ => panic!("Expected Ingest command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_validate() {
        let args = vec!["analytics-service", "config", "validate"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Config { action } => assert!(matches!(action, ConfigCommands::Validate)),
            _ => panic!("Expected Config command"),
        }
    }
}
