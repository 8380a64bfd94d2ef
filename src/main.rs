use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use analytics_service::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();
    let command = args.get_command();

    // The server initializes tracing from its loaded configuration; one-shot
    // commands keep console output quiet
    if !matches!(command, cli::Commands::Serve) {
        init_tracing("warn", "text");
    }

    // Dispatch to appropriate command handler
    match command {
        cli::Commands::Serve => {
            commands::serve::execute(&args.config).await?;
        }
        cli::Commands::Logs(logs_args) => {
            commands::logs::execute(&args.config, logs_args).await?;
        }
        cli::Commands::Ingest(ingest_args) => {
            commands::ingest::execute(&args.config, ingest_args).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("Analytics Service v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
