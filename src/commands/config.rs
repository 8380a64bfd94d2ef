use analytics_service::config::{self, BackendKind, Config};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration (defaults, file and environment merged)
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&cfg)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!(path = %config_path.display(), "Validating configuration file");

    if !config_path.exists() {
        println!(
            "{}",
            format!(
                "Note: {} not found, using defaults and environment",
                config_path.display()
            )
            .dimmed()
        );
    }

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Backend: {}", storage_summary(&cfg));
    println!(
        "  Call timeout: {}",
        cfg.storage
            .call_timeout()
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "disabled".to_string())
    );
    println!("  UTC offset: {} min", cfg.time.utc_offset_minutes);

    Ok(())
}

/// Backend kind with its storage location
fn storage_summary(cfg: &Config) -> String {
    match cfg.storage.backend {
        BackendKind::Sqlite => format!("sqlite ({})", cfg.storage.sqlite.url),
        BackendKind::Document => format!("document ({})", cfg.storage.document.path),
    }
}
