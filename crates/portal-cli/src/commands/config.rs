//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use portal_auth::rbac::RoutePolicy;
use portal_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            match format {
                OutputFormat::Json => output::print_report(&config, format),
                OutputFormat::Table => {
                    let value = serde_json::to_value(&config)?;
                    if let serde_json::Value::Object(sections) = value {
                        for (name, section) in sections {
                            println!("[{name}]");
                            output::print_report(&section, format);
                        }
                    }
                }
            }
        }
        ConfigCommand::Validate => {
            let config = super::load_config(config_path)?;
            RoutePolicy::from_config(&config.permissions)?;
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("API", &config.api.base_url);
            output::print_kv("Storage", &config.storage.provider);
            output::print_kv("Audit", &config.audit.sink);
            output::print_kv(
                "Check interval",
                &format!("{}s", config.renewal.check_interval_seconds),
            );
        }
    }

    Ok(())
}
