//! CLI command definitions and dispatch.

pub mod check;
pub mod config;
pub mod establish;
pub mod inspect;
pub mod logout;
pub mod refresh;
pub mod status;

use std::sync::{Arc, Weak};

use clap::{Parser, Subcommand};

use portal_auth::session::{CredentialStore, SessionManager};
use portal_client::HttpAuthClient;
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_core::traits::AccessTokenSource;
use portal_storage::StorageManager;

use crate::output::OutputFormat;

/// Portal session administration
#[derive(Debug, Parser)]
#[command(name = "portal-cli", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a bearer token and report its expiry
    Inspect(inspect::InspectArgs),
    /// Show the stored session
    Status,
    /// Store an issued token pair as the current session
    Establish(establish::EstablishArgs),
    /// Run one renewal cycle against the remote API
    Refresh(refresh::RefreshArgs),
    /// Check route permissions for a role
    Check(check::CheckArgs),
    /// Log out and clear the stored session
    Logout,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Inspect(args) => inspect::execute(args, &self.config, self.format).await,
            Commands::Status => status::execute(&self.config, self.format).await,
            Commands::Establish(args) => establish::execute(args, &self.config).await,
            Commands::Refresh(args) => refresh::execute(args, &self.config, self.format).await,
            Commands::Check(args) => check::execute(args, &self.config, self.format).await,
            Commands::Logout => logout::execute(&self.config).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file and environment
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(Some(config_path))
}

/// The session context wired from configuration.
pub struct SessionContext {
    pub config: AppConfig,
    pub client: Arc<HttpAuthClient>,
    pub session: Arc<SessionManager>,
}

impl SessionContext {
    /// Helper: open persisted storage and wire the session over it
    pub async fn open(config_path: &str) -> Result<Self, AppError> {
        let config = load_config(config_path)?;

        let storage = StorageManager::new(&config.storage).await?;
        let store = CredentialStore::load(Arc::new(storage), &config.storage.key_prefix).await?;

        let client = Arc::new(HttpAuthClient::new(config.api.clone())?);
        let session = Arc::new(
            SessionManager::new(Arc::new(store), config.renewal.clone())
                .with_logout_endpoint(client.clone()),
        );
        let source: Weak<dyn AccessTokenSource> = Arc::downgrade(&session) as Weak<SessionManager>;
        client.bind_token_source(source);

        Ok(Self {
            config,
            client,
            session,
        })
    }
}

/// Helper: format epoch milliseconds as RFC 3339
pub fn format_epoch_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
