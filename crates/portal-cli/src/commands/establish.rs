//! Seeds the session from an issued token pair.

use clap::Args;

use portal_core::error::AppError;
use portal_core::types::TokenPair;

use crate::output;

use super::SessionContext;

/// Arguments for `establish`
#[derive(Debug, Args)]
pub struct EstablishArgs {
    /// Access token
    #[arg(long)]
    pub access_token: String,

    /// Refresh token
    #[arg(long)]
    pub refresh_token: String,

    /// Access token lifetime in seconds (defaults to the configured value)
    #[arg(long)]
    pub expires_in: Option<u64>,

    /// Refresh token lifetime in seconds (defaults to the configured value)
    #[arg(long)]
    pub refresh_expires_in: Option<u64>,
}

/// Execute `establish`
pub async fn execute(args: &EstablishArgs, config_path: &str) -> Result<(), AppError> {
    let ctx = SessionContext::open(config_path).await?;

    let tokens = TokenPair {
        access_token: args.access_token.clone(),
        refresh_token: args.refresh_token.clone(),
        token_type: "bearer".to_string(),
        expires_in: args.expires_in,
        refresh_expires_in: args.refresh_expires_in,
    };
    let pair = ctx.session.establish(&tokens, None).await?;

    output::print_success(&format!(
        "Session stored; access valid until {}",
        super::format_epoch_ms(pair.access_expires_at)
    ));
    Ok(())
}
