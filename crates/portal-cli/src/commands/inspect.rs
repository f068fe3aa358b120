//! Token inspection.

use clap::Args;
use serde::Serialize;

use portal_auth::jwt::{TokenType, codec};
use portal_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for `inspect`
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// The bearer token to decode
    pub token: String,

    /// Expiring-soon buffer in minutes (defaults to the configured value)
    #[arg(long)]
    pub buffer_minutes: Option<u64>,
}

/// Decoded claims and derived expiry state
#[derive(Debug, Serialize)]
struct TokenReport {
    subject: Option<String>,
    token_type: TokenType,
    issued_at: Option<String>,
    expires_at: Option<String>,
    expired: bool,
    expiring_soon: bool,
    seconds_remaining: Option<u64>,
}

/// Execute `inspect`
pub async fn execute(
    args: &InspectArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let buffer = match args.buffer_minutes {
        Some(buffer) => buffer,
        None => super::load_config(config_path)?.renewal.expiring_soon_buffer_minutes,
    };

    let claims = codec::decode(&args.token)
        .ok_or_else(|| AppError::validation("Token is malformed or its claims are unreadable"))?;

    let now = codec::now_ms();
    let report = TokenReport {
        subject: claims.sub.clone(),
        token_type: claims.token_type,
        issued_at: claims
            .iat
            .map(|iat| super::format_epoch_ms(iat.saturating_mul(1000))),
        expires_at: claims.expires_at_ms().map(super::format_epoch_ms),
        expired: claims.is_expired_at(now),
        expiring_soon: claims.is_expiring_soon_at(buffer, now),
        seconds_remaining: claims.time_remaining_at(now),
    };

    output::print_report(&report, format);
    if report.expires_at.is_none() {
        output::print_warning("Token has no expiry claim and is treated as expired");
    }
    Ok(())
}
