//! Stored session status.

use serde::Serialize;

use portal_auth::jwt::codec;
use portal_core::error::AppError;
use portal_core::types::UserRole;

use crate::output::{self, OutputFormat};

use super::SessionContext;

#[derive(Debug, Serialize)]
struct StatusReport {
    storage: String,
    has_credentials: bool,
    valid_session: bool,
    user_id: Option<String>,
    role: Option<UserRole>,
    access_expires_at: Option<String>,
    refresh_expires_at: Option<String>,
    access_seconds_remaining: Option<u64>,
    access_expiring_soon: Option<bool>,
}

/// Execute `status`
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let ctx = SessionContext::open(config_path).await?;
    let credentials = ctx.session.credentials().await;
    let principal = ctx.session.principal().await;
    let buffer = ctx.config.renewal.expiring_soon_buffer_minutes;

    let report = StatusReport {
        storage: ctx.session.store().provider_type().to_string(),
        has_credentials: credentials.is_some(),
        valid_session: ctx.session.has_valid_session().await,
        user_id: principal.as_ref().map(|p| p.id.clone()),
        role: principal.map(|p| p.role),
        access_expires_at: credentials
            .as_ref()
            .map(|c| super::format_epoch_ms(c.access_expires_at)),
        refresh_expires_at: credentials
            .as_ref()
            .map(|c| super::format_epoch_ms(c.refresh_expires_at)),
        access_seconds_remaining: credentials
            .as_ref()
            .and_then(|c| codec::time_remaining(&c.access_token)),
        access_expiring_soon: credentials
            .as_ref()
            .map(|c| codec::is_expiring_soon(&c.access_token, buffer)),
    };

    output::print_report(&report, format);
    Ok(())
}
