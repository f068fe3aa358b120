//! One-shot renewal.

use std::sync::Arc;

use clap::Args;

use portal_auth::session::{RenewalCoordinator, RenewalOutcome};
use portal_core::error::AppError;
use portal_storage::audit::build_audit_sink;

use crate::output::{self, OutputFormat};

use super::SessionContext;

/// Arguments for `refresh`
#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Only renew when the access token is close to expiry
    #[arg(long)]
    pub if_due: bool,
}

#[derive(Debug, serde::Serialize)]
struct RefreshReport {
    outcome: RenewalOutcome,
    access_expires_at: Option<String>,
}

/// Execute `refresh`
pub async fn execute(
    args: &RefreshArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = SessionContext::open(config_path).await?;
    let audit = build_audit_sink(&ctx.config.audit).await?;
    let coordinator = RenewalCoordinator::new(
        Arc::clone(&ctx.session),
        ctx.client.clone(),
        audit,
        ctx.config.renewal.clone(),
    );

    let outcome = if args.if_due {
        coordinator.run_cycle().await
    } else {
        coordinator.request_renewal().await
    };

    let report = RefreshReport {
        outcome,
        access_expires_at: ctx
            .session
            .credentials()
            .await
            .map(|c| super::format_epoch_ms(c.access_expires_at)),
    };
    output::print_report(&report, format);

    match outcome {
        RenewalOutcome::TransientFailure => {
            Err(AppError::external_service("Renewal failed; stored credentials kept"))
        }
        RenewalOutcome::SessionExpired => {
            output::print_warning("Refresh token expired; session cleared");
            Ok(())
        }
        _ => Ok(()),
    }
}
