//! Route permission checks.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use portal_auth::rbac::{RoutePermissionGate, RoutePolicy};
use portal_core::error::AppError;
use portal_core::types::{Principal, UserRole};
use portal_storage::audit::build_audit_sink;

use crate::output::{self, OutputFormat};

use super::SessionContext;

/// Arguments for `check`
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Route paths to check
    #[arg(required = true)]
    pub routes: Vec<String>,

    /// Role to check as (defaults to the stored session user)
    #[arg(long)]
    pub role: Option<UserRole>,

    /// User ID recorded in the audit log; only used with `--role`
    #[arg(long, default_value = "cli")]
    pub user_id: String,

    /// Treat the `--role` principal as a superuser
    #[arg(long)]
    pub superuser: bool,
}

/// Decision display row
#[derive(Debug, Serialize, Tabled)]
struct DecisionRow {
    /// Route
    route: String,
    /// Granted
    granted: String,
    /// Source
    source: String,
}

/// Execute `check`
pub async fn execute(
    args: &CheckArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = SessionContext::open(config_path).await?;
    let audit = build_audit_sink(&ctx.config.audit).await?;
    let policy = RoutePolicy::from_config(&ctx.config.permissions)?;

    let principal = args.role.map(|role| {
        let mut principal = Principal::new(args.user_id.clone(), String::new(), role);
        principal.is_superuser = args.superuser;
        principal
    });

    let gate = RoutePermissionGate::new(Arc::clone(&ctx.session), ctx.client.clone(), audit, policy);

    let mut rows = Vec::with_capacity(args.routes.len());
    for route in &args.routes {
        let decision = match &principal {
            Some(principal) => gate.check_permission_as(principal, route).await,
            None => gate.check_permission(route).await,
        };
        rows.push(DecisionRow {
            route: decision.route_path,
            granted: if decision.granted { "✓" } else { "✗" }.to_string(),
            source: serde_json::to_value(decision.source)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
        });
    }

    output::print_list(&rows, format);
    Ok(())
}
