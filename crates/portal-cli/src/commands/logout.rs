//! Logout.

use portal_core::error::AppError;

use crate::output;

use super::SessionContext;

/// Execute `logout`
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let ctx = SessionContext::open(config_path).await?;
    if !ctx.session.store().has_credentials().await {
        output::print_warning("No stored session");
        return Ok(());
    }

    ctx.session.logout().await;
    output::print_success("Logged out");
    Ok(())
}
