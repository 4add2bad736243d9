//! Application service: privilege guard.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::IdentityProbe;
use crate::domain::config::ProvisionConfig;
use crate::domain::error::ProvisionError;
use crate::domain::host::{HostContext, Principal};

/// Verify the orchestrator runs as root and build the run context.
///
/// `reinvoke` is the command line echoed back in the `sudo` hint.
///
/// # Errors
///
/// Returns [`ProvisionError::PermissionDenied`] when the effective uid is not 0,
/// or an error if the identity cannot be determined.
pub async fn require_privileged(
    identity: &impl IdentityProbe,
    config: &ProvisionConfig,
    reinvoke: &str,
) -> Result<HostContext> {
    let uid = identity
        .effective_uid()
        .await
        .context("determining effective uid")?;
    let name = identity
        .effective_user()
        .await
        .unwrap_or_else(|_| uid.to_string());
    let principal = Principal { name, uid };

    if !principal.is_root() {
        return Err(ProvisionError::PermissionDenied {
            user: principal.name,
            uid,
            reinvoke: reinvoke.to_string(),
        }
        .into());
    }

    let invoking = identity.invoking_user();
    let service_user = config.resolve_service_user(invoking.as_deref())?;
    tracing::debug!(%service_user, invoking = ?invoking, "resolved service principal");

    Ok(HostContext {
        principal,
        service_user,
        install_dir: config.install_dir(),
        package_manager_present: identity.on_path("uv"),
        public_address: None,
    })
}
