//! Per-stage step builders, precondition checks and actions.
//!
//! Each stage module exposes `steps`, `readiness` and `apply`; this module
//! dispatches on the typed [`Action`] so the orchestrator needs one loop only.

pub mod artifacts;
pub mod config;
pub mod hardening;
pub mod packages;
pub mod service_unit;

use anyhow::{Context, Result};

use crate::application::ports::{HostFs, HostSystem, TemplateStore};
use crate::domain::config::ProvisionConfig;
use crate::domain::host::HostContext;
use crate::domain::plan::Plan;
use crate::domain::report::StepOutcome;
use crate::domain::step::{Action, Readiness, Step};

/// Assemble and validate the plan for this host.
///
/// # Errors
///
/// Returns an error if a required template is missing or the assembled
/// steps violate a plan invariant.
pub fn build_plan(
    config: &ProvisionConfig,
    ctx: &HostContext,
    templates: &impl TemplateStore,
) -> Result<Plan> {
    let mut steps = packages::steps(config);
    steps.extend(artifacts::steps(config, ctx));
    steps.extend(config::steps(config, ctx, templates)?);
    steps.extend(service_unit::steps(config, ctx, templates)?);
    steps.extend(hardening::steps(config));
    Plan::new(steps).context("assembling provisioning plan")
}

/// Evaluate a step's precondition against the host.
///
/// # Errors
///
/// Returns an error if a read-only probe fails.
pub async fn readiness(
    step: &Step,
    host: &impl HostSystem,
    fs: &impl HostFs,
) -> Result<Readiness> {
    match &step.action {
        Action::Package(action) => Ok(packages::readiness(action, host, fs)),
        Action::Artifact(action) => artifacts::readiness(action, host, fs).await,
        Action::Config(action) => Ok(config::readiness(action, fs)),
        Action::Service(action) => service_unit::readiness(action, host, fs).await,
        Action::Hardening(action) => hardening::readiness(action, host).await,
    }
}

/// Run a step's action.
///
/// # Errors
///
/// Returns an error if the underlying command or filesystem operation fails.
pub async fn apply(
    step: &Step,
    host: &impl HostSystem,
    fs: &impl HostFs,
) -> Result<StepOutcome> {
    match &step.action {
        Action::Package(action) => packages::apply(action, host).await,
        Action::Artifact(action) => artifacts::apply(action, host, fs).await,
        Action::Config(action) => config::apply(action, host, fs).await,
        Action::Service(action) => service_unit::apply(action, host, fs).await,
        Action::Hardening(action) => hardening::apply(action, host).await,
    }
}
