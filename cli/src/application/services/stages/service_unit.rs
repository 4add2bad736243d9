//! Service registration stage: unit file, daemon reload, enable and start.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{HostFs, HostSystem, TemplateStore};
use crate::application::services::materialize::{Materialized, materialize_artifact};
use crate::domain::artifact::{ConfigArtifact, UNIT_MODE};
use crate::domain::config::ProvisionConfig;
use crate::domain::host::HostContext;
use crate::domain::report::StepOutcome;
use crate::domain::service::ServiceDescriptor;
use crate::domain::step::{Action, Readiness, ServiceAction, Step};

/// Embedded systemd unit template used by `--generate-unit`.
pub const UNIT_TEMPLATE: &str = "unit.template";

/// # Errors
///
/// Returns an error if unit generation is requested but the template is not embedded.
pub fn steps(
    config: &ProvisionConfig,
    ctx: &HostContext,
    templates: &impl TemplateStore,
) -> Result<Vec<Step>> {
    let unit = config.unit_file_name();
    let source = config.unit_source_path();
    let installed = config.unit_dest_path();
    let mut steps = Vec::new();

    if config.generate_unit {
        let rendered = ServiceDescriptor::for_bot(config, &ctx.service_user)
            .render(templates.template(UNIT_TEMPLATE)?);
        steps.push(Step::fatal(
            "render-unit",
            format!("Generating {unit}"),
            Action::Service(ServiceAction::RenderUnit(ConfigArtifact::literal(
                &source, UNIT_MODE, rendered,
            ))),
        ));
    }

    steps.extend([
        Step::fatal(
            "install-unit",
            format!("Installing {unit}"),
            Action::Service(ServiceAction::InstallUnit { source, dest: installed.clone() }),
        ),
        Step::fatal(
            "reload-units",
            "Reloading systemd",
            Action::Service(ServiceAction::ReloadUnits { installed: installed.clone() }),
        ),
        Step::fatal(
            "enable-unit",
            format!("Enabling {unit}"),
            Action::Service(ServiceAction::EnableUnit {
                unit: unit.clone(),
                installed: installed.clone(),
            }),
        ),
    ]);

    if config.start_service {
        steps.push(Step::fatal(
            "start-unit",
            format!("Starting {unit}"),
            Action::Service(ServiceAction::StartUnit { unit, installed }),
        ));
    }
    Ok(steps)
}

fn not_installed(installed: &Path) -> Readiness {
    Readiness::NotApplicable(format!("no unit installed at {}", installed.display()))
}

pub async fn readiness(
    action: &ServiceAction,
    host: &impl HostSystem,
    fs: &impl HostFs,
) -> Result<Readiness> {
    Ok(match action {
        ServiceAction::RenderUnit(artifact) => {
            if fs.exists(&artifact.path) {
                Readiness::Satisfied
            } else {
                Readiness::Pending
            }
        }
        ServiceAction::InstallUnit { source, dest } => {
            if !fs.exists(source) {
                Readiness::NotApplicable(format!(
                    "{} not found (add it or re-run with --generate-unit)",
                    source.display()
                ))
            } else if fs.exists(dest) && fs.read(source)? == fs.read(dest)? {
                Readiness::Satisfied
            } else {
                Readiness::Pending
            }
        }
        ServiceAction::ReloadUnits { installed } if !fs.exists(installed) => not_installed(installed),
        ServiceAction::ReloadUnits { .. } => Readiness::Pending,
        ServiceAction::EnableUnit { installed, .. } | ServiceAction::StartUnit { installed, .. }
            if !fs.exists(installed) =>
        {
            not_installed(installed)
        }
        ServiceAction::EnableUnit { unit, .. } => {
            if host.is_enabled(unit).await? {
                Readiness::Satisfied
            } else {
                Readiness::Pending
            }
        }
        ServiceAction::StartUnit { unit, .. } => {
            if host.is_active(unit).await? {
                Readiness::Satisfied
            } else {
                Readiness::Pending
            }
        }
    })
}

pub async fn apply(
    action: &ServiceAction,
    host: &impl HostSystem,
    fs: &impl HostFs,
) -> Result<StepOutcome> {
    match action {
        ServiceAction::RenderUnit(artifact) => {
            return Ok(match materialize_artifact(fs, artifact)? {
                Materialized::Created => StepOutcome::Applied,
                Materialized::SkippedExisting | Materialized::MissingSource(_) => {
                    StepOutcome::AlreadySatisfied
                }
            });
        }
        ServiceAction::InstallUnit { source, dest } => {
            fs.copy(source, dest, UNIT_MODE)
                .with_context(|| format!("copying unit to {}", dest.display()))?;
        }
        ServiceAction::ReloadUnits { .. } => host.reload_units().await?,
        ServiceAction::EnableUnit { unit, .. } => host.enable(unit).await?,
        ServiceAction::StartUnit { unit, .. } => host.start(unit).await?,
    }
    Ok(StepOutcome::Applied)
}
