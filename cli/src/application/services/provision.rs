//! Application service: the provisioning run.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::fmt;

use chrono::Utc;
use tracing::Instrument;

use crate::application::ports::{
    AddressLookup, HostFs, HostSystem, IdentityProbe, ProgressReporter, TemplateStore,
};
use crate::application::services::privilege::require_privileged;
use crate::application::services::stages;
use crate::domain::config::ProvisionConfig;
use crate::domain::report::{RunReport, StepOutcome, StepRecord, next_steps};
use crate::domain::step::{Readiness, Severity, Stage, Step};

pub struct ProvisionOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub config: &'a ProvisionConfig,
    /// Mutating commands are logged instead of executed.
    pub dry_run: bool,
    /// Command line quoted in the `sudo` hint.
    pub reinvoke: &'a str,
}

/// A fatal failure that ended the run.
#[derive(Debug)]
pub struct RunFailure {
    pub stage: Stage,
    /// `None` when the run failed before any step was evaluated.
    pub step: Option<&'static str>,
    pub error: anyhow::Error,
    /// Steps that finished before the failure.
    pub completed: Vec<StepRecord>,
}

impl RunFailure {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.stage.exit_code()
    }

    fn before_steps(stage: Stage, error: anyhow::Error) -> Self {
        Self { stage, step: None, error, completed: Vec::new() }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => {
                write!(f, "{} stage failed at '{step}': {:#}", self.stage.label(), self.error)
            }
            None => write!(f, "{} stage failed: {:#}", self.stage.label(), self.error),
        }
    }
}

/// Provision the host: guard, then every stage in order.
///
/// Stops at the first fatal failure. Warn-and-continue failures and
/// not-applicable steps are recorded and the run goes on.
///
/// # Errors
///
/// Returns a [`RunFailure`] naming the stage and step that failed and the
/// steps that completed before it.
pub async fn provision(
    host: &impl HostSystem,
    fs: &impl HostFs,
    identity: &impl IdentityProbe,
    lookup: &impl AddressLookup,
    templates: &impl TemplateStore,
    opts: ProvisionOptions<'_, impl ProgressReporter>,
) -> Result<RunReport, RunFailure> {
    let ProvisionOptions { reporter, config, dry_run, reinvoke } = opts;
    let started_at = Utc::now();

    reporter.stage(Stage::Privilege.title());
    let ctx = require_privileged(identity, config, reinvoke)
        .await
        .map_err(|e| RunFailure::before_steps(Stage::Privilege, e))?;
    reporter.success(&format!(
        "running as {} (service user '{}')",
        ctx.principal.name, ctx.service_user
    ));

    let address = match lookup.public_address().await {
        Ok(address) => Some(address),
        Err(e) => {
            tracing::debug!(error = %e, "public address lookup failed");
            reporter.warn(&format!("could not determine public address: {e:#}"));
            None
        }
    };
    let ctx = ctx.with_public_address(address);

    // Plan assembly only fails on a broken build (missing template), before anything mutates.
    let plan = stages::build_plan(config, &ctx, templates)
        .map_err(|e| RunFailure::before_steps(Stage::Privilege, e))?;
    tracing::debug!(steps = plan.len(), dry_run, "plan assembled");

    let mut records: Vec<StepRecord> = Vec::with_capacity(plan.len());
    let mut current = Stage::Privilege;

    for step in plan.steps() {
        let stage = step.stage();
        if stage != current {
            reporter.stage(stage.title());
            current = stage;
        }
        reporter.step(&step.summary);

        let result = evaluate(step, host, fs)
            .instrument(tracing::info_span!("step", id = step.id))
            .await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) if step.severity == Severity::Fatal => {
                tracing::error!(error = %format!("{error:#}"), "fatal step failed");
                return Err(RunFailure { stage, step: Some(step.id), error, completed: records });
            }
            Err(error) => {
                tracing::warn!(error = %format!("{error:#}"), "step failed, continuing");
                StepOutcome::Warned { error: format!("{error:#}") }
            }
        };

        match &outcome {
            StepOutcome::Applied => reporter.success(&step.summary),
            StepOutcome::AlreadySatisfied => {
                reporter.success(&format!("{} (already done)", step.summary));
            }
            StepOutcome::Skipped { reason } => {
                reporter.warn(&format!("{}: skipped, {reason}", step.summary));
            }
            StepOutcome::Warned { error } => reporter.warn(&format!("{}: {error}", step.summary)),
        }
        tracing::info!(id = step.id, outcome = ?outcome, "step finished");
        records.push(StepRecord { id: step.id, stage, outcome });
    }

    let next_steps = next_steps(config, &records);
    Ok(RunReport {
        started_at,
        finished_at: Utc::now(),
        dry_run,
        context: ctx,
        steps: records,
        next_steps,
    })
}

/// Check the precondition and run the action when the host is not there yet.
async fn evaluate(
    step: &Step,
    host: &impl HostSystem,
    fs: &impl HostFs,
) -> anyhow::Result<StepOutcome> {
    match stages::readiness(step, host, fs).await? {
        Readiness::Satisfied => Ok(StepOutcome::AlreadySatisfied),
        Readiness::NotApplicable(reason) => Ok(StepOutcome::Skipped { reason }),
        Readiness::Pending => stages::apply(step, host, fs).await,
    }
}
