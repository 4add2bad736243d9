//! Per-step records and the final run report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::config::ProvisionConfig;
use crate::domain::host::HostContext;
use crate::domain::step::Stage;

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StepOutcome {
    /// The action ran and succeeded.
    Applied,
    /// The precondition found the host already in the desired state.
    AlreadySatisfied,
    /// Not applicable on this host (e.g. optional input missing).
    Skipped { reason: String },
    /// A warn-and-continue step failed.
    Warned { error: String },
}

impl StepOutcome {
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, StepOutcome::Skipped { .. } | StepOutcome::Warned { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub id: &'static str,
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Counts shown in the summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub applied: usize,
    pub already_satisfied: usize,
    pub skipped: usize,
    pub warned: usize,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub context: HostContext,
    pub steps: Vec<StepRecord>,
    pub next_steps: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn counts(&self) -> OutcomeCounts {
        tally(&self.steps)
    }

    #[must_use]
    pub fn outcome_of(&self, id: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|r| r.id == id).map(|r| &r.outcome)
    }
}

#[must_use]
pub fn tally(records: &[StepRecord]) -> OutcomeCounts {
    records.iter().fold(OutcomeCounts::default(), |mut acc, r| {
        match r.outcome {
            StepOutcome::Applied => acc.applied += 1,
            StepOutcome::AlreadySatisfied => acc.already_satisfied += 1,
            StepOutcome::Skipped { .. } => acc.skipped += 1,
            StepOutcome::Warned { .. } => acc.warned += 1,
        }
        acc
    })
}

/// Manual follow-ups printed after a successful run.
#[must_use]
pub fn next_steps(config: &ProvisionConfig, records: &[StepRecord]) -> Vec<String> {
    let outcome = |id: &str| records.iter().find(|r| r.id == id).map(|r| &r.outcome);
    let mut steps = vec![format!(
        "Fill in the bot credentials: {}",
        config.env_path().display()
    )];

    if matches!(outcome("materialize-users-config"), Some(StepOutcome::Skipped { .. })) {
        steps.push(format!(
            "Create the users list (no example was found): {}",
            config.users_config_path().display()
        ));
    } else {
        steps.push(format!(
            "Edit the users list: {}",
            config.users_config_path().display()
        ));
    }

    let unit_installed = matches!(
        outcome("install-unit"),
        Some(StepOutcome::Applied | StepOutcome::AlreadySatisfied)
    );
    if !unit_installed {
        steps.push(format!(
            "Add {} to {} (or re-run with --generate-unit)",
            config.unit_file_name(),
            config.install_dir().display()
        ));
    } else if !matches!(
        outcome("start-unit"),
        Some(StepOutcome::Applied | StepOutcome::AlreadySatisfied)
    ) {
        steps.push(format!("Start the service: systemctl start {}", config.service_name));
    }
    steps.push(format!("Follow the logs: journalctl -u {} -f", config.service_name));
    steps
}
