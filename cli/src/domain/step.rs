//! Step model: stages, severities, readiness and the typed actions a step performs.
//!
//! Pure data only. Evaluating a step against the host lives in
//! `application::services::stages`.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::artifact::ConfigArtifact;

/// A group of steps sharing one responsibility, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Privilege,
    Package,
    Artifact,
    Config,
    ServiceRegistration,
    Hardening,
}

impl Stage {
    /// Every stage in the order the orchestrator runs them.
    pub const ORDERED: [Stage; 6] = [
        Stage::Privilege,
        Stage::Package,
        Stage::Artifact,
        Stage::Config,
        Stage::ServiceRegistration,
        Stage::Hardening,
    ];

    /// Process exit code reported when this stage fails fatally.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Stage::Privilege => 1,
            Stage::Package => 2,
            Stage::Artifact => 3,
            Stage::Config => 4,
            Stage::ServiceRegistration => 5,
            Stage::Hardening => 6,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Privilege => "privilege",
            Stage::Package => "package",
            Stage::Artifact => "artifact",
            Stage::Config => "config",
            Stage::ServiceRegistration => "service-registration",
            Stage::Hardening => "hardening",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Stage::Privilege => "Checking privileges",
            Stage::Package => "Installing packages",
            Stage::Artifact => "Preparing application directory",
            Stage::Config => "Writing configuration",
            Stage::ServiceRegistration => "Registering service",
            Stage::Hardening => "Hardening host",
        }
    }
}

/// What a failed step does to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Abort the run; later steps never execute.
    Fatal,
    /// Log the failure and move on.
    WarnAndContinue,
}

/// Result of a step's precondition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Host does not yet satisfy the step; run the action.
    Pending,
    /// Host already satisfies the step.
    Satisfied,
    /// Step cannot apply on this host; skip with a warning.
    NotApplicable(String),
}

// ── Actions ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageAction {
    RefreshIndex,
    InstallPackages(Vec<String>),
    InstallUv {
        installer_url: String,
        install_dir: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactAction {
    EnsureServiceUser(String),
    CheckoutSource { repository: String, dest: PathBuf },
    CreateInstallDir(PathBuf),
    AssignOwner { path: PathBuf, user: String },
    CreateVirtualenv { venv: PathBuf, user: String },
    InstallDependencies {
        venv: PathBuf,
        requirements: PathBuf,
        user: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    Materialize(ConfigArtifact),
    Harden {
        path: PathBuf,
        mode: u32,
        user: String,
    },
    LintUsersConfig {
        path: PathBuf,
        env: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAction {
    RenderUnit(ConfigArtifact),
    InstallUnit { source: PathBuf, dest: PathBuf },
    ReloadUnits { installed: PathBuf },
    EnableUnit { unit: String, installed: PathBuf },
    StartUnit { unit: String, installed: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardeningAction {
    SetTimezone(String),
    AllowAdminAccess(String),
    EnableFirewall,
}

/// The work a step performs, grouped by the stage that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Package(PackageAction),
    Artifact(ArtifactAction),
    Config(ConfigAction),
    Service(ServiceAction),
    Hardening(HardeningAction),
}

impl Action {
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Action::Package(_) => Stage::Package,
            Action::Artifact(_) => Stage::Artifact,
            Action::Config(_) => Stage::Config,
            Action::Service(_) => Stage::ServiceRegistration,
            Action::Hardening(_) => Stage::Hardening,
        }
    }
}

/// A named unit of work inside a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub id: &'static str,
    pub summary: String,
    pub severity: Severity,
    pub action: Action,
}

impl Step {
    #[must_use]
    pub fn fatal(id: &'static str, summary: impl Into<String>, action: Action) -> Self {
        Self {
            id,
            summary: summary.into(),
            severity: Severity::Fatal,
            action,
        }
    }

    #[must_use]
    pub fn warn(id: &'static str, summary: impl Into<String>, action: Action) -> Self {
        Self {
            id,
            summary: summary.into(),
            severity: Severity::WarnAndContinue,
            action,
        }
    }

    /// Stage is derived from the action so a step cannot be filed under the wrong stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.action.stage()
    }
}
