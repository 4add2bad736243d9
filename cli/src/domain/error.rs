//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Provisioning errors ──────────────────────────────────────────────────────

/// Failure taxonomy shared by every stage of a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(
        "Provisioning requires root privileges (running as '{user}', uid {uid}).\n\nRe-run with: sudo {reinvoke}"
    )]
    PermissionDenied {
        user: String,
        uid: u32,
        reinvoke: String,
    },

    #[error("`{command}` {}{}", describe_exit(.exit_code), describe_tail(.stderr_tail))]
    StepFailed {
        command: String,
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    #[error("optional input missing: {}", .path.display())]
    MissingOptionalInput { path: PathBuf },

    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

fn describe_tail(tail: &str) -> String {
    if tail.trim().is_empty() {
        String::new()
    } else {
        format!("\n\n{}", tail.trim_end())
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating provisioning settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid service name '{0}': must match ^[a-z0-9][a-z0-9_.-]{{0,63}}$")]
    InvalidServiceName(String),

    #[error("Invalid install directory '{}': must be an absolute path below /", .0.display())]
    InvalidInstallDir(PathBuf),

    #[error("Invalid timezone '{0}': expected an IANA name such as Europe/Moscow")]
    InvalidTimezone(String),

    #[error("Invalid user name '{0}'")]
    InvalidUser(String),

    #[error("The service must not run as root. Set service_user to an unprivileged account.")]
    RootServiceUser,

    #[error("Invalid package name '{0}'")]
    InvalidPackage(String),

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

// ── Plan errors ───────────────────────────────────────────────────────────────

/// Violations of the ordering rules a provisioning plan must satisfy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("step '{step}' belongs to stage '{stage}' but follows a later stage")]
    StageOutOfOrder {
        step: &'static str,
        stage: &'static str,
    },

    #[error("duplicate step id '{0}'")]
    DuplicateStep(&'static str),

    #[error("firewall would be enabled before administrative access is allow-listed")]
    FirewallBeforeAdminAccess,
}
