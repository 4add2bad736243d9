//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::domain::command::CommandLine;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Exit of a command whose output was streamed to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedExit {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    /// Last lines the command wrote to stderr.
    pub stderr_tail: String,
}

impl StreamedExit {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a read-only query and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds the
    /// runner's timeout. On timeout the child is killed.
    async fn run(&self, cmd: &CommandLine) -> Result<Output>;

    /// Run a mutating command with stdout passed through and stderr echoed
    /// live while its tail is retained. No timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or awaited.
    async fn run_streamed(&self, cmd: &CommandLine) -> Result<StreamedExit>;
}

// ── Host Capability Ports ─────────────────────────────────────────────────────
//
// One method per capability. Mutating methods fail with
// `ProvisionError::StepFailed` when the underlying command exits non-zero.

/// OS package manager (apt).
#[allow(async_fn_in_trait)]
pub trait PackageManager {
    async fn refresh_index(&self) -> Result<()>;
    async fn install_packages(&self, packages: &[String]) -> Result<()>;
}

/// Python runtime tooling (uv).
#[allow(async_fn_in_trait)]
pub trait Toolchain {
    /// Whether `program` resolves on `PATH`.
    fn has_program(&self, program: &str) -> bool;
    async fn install_uv(&self, installer_url: &str, install_dir: &Path) -> Result<()>;
    /// Create a virtual environment as `user`.
    async fn create_venv(&self, venv: &Path, user: &str) -> Result<()>;
    /// Install a requirements file into `venv` as `user`.
    async fn install_requirements(&self, venv: &Path, requirements: &Path, user: &str)
    -> Result<()>;
}

/// Local accounts and ownership.
#[allow(async_fn_in_trait)]
pub trait Accounts {
    async fn user_exists(&self, user: &str) -> Result<bool>;
    async fn create_system_user(&self, user: &str) -> Result<()>;
    /// Give `user` (and its login group) ownership of `path`.
    async fn chown(&self, path: &Path, user: &str, recursive: bool) -> Result<()>;
}

/// Source-control client (git).
#[allow(async_fn_in_trait)]
pub trait SourceControl {
    async fn clone_repo(&self, repository: &str, dest: &Path) -> Result<()>;
}

/// Init system (systemd).
#[allow(async_fn_in_trait)]
pub trait InitSystem {
    async fn reload_units(&self) -> Result<()>;
    async fn is_enabled(&self, unit: &str) -> Result<bool>;
    async fn enable(&self, unit: &str) -> Result<()>;
    async fn is_active(&self, unit: &str) -> Result<bool>;
    async fn start(&self, unit: &str) -> Result<()>;
}

/// Host firewall (ufw).
#[allow(async_fn_in_trait)]
pub trait Firewall {
    async fn allow_rule(&self, rule: &str) -> Result<()>;
    /// Whether the firewall reports itself active.
    async fn firewall_active(&self) -> Result<bool>;
    async fn enable_firewall(&self) -> Result<()>;
}

/// Host clock settings (timedatectl).
#[allow(async_fn_in_trait)]
pub trait HostClock {
    async fn timezone(&self) -> Result<String>;
    async fn set_timezone(&self, timezone: &str) -> Result<()>;
}

/// Composite trait: any type implementing every command-backed capability.
pub trait HostSystem:
    PackageManager + Toolchain + Accounts + SourceControl + InitSystem + Firewall + HostClock
{
}

/// Blanket implementation: any type implementing all sub-traits is a `HostSystem`.
impl<T> HostSystem for T where
    T: PackageManager + Toolchain + Accounts + SourceControl + InitSystem + Firewall + HostClock
{
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Abstracts the host filesystem so materialization can be tested in memory.
pub trait HostFs {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    /// Create `path` with `mode` and write `content`, failing if it exists.
    fn write_new(&self, path: &Path, content: &[u8], mode: u32) -> Result<()>;
    /// Replace `dest` with a copy of `src` carrying `mode`.
    fn copy(&self, src: &Path, dest: &Path, mode: u32) -> Result<()>;
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;
}

// ── Identity and Network Ports ────────────────────────────────────────────────

/// Who is running the orchestrator.
#[allow(async_fn_in_trait)]
pub trait IdentityProbe {
    async fn effective_uid(&self) -> Result<u32>;
    async fn effective_user(&self) -> Result<String>;
    /// The operator behind `sudo`, if any.
    fn invoking_user(&self) -> Option<String>;
    /// Whether `program` resolves on `PATH`.
    fn on_path(&self, program: &str) -> bool;
}

/// Best-effort lookup of the host's externally visible address.
#[allow(async_fn_in_trait)]
pub trait AddressLookup {
    async fn public_address(&self) -> Result<String>;
}

// ── Asset Port ────────────────────────────────────────────────────────────────

/// Templates compiled into the binary.
pub trait TemplateStore {
    /// Contents of the named template.
    ///
    /// # Errors
    ///
    /// Returns an error if no template with that name is embedded.
    fn template(&self, name: &str) -> Result<&'static str>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit a stage heading.
    fn stage(&self, title: &str);
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
