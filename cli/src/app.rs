//! Application context: unified state passed to the command handler.
//!
//! `AppContext` owns the resolved settings, the output context and the
//! production implementations of every port.

use crate::domain::config::ProvisionConfig;
use crate::infra::assets::EmbeddedTemplates;
use crate::infra::command_runner::{Echo, PROBE_TIMEOUT, TokioCommandRunner};
use crate::infra::fs::LocalFs;
use crate::infra::identity::SystemIdentity;
use crate::infra::network::UreqAddressLookup;
use crate::infra::shell::ShellHost;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Log mutating commands instead of running them.
    pub dry_run: bool,
}

/// Unified application context.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Settings after file, flags and validation.
    pub config: ProvisionConfig,
    pub dry_run: bool,
    /// apt, uv, accounts, git, systemd, ufw and timedatectl.
    pub host: ShellHost<TokioCommandRunner>,
    pub fs: LocalFs,
    pub identity: SystemIdentity<TokioCommandRunner>,
    pub lookup: UreqAddressLookup,
    pub templates: EmbeddedTemplates,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: &AppFlags, config: ProvisionConfig) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let echo = match (flags.output.quiet, flags.output.json) {
            (true, _) => Echo::Silent,
            (false, true) => Echo::Stderr,
            (false, false) => Echo::Terminal,
        };
        let runner = || {
            TokioCommandRunner::new(PROBE_TIMEOUT)
                .with_echo(echo)
                .with_dry_run(flags.dry_run)
        };

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet, flags.output.json),
            mode,
            lookup: UreqAddressLookup::new(config.address_lookup_url.clone()),
            config,
            dry_run: flags.dry_run,
            host: ShellHost::new(runner()),
            fs: LocalFs::new(flags.dry_run),
            identity: SystemIdentity::new(runner()),
            templates: EmbeddedTemplates,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
}
