//! Facts about the host established once at the start of a run.

use std::path::PathBuf;

use serde::Serialize;

/// The account the orchestrator runs as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub name: String,
    pub uid: u32,
}

impl Principal {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.uid == 0
    }
}

/// Read-only run context produced by the privilege guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostContext {
    pub principal: Principal,
    /// Unprivileged account that owns the install directory and runs the bot.
    pub service_user: String,
    pub install_dir: PathBuf,
    /// Whether `uv` was already on `PATH` when the run started.
    pub package_manager_present: bool,
    /// Externally visible address, if the lookup succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_address: Option<String>,
}

impl HostContext {
    /// Attach the result of the public address lookup. Called once, before any step runs.
    #[must_use]
    pub fn with_public_address(mut self, address: Option<String>) -> Self {
        self.public_address = address;
        self
    }
}
