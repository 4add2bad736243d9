//! Identity of the running process, read through `id` and the environment.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, IdentityProbe};
use crate::domain::command::CommandLine;
use crate::infra::executor::StepExecutor;

/// Production `IdentityProbe`.
pub struct SystemIdentity<R> {
    exec: StepExecutor<R>,
}

impl<R: CommandRunner> SystemIdentity<R> {
    pub fn new(runner: R) -> Self {
        Self { exec: StepExecutor::new(runner) }
    }
}

impl<R: CommandRunner> IdentityProbe for SystemIdentity<R> {
    async fn effective_uid(&self) -> Result<u32> {
        let uid = self.exec.capture(&CommandLine::new("id").arg("-u")).await?;
        uid.parse().with_context(|| format!("unexpected output from `id -u`: {uid}"))
    }

    async fn effective_user(&self) -> Result<String> {
        self.exec.capture(&CommandLine::new("id").arg("-un")).await
    }

    fn invoking_user(&self) -> Option<String> {
        std::env::var("SUDO_USER").ok().filter(|u| !u.is_empty())
    }

    fn on_path(&self, program: &str) -> bool {
        find_on_path(program).is_some()
    }
}

/// First executable named `program` in `$PATH`.
pub(crate) fn find_on_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| {
            std::fs::metadata(candidate)
                .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        })
}
