//! Step executor: turns command exits into typed failures.

use anyhow::{Context, Result};

use crate::application::ports::CommandRunner;
use crate::domain::command::{CommandLine, STDERR_TAIL_LINES, StderrTail};
use crate::domain::error::ProvisionError;

/// Runs commands through a [`CommandRunner`] and applies exit-code policy.
pub struct StepExecutor<R> {
    runner: R,
}

impl<R: CommandRunner> StepExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Run a mutating command with output streamed to the operator.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::StepFailed`] on a non-zero exit, or an error
    /// if the process could not be spawned.
    pub async fn run(&self, cmd: &CommandLine) -> Result<()> {
        let exit = self
            .runner
            .run_streamed(cmd)
            .await
            .with_context(|| format!("running `{cmd}`"))?;
        if exit.success() {
            return Ok(());
        }
        Err(ProvisionError::StepFailed {
            command: cmd.to_string(),
            exit_code: exit.code,
            stderr_tail: exit.stderr_tail,
        }
        .into())
    }

    /// Run a read-only query; `true` when it exits 0.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be spawned or timed out.
    pub async fn probe(&self, cmd: &CommandLine) -> Result<bool> {
        let output = self
            .runner
            .run(cmd)
            .await
            .with_context(|| format!("probing `{cmd}`"))?;
        Ok(output.status.success())
    }

    /// Run a read-only query and return its trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::StepFailed`] on a non-zero exit.
    pub async fn capture(&self, cmd: &CommandLine) -> Result<String> {
        let output = self
            .runner
            .run(cmd)
            .await
            .with_context(|| format!("running `{cmd}`"))?;
        if !output.status.success() {
            let mut tail = StderrTail::new(STDERR_TAIL_LINES);
            for line in String::from_utf8_lossy(&output.stderr).lines() {
                tail.push(line.to_string());
            }
            return Err(ProvisionError::StepFailed {
                command: cmd.to_string(),
                exit_code: output.status.code(),
                stderr_tail: tail.render(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
