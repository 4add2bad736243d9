//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with a timeout and kill for probes.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::application::ports::{CommandRunner, StreamedExit};
use crate::domain::command::{CommandLine, StderrTail};

/// Timeout for read-only probes (`id`, `systemctl is-enabled`, `ufw status`, ...).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a streamed command's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// stdout to stdout, stderr to stderr.
    Terminal,
    /// Both to stderr, keeping stdout free for machine-readable output.
    Stderr,
    /// Nothing is echoed; the stderr tail is still kept.
    Silent,
}

/// Production `CommandRunner`.
///
/// Probes run with captured output under `timeout`, and the child is killed
/// if the timeout fires. Streamed commands have no timeout. In dry-run mode
/// streamed commands are logged and reported as successful without spawning.
pub struct TokioCommandRunner {
    timeout: Duration,
    echo: Echo,
    dry_run: bool,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, echo: Echo::Terminal, dry_run: false }
    }

    #[must_use]
    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.echo = echo;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, cmd: &CommandLine) -> Result<Output> {
        let program = cmd.program.as_str();
        tracing::debug!(command = %cmd, "probe");
        let mut child = tokio::process::Command::new(program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result,
            () = tokio::time::sleep(self.timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", self.timeout.as_secs())
            }
        }
    }

    async fn run_streamed(&self, cmd: &CommandLine) -> Result<StreamedExit> {
        let program = cmd.program.as_str();
        if self.dry_run {
            tracing::info!(command = %cmd, "dry run, not executed");
            if self.echo != Echo::Silent {
                eprintln!("  [dry-run] {cmd}");
            }
            return Ok(StreamedExit { code: Some(0), stderr_tail: String::new() });
        }

        tracing::info!(command = %cmd, "exec");
        let mut child = tokio::process::Command::new(program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let echo = self.echo;

        let (status, (), tail) = tokio::join!(
            child.wait(),
            async {
                if let Some(h) = stdout_handle {
                    forward_lines(h, |line| match echo {
                        Echo::Terminal => println!("{line}"),
                        Echo::Stderr => eprintln!("{line}"),
                        Echo::Silent => {}
                    })
                    .await;
                }
            },
            async {
                let mut tail = StderrTail::default();
                if let Some(h) = stderr_handle {
                    forward_lines(h, |line| {
                        if echo != Echo::Silent {
                            eprintln!("{line}");
                        }
                        tail.push(line);
                    })
                    .await;
                }
                tail
            },
        );

        let status = status.with_context(|| format!("waiting for {program}"))?;
        tracing::debug!(command = %cmd, code = ?status.code(), "exited");
        Ok(StreamedExit { code: status.code(), stderr_tail: tail.render() })
    }
}

/// Read `reader` line by line until EOF, handing each line to `sink`.
async fn forward_lines(reader: impl AsyncRead + Unpin, mut sink: impl FnMut(String)) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        sink(line);
    }
}
