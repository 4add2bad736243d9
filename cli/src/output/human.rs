//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::services::provision::RunFailure;
use crate::domain::error::ProvisionError;
use crate::domain::report::RunReport;
use crate::output::OutputContext;

/// Renders run results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the end-of-run summary.
    pub fn render_summary(&self, report: &RunReport) {
        let counts = report.counts();
        self.ctx.line("");
        if report.dry_run {
            self.ctx.header("Dry run complete (no changes were made)");
        } else {
            self.ctx.header("Provisioning complete");
        }
        self.ctx
            .kv("Install dir:", &report.context.install_dir.display().to_string());
        self.ctx.kv("Service user:", &report.context.service_user);
        self.ctx.kv(
            "Steps:",
            &format!(
                "{} applied, {} already done, {} skipped, {} warned",
                counts.applied, counts.already_satisfied, counts.skipped, counts.warned
            ),
        );
        if let Some(address) = &report.context.public_address {
            self.ctx.kv("Public address:", address);
        }

        self.ctx.line("");
        self.ctx.header("Next steps");
        for (i, step) in report.next_steps.iter().enumerate() {
            self.ctx.line(&format!("  {}. {step}", i + 1));
        }
    }

    /// Render a fatal failure. Always shown, even with `--quiet`.
    pub fn render_failure(&self, failure: &RunFailure) {
        let styles = &self.ctx.styles;
        eprintln!();
        match failure.step {
            Some(step) => self.ctx.error(&format!(
                "{} stage failed at step {}",
                failure.stage.label().style(styles.bold),
                step.style(styles.bold)
            )),
            None => self.ctx.error(&format!(
                "{} stage failed",
                failure.stage.label().style(styles.bold)
            )),
        }

        match failure.error.downcast_ref::<ProvisionError>() {
            Some(ProvisionError::StepFailed { command, exit_code, stderr_tail }) => {
                eprintln!("    {}  {command}", "command:".style(styles.dim));
                let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                eprintln!("    {}  {code}", "exit:".style(styles.dim));
                if !stderr_tail.trim().is_empty() {
                    eprintln!("    {}", "stderr (last lines):".style(styles.dim));
                    for line in stderr_tail.lines() {
                        eprintln!("      {line}");
                    }
                }
            }
            _ => {
                for line in format!("{:#}", failure.error).lines() {
                    eprintln!("    {line}");
                }
            }
        }

        if failure.step.is_some() {
            eprintln!();
            eprintln!(
                "    Fix the problem above and run again; re-running is safe ({} steps already done).",
                failure.completed.len()
            );
        }
    }
}
