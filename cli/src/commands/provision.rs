//! Provision command implementation.
//!
//! Wires the production ports into the provisioning service and renders the
//! outcome as text or JSON.

use crate::app::AppContext;
use crate::application::services::provision::{ProvisionOptions, RunFailure, provision};
use crate::domain::report::RunReport;
use crate::output::human::HumanRenderer;
use crate::output::json;
use crate::output::reporter::TerminalReporter;

/// Run the provisioning and return the process exit code.
pub async fn run(app: &AppContext, reinvoke: &str) -> i32 {
    let reporter = TerminalReporter::new(&app.output);
    if app.dry_run {
        app.output.info("dry run: mutating commands are printed, not executed");
    }

    let result = provision(
        &app.host,
        &app.fs,
        &app.identity,
        &app.lookup,
        &app.templates,
        ProvisionOptions {
            reporter: &reporter,
            config: &app.config,
            dry_run: app.dry_run,
            reinvoke,
        },
    )
    .await;

    match result {
        Ok(report) => {
            render_report(app, &report);
            0
        }
        Err(failure) => {
            render_failure(app, &failure);
            failure.exit_code()
        }
    }
}

fn render_report(app: &AppContext, report: &RunReport) {
    if app.is_json() {
        match json::format_report(report) {
            Ok(doc) => println!("{doc}"),
            Err(e) => app.output.error(&format!("{e:#}")),
        }
    } else {
        HumanRenderer::new(&app.output).render_summary(report);
    }
}

fn render_failure(app: &AppContext, failure: &RunFailure) {
    if app.is_json() {
        match json::format_failure(failure) {
            Ok(doc) => println!("{doc}"),
            Err(e) => app.output.error(&format!("{e:#}")),
        }
    } else {
        HumanRenderer::new(&app.output).render_failure(failure);
    }
}
