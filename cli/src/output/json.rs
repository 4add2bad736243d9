//! JSON output helpers.
//!
//! `--json` prints exactly one document on stdout: the run report on
//! success, or an error object on failure.

use anyhow::{Context, Result};

use crate::application::services::provision::RunFailure;
use crate::domain::error::ProvisionError;
use crate::domain::report::RunReport;

/// Serialize a successful run, including the step counts.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &RunReport) -> Result<String> {
    let mut value = serde_json::to_value(report).context("JSON serialization failed")?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "counts".to_string(),
            serde_json::to_value(report.counts()).context("JSON serialization failed")?,
        );
    }
    serde_json::to_string_pretty(&value).context("JSON serialization failed")
}

/// Format a failed run.
///
/// ```json
/// {
///   "error": true,
///   "stage": "package",
///   "step": "install-system-packages",
///   "exit_code": 2,
///   "message": "...",
///   "command": "...",
///   "command_exit_code": 100,
///   "stderr_tail": "...",
///   "completed": [ ... ]
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_failure(failure: &RunFailure) -> Result<String> {
    let mut obj = serde_json::json!({
        "error": true,
        "stage": failure.stage,
        "step": failure.step,
        "exit_code": failure.exit_code(),
        "message": format!("{:#}", failure.error),
        "completed": failure.completed,
    });
    if let Some(ProvisionError::StepFailed { command, exit_code, stderr_tail }) =
        failure.error.downcast_ref::<ProvisionError>()
    {
        obj["command"] = serde_json::json!(command);
        obj["command_exit_code"] = serde_json::json!(exit_code);
        obj["stderr_tail"] = serde_json::json!(stderr_tail);
    }
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format an error raised before provisioning started (bad settings or arguments).
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, exit_code: i32) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "exit_code": exit_code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
