//! Domain layer: pure provisioning types, plan rules, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod artifact;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod plan;
pub mod report;
pub mod service;
pub mod step;
pub mod users;

pub use config::{ConfigOverrides, ProvisionConfig};
pub use error::{ConfigError, PlanError, ProvisionError};
pub use host::{HostContext, Principal};
pub use plan::Plan;
pub use report::{RunReport, StepOutcome, StepRecord};
pub use step::{Action, Readiness, Severity, Stage, Step};
