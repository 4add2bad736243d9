//! Config stage: `.env`, the users list, their permissions and a lint.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{HostFs, HostSystem, TemplateStore};
use crate::application::services::materialize::{Materialized, materialize_artifact};
use crate::domain::artifact::{ConfigArtifact, ContentSource, SECRET_MODE, display_name};
use crate::domain::config::ProvisionConfig;
use crate::domain::error::ProvisionError;
use crate::domain::host::HostContext;
use crate::domain::report::StepOutcome;
use crate::domain::step::{Action, ConfigAction, Readiness, Step};
use crate::domain::users;

/// Embedded template `.env` is created from.
pub const ENV_TEMPLATE: &str = "env.template";

/// # Errors
///
/// Returns an error if the `.env` template is not embedded.
pub fn steps(
    config: &ProvisionConfig,
    ctx: &HostContext,
    templates: &impl TemplateStore,
) -> Result<Vec<Step>> {
    let env = config.env_path();
    let users_config = config.users_config_path();
    let template = templates.template(ENV_TEMPLATE)?;
    let harden = |path: &Path| ConfigAction::Harden {
        path: path.to_path_buf(),
        mode: SECRET_MODE,
        user: ctx.service_user.clone(),
    };

    Ok(vec![
        Step::fatal(
            "materialize-env",
            "Creating .env",
            Action::Config(ConfigAction::Materialize(ConfigArtifact::literal(
                &env,
                SECRET_MODE,
                template,
            ))),
        ),
        Step::fatal(
            "materialize-users-config",
            format!("Creating {}", display_name(&users_config)),
            Action::Config(ConfigAction::Materialize(ConfigArtifact::copy_of(
                &users_config,
                SECRET_MODE,
                config.users_example_path(),
            ))),
        ),
        Step::fatal("harden-env", "Restricting .env permissions", Action::Config(harden(&env))),
        Step::fatal(
            "harden-users-config",
            format!("Restricting {} permissions", display_name(&users_config)),
            Action::Config(harden(&users_config)),
        ),
        Step::warn(
            "lint-users-config",
            format!("Checking {}", display_name(&users_config)),
            Action::Config(ConfigAction::LintUsersConfig {
                path: users_config.clone(),
                env: env.clone(),
            }),
        ),
    ])
}

fn missing_input(path: &Path) -> String {
    ProvisionError::MissingOptionalInput { path: path.to_path_buf() }.to_string()
}

pub fn readiness(action: &ConfigAction, fs: &impl HostFs) -> Readiness {
    match action {
        ConfigAction::Materialize(artifact) => {
            if fs.exists(&artifact.path) {
                return Readiness::Satisfied;
            }
            match &artifact.source {
                ContentSource::CopyFrom(example) if !fs.exists(example) => {
                    Readiness::NotApplicable(missing_input(example))
                }
                _ => Readiness::Pending,
            }
        }
        ConfigAction::Harden { path, .. } | ConfigAction::LintUsersConfig { path, .. } => {
            if fs.exists(path) {
                Readiness::Pending
            } else {
                Readiness::NotApplicable(format!("{} does not exist", path.display()))
            }
        }
    }
}

pub async fn apply(
    action: &ConfigAction,
    host: &impl HostSystem,
    fs: &impl HostFs,
) -> Result<StepOutcome> {
    match action {
        ConfigAction::Materialize(artifact) => Ok(match materialize_artifact(fs, artifact)? {
            Materialized::Created => StepOutcome::Applied,
            Materialized::SkippedExisting => StepOutcome::AlreadySatisfied,
            Materialized::MissingSource(example) => StepOutcome::Skipped {
                reason: missing_input(&example),
            },
        }),
        ConfigAction::Harden { path, mode, user } => {
            fs.set_mode(path, *mode)
                .with_context(|| format!("setting mode {mode:o} on {}", path.display()))?;
            host.chown(path, user, false).await?;
            Ok(StepOutcome::Applied)
        }
        ConfigAction::LintUsersConfig { path, env } => {
            let bytes = fs.read(path).with_context(|| format!("reading {}", path.display()))?;
            let env_chat_id = fs.exists(env)
                && users::env_has_chat_id(&String::from_utf8_lossy(
                    &fs.read(env).with_context(|| format!("reading {}", env.display()))?,
                ));
            let issues = users::lint(&String::from_utf8_lossy(&bytes), env_chat_id);
            if issues.is_empty() {
                Ok(StepOutcome::Applied)
            } else {
                Ok(StepOutcome::Warned { error: issues.join("; ") })
            }
        }
    }
}
