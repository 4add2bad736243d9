//! Artifact stage: service account, sources, install directory and virtualenv.

use anyhow::{Context, Result};

use crate::application::ports::{HostFs, HostSystem};
use crate::domain::config::ProvisionConfig;
use crate::domain::host::HostContext;
use crate::domain::report::StepOutcome;
use crate::domain::step::{Action, ArtifactAction, Readiness, Step};

pub fn steps(config: &ProvisionConfig, ctx: &HostContext) -> Vec<Step> {
    let dir = ctx.install_dir.clone();
    let user = ctx.service_user.clone();
    let venv = config.venv_dir();

    let mut steps = vec![Step::fatal(
        "ensure-service-user",
        format!("Ensuring service account '{user}'"),
        Action::Artifact(ArtifactAction::EnsureServiceUser(user.clone())),
    )];
    if let Some(repository) = &config.repository {
        steps.push(Step::fatal(
            "checkout-source",
            format!("Cloning {repository}"),
            Action::Artifact(ArtifactAction::CheckoutSource {
                repository: repository.clone(),
                dest: dir.clone(),
            }),
        ));
    }
    steps.extend([
        Step::fatal(
            "create-install-dir",
            format!("Creating {}", dir.display()),
            Action::Artifact(ArtifactAction::CreateInstallDir(dir.clone())),
        ),
        Step::fatal(
            "assign-install-dir-owner",
            format!("Handing {} to '{user}'", dir.display()),
            Action::Artifact(ArtifactAction::AssignOwner { path: dir, user: user.clone() }),
        ),
        Step::fatal(
            "create-virtualenv",
            "Creating virtual environment",
            Action::Artifact(ArtifactAction::CreateVirtualenv { venv: venv.clone(), user: user.clone() }),
        ),
        Step::fatal(
            "install-dependencies",
            format!("Installing dependencies from {}", config.requirements_file),
            Action::Artifact(ArtifactAction::InstallDependencies {
                venv,
                requirements: config.requirements_path(),
                user,
            }),
        ),
    ]);
    steps
}

pub async fn readiness(
    action: &ArtifactAction,
    host: &impl HostSystem,
    fs: &impl HostFs,
) -> Result<Readiness> {
    let satisfied_if = |done: bool| if done { Readiness::Satisfied } else { Readiness::Pending };
    Ok(match action {
        ArtifactAction::EnsureServiceUser(user) => satisfied_if(
            host.user_exists(user)
                .await
                .with_context(|| format!("looking up user '{user}'"))?,
        ),
        ArtifactAction::CheckoutSource { dest, .. } => satisfied_if(fs.exists(&dest.join(".git"))),
        ArtifactAction::CreateInstallDir(dir) => satisfied_if(fs.exists(dir)),
        ArtifactAction::CreateVirtualenv { venv, .. } => {
            satisfied_if(fs.exists(&venv.join("bin").join("python")))
        }
        ArtifactAction::AssignOwner { .. } | ArtifactAction::InstallDependencies { .. } => {
            Readiness::Pending
        }
    })
}

pub async fn apply(
    action: &ArtifactAction,
    host: &impl HostSystem,
    fs: &impl HostFs,
) -> Result<StepOutcome> {
    match action {
        ArtifactAction::EnsureServiceUser(user) => host.create_system_user(user).await?,
        ArtifactAction::CheckoutSource { repository, dest } => {
            host.clone_repo(repository, dest).await?;
        }
        ArtifactAction::CreateInstallDir(dir) => fs
            .create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?,
        ArtifactAction::AssignOwner { path, user } => host.chown(path, user, true).await?,
        ArtifactAction::CreateVirtualenv { venv, user } => host.create_venv(venv, user).await?,
        ArtifactAction::InstallDependencies { venv, requirements, user } => {
            host.install_requirements(venv, requirements, user).await?;
        }
    }
    Ok(StepOutcome::Applied)
}
