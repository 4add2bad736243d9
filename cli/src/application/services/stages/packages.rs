//! Package stage: OS packages, the Python runtime and `uv`.

use anyhow::Result;

use crate::application::ports::{HostFs, HostSystem};
use crate::domain::config::ProvisionConfig;
use crate::domain::report::StepOutcome;
use crate::domain::step::{Action, PackageAction, Readiness, Step};

pub fn steps(config: &ProvisionConfig) -> Vec<Step> {
    vec![
        Step::warn(
            "refresh-package-index",
            "Refreshing package index",
            Action::Package(PackageAction::RefreshIndex),
        ),
        Step::fatal(
            "install-system-packages",
            format!("Installing {}", config.packages.join(" ")),
            Action::Package(PackageAction::InstallPackages(config.packages.clone())),
        ),
        Step::fatal(
            "install-uv",
            "Installing uv",
            Action::Package(PackageAction::InstallUv {
                installer_url: config.uv_installer_url.clone(),
                install_dir: config.uv_install_dir.clone(),
            }),
        ),
    ]
}

pub fn readiness(action: &PackageAction, host: &impl HostSystem, fs: &impl HostFs) -> Readiness {
    match action {
        PackageAction::RefreshIndex => Readiness::Pending,
        PackageAction::InstallPackages(packages) if packages.is_empty() => {
            Readiness::NotApplicable("no packages configured".to_string())
        }
        PackageAction::InstallPackages(_) => Readiness::Pending,
        PackageAction::InstallUv { install_dir, .. } => {
            if host.has_program("uv") || fs.exists(&install_dir.join("uv")) {
                Readiness::Satisfied
            } else {
                Readiness::Pending
            }
        }
    }
}

pub async fn apply(action: &PackageAction, host: &impl HostSystem) -> Result<StepOutcome> {
    match action {
        PackageAction::RefreshIndex => host.refresh_index().await?,
        PackageAction::InstallPackages(packages) => host.install_packages(packages).await?,
        PackageAction::InstallUv { installer_url, install_dir } => {
            host.install_uv(installer_url, install_dir).await?;
        }
    }
    Ok(StepOutcome::Applied)
}
