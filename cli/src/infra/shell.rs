//! Command-backed host capabilities: apt, uv, useradd/chown, git, systemd,
//! ufw and timedatectl.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{
    Accounts, CommandRunner, Firewall, HostClock, InitSystem, PackageManager, SourceControl,
    Toolchain,
};
use crate::domain::command::CommandLine;
use crate::infra::executor::StepExecutor;
use crate::infra::identity::find_on_path;

/// Implements every host capability port by running the collaborator's CLI.
pub struct ShellHost<R> {
    exec: StepExecutor<R>,
}

impl<R: CommandRunner> ShellHost<R> {
    pub fn new(runner: R) -> Self {
        Self { exec: StepExecutor::new(runner) }
    }
}

impl<R: CommandRunner> PackageManager for ShellHost<R> {
    async fn refresh_index(&self) -> Result<()> {
        self.exec.run(&CommandLine::new("apt-get").arg("update")).await
    }

    async fn install_packages(&self, packages: &[String]) -> Result<()> {
        let cmd = CommandLine::new("env")
            .args(["DEBIAN_FRONTEND=noninteractive", "apt-get", "install", "-y"])
            .arg("--no-install-recommends")
            .args(packages.iter().cloned());
        self.exec.run(&cmd).await
    }
}

impl<R: CommandRunner> Toolchain for ShellHost<R> {
    fn has_program(&self, program: &str) -> bool {
        find_on_path(program).is_some()
    }

    async fn install_uv(&self, installer_url: &str, install_dir: &Path) -> Result<()> {
        let script = format!(
            "curl -LsSf {installer_url} | env UV_INSTALL_DIR={} UV_NO_MODIFY_PATH=1 sh",
            install_dir.display()
        );
        self.exec.run(&CommandLine::new("sh").args(["-c", &script])).await
    }

    async fn create_venv(&self, venv: &Path, user: &str) -> Result<()> {
        let cmd = CommandLine::new("uv").arg("venv").path_arg(venv).as_user(user);
        self.exec.run(&cmd).await
    }

    async fn install_requirements(
        &self,
        venv: &Path,
        requirements: &Path,
        user: &str,
    ) -> Result<()> {
        let cmd = CommandLine::new("uv")
            .args(["pip", "install", "--python"])
            .path_arg(&venv.join("bin").join("python"))
            .arg("-r")
            .path_arg(requirements)
            .as_user(user);
        self.exec.run(&cmd).await
    }
}

impl<R: CommandRunner> Accounts for ShellHost<R> {
    async fn user_exists(&self, user: &str) -> Result<bool> {
        self.exec.probe(&CommandLine::new("id").args(["-u", user])).await
    }

    async fn create_system_user(&self, user: &str) -> Result<()> {
        let cmd = CommandLine::new("useradd")
            .args(["--system", "--create-home", "--shell", "/usr/sbin/nologin"])
            .arg(user);
        self.exec.run(&cmd).await
    }

    async fn chown(&self, path: &Path, user: &str, recursive: bool) -> Result<()> {
        let mut cmd = CommandLine::new("chown");
        if recursive {
            cmd = cmd.arg("-R");
        }
        self.exec.run(&cmd.arg(format!("{user}:")).path_arg(path)).await
    }
}

impl<R: CommandRunner> SourceControl for ShellHost<R> {
    async fn clone_repo(&self, repository: &str, dest: &Path) -> Result<()> {
        let cmd = CommandLine::new("git").args(["clone", repository]).path_arg(dest);
        self.exec.run(&cmd).await
    }
}

impl<R: CommandRunner> InitSystem for ShellHost<R> {
    async fn reload_units(&self) -> Result<()> {
        self.exec.run(&CommandLine::new("systemctl").arg("daemon-reload")).await
    }

    async fn is_enabled(&self, unit: &str) -> Result<bool> {
        self.exec
            .probe(&CommandLine::new("systemctl").args(["is-enabled", "--quiet", unit]))
            .await
    }

    async fn enable(&self, unit: &str) -> Result<()> {
        self.exec.run(&CommandLine::new("systemctl").args(["enable", unit])).await
    }

    async fn is_active(&self, unit: &str) -> Result<bool> {
        self.exec
            .probe(&CommandLine::new("systemctl").args(["is-active", "--quiet", unit]))
            .await
    }

    async fn start(&self, unit: &str) -> Result<()> {
        self.exec.run(&CommandLine::new("systemctl").args(["start", unit])).await
    }
}

impl<R: CommandRunner> Firewall for ShellHost<R> {
    async fn allow_rule(&self, rule: &str) -> Result<()> {
        self.exec.run(&CommandLine::new("ufw").args(["allow", rule])).await
    }

    async fn firewall_active(&self) -> Result<bool> {
        let status = self.exec.capture(&CommandLine::new("ufw").arg("status")).await?;
        Ok(is_ufw_active(&status))
    }

    async fn enable_firewall(&self) -> Result<()> {
        self.exec.run(&CommandLine::new("ufw").args(["--force", "enable"])).await
    }
}

impl<R: CommandRunner> HostClock for ShellHost<R> {
    async fn timezone(&self) -> Result<String> {
        self.exec
            .capture(&CommandLine::new("timedatectl").args(["show", "-p", "Timezone", "--value"]))
            .await
    }

    async fn set_timezone(&self, timezone: &str) -> Result<()> {
        self.exec
            .run(&CommandLine::new("timedatectl").args(["set-timezone", timezone]))
            .await
    }
}

fn is_ufw_active(status: &str) -> bool {
    status.lines().any(|line| line.trim() == "Status: active")
}
