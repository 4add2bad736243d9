//! Service descriptor handed to the init system.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::config::ProvisionConfig;

/// systemd `Restart=` policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    Always,
    OnFailure,
}

impl RestartPolicy {
    #[must_use]
    pub const fn as_systemd(self) -> &'static str {
        match self {
            RestartPolicy::Always => "always",
            RestartPolicy::OnFailure => "on-failure",
        }
    }
}

/// Everything the init system needs to supervise the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub unit_name: String,
    pub description: String,
    pub user: String,
    pub working_dir: PathBuf,
    pub exec_start: String,
    pub restart: RestartPolicy,
    pub restart_sec: u32,
}

impl ServiceDescriptor {
    /// Descriptor for the bot as laid out by the artifact stage.
    #[must_use]
    pub fn for_bot(config: &ProvisionConfig, user: &str) -> Self {
        let dir = config.install_dir();
        let python = config.venv_dir().join("bin").join("python");
        Self {
            unit_name: config.unit_file_name(),
            description: format!("{} scheduled messaging service", config.service_name),
            user: user.to_string(),
            exec_start: format!("{} {}", python.display(), dir.join(&config.entry_point).display()),
            working_dir: dir,
            restart: RestartPolicy::Always,
            restart_sec: 10,
        }
    }

    /// Fill `{{placeholders}}` in a unit template.
    #[must_use]
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{{description}}", &self.description)
            .replace("{{user}}", &self.user)
            .replace("{{working_dir}}", &self.working_dir.display().to_string())
            .replace("{{exec_start}}", &self.exec_start)
            .replace("{{restart}}", self.restart.as_systemd())
            .replace("{{restart_sec}}", &self.restart_sec.to_string())
    }
}
