//! Domain types and validators for provisioning settings.
//!
//! Pure functions only. No I/O, no async, no filesystem access.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_SERVICE_NAME: &str = "birthday-bot";
pub const DEFAULT_TIMEZONE: &str = "Europe/Moscow";
pub const DEFAULT_PACKAGES: &[&str] = &["python3", "python3-venv", "git", "curl", "ufw"];
pub const DEFAULT_UV_INSTALLER: &str = "https://astral.sh/uv/install.sh";
pub const DEFAULT_ADDRESS_LOOKUP: &str = "https://api.ipify.org";

pub const ENV_FILE: &str = ".env";
pub const USERS_CONFIG_FILE: &str = "users_config.json";
pub const USERS_EXAMPLE_FILE: &str = "users_config.example.json";
pub const VENV_DIR: &str = ".venv";

#[allow(clippy::expect_used)] // Patterns are compile-time constants
static SERVICE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_.-]{0,63}$").expect("valid regex"));
#[allow(clippy::expect_used)]
static USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("valid regex"));
#[allow(clippy::expect_used)]
static TIMEZONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_+-]*(/[A-Za-z0-9_+-]+)*$").expect("valid regex")
});
#[allow(clippy::expect_used)]
static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9+.-]*$").expect("valid regex"));
#[allow(clippy::expect_used)]
static FIREWALL_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9/._-]*$").expect("valid regex"));

// ── Config schema ────────────────────────────────────────────────────────────

/// Settings for one provisioning run, loaded from
/// `/etc/birthday-provision/config.yaml` and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionConfig {
    /// systemd unit name and default directory name.
    pub service_name: String,
    /// Installation directory; `/opt/<service_name>` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,
    /// Unprivileged account that owns the files and runs the bot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_user: Option<String>,
    /// IANA timezone the bot's schedule is expressed in.
    pub timezone: String,
    /// OS packages installed with apt.
    pub packages: Vec<String>,
    /// Shell installer for `uv`.
    pub uv_installer_url: String,
    /// Where the `uv` binary is installed.
    pub uv_install_dir: PathBuf,
    /// Git repository cloned into the install directory when it has no checkout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Script started by the unit, relative to the install directory.
    pub entry_point: String,
    /// Dependency list, relative to the install directory.
    pub requirements_file: String,
    /// Start the unit after enabling it.
    pub start_service: bool,
    /// Render a unit file from the built-in template when none is checked in.
    pub generate_unit: bool,
    /// ufw rule that keeps administrative access open.
    pub admin_access_rule: String,
    /// Endpoint answering with the caller's public IP as plain text.
    pub address_lookup_url: String,
    /// Directory systemd loads unit files from.
    pub systemd_dir: PathBuf,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            install_dir: None,
            service_user: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            packages: DEFAULT_PACKAGES.iter().map(ToString::to_string).collect(),
            uv_installer_url: DEFAULT_UV_INSTALLER.to_string(),
            uv_install_dir: PathBuf::from("/usr/local/bin"),
            repository: None,
            entry_point: "birthday_bot.py".to_string(),
            requirements_file: "requirements.txt".to_string(),
            start_service: false,
            generate_unit: false,
            admin_access_rule: "OpenSSH".to_string(),
            address_lookup_url: DEFAULT_ADDRESS_LOOKUP.to_string(),
            systemd_dir: PathBuf::from("/etc/systemd/system"),
        }
    }
}

/// Values supplied on the command line; `None`/`false` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub service_name: Option<String>,
    pub install_dir: Option<PathBuf>,
    pub service_user: Option<String>,
    pub timezone: Option<String>,
    pub repository: Option<String>,
    pub start_service: bool,
    pub generate_unit: bool,
}

impl ProvisionConfig {
    /// Layer CLI overrides on top of file settings.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(name) = overrides.service_name {
            self.service_name = name;
        }
        if let Some(dir) = overrides.install_dir {
            self.install_dir = Some(dir);
        }
        if let Some(user) = overrides.service_user {
            self.service_user = Some(user);
        }
        if let Some(tz) = overrides.timezone {
            self.timezone = tz;
        }
        if let Some(repo) = overrides.repository {
            self.repository = Some(repo);
        }
        self.start_service |= overrides.start_service;
        self.generate_unit |= overrides.generate_unit;
        self
    }

    #[must_use]
    pub fn install_dir(&self) -> PathBuf {
        self.install_dir
            .clone()
            .unwrap_or_else(|| Path::new("/opt").join(&self.service_name))
    }

    #[must_use]
    pub fn env_path(&self) -> PathBuf {
        self.install_dir().join(ENV_FILE)
    }

    #[must_use]
    pub fn users_config_path(&self) -> PathBuf {
        self.install_dir().join(USERS_CONFIG_FILE)
    }

    #[must_use]
    pub fn users_example_path(&self) -> PathBuf {
        self.install_dir().join(USERS_EXAMPLE_FILE)
    }

    #[must_use]
    pub fn requirements_path(&self) -> PathBuf {
        self.install_dir().join(&self.requirements_file)
    }

    #[must_use]
    pub fn venv_dir(&self) -> PathBuf {
        self.install_dir().join(VENV_DIR)
    }

    #[must_use]
    pub fn unit_file_name(&self) -> String {
        format!("{}.service", self.service_name)
    }

    /// Unit file checked into the bot's working tree.
    #[must_use]
    pub fn unit_source_path(&self) -> PathBuf {
        self.install_dir().join(self.unit_file_name())
    }

    /// Unit file as installed for the init system.
    #[must_use]
    pub fn unit_dest_path(&self) -> PathBuf {
        self.systemd_dir.join(self.unit_file_name())
    }

    /// Pick the unprivileged account: explicit setting, then the operator who
    /// invoked sudo, then a dedicated account named after the service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RootServiceUser`] if the chosen account is root,
    /// or [`ConfigError::InvalidUser`] if it is not a valid account name.
    pub fn resolve_service_user(&self, invoking_user: Option<&str>) -> Result<String, ConfigError> {
        let user = match (&self.service_user, invoking_user) {
            (Some(user), _) => user.as_str(),
            (None, Some(user)) if user != "root" && USER_RE.is_match(user) => user,
            (None, _) => self.service_name.as_str(),
        };
        validate_user(user)?;
        Ok(user.to_string())
    }

    /// Validate every field before any host interaction happens.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_service_name(&self.service_name)?;
        validate_install_dir(&self.install_dir())?;
        validate_timezone(&self.timezone)?;
        match &self.service_user {
            Some(user) => validate_user(user)?,
            // The service name doubles as the fallback account.
            None if self.service_name == "root" => return Err(ConfigError::RootServiceUser),
            None => {}
        }
        for package in &self.packages {
            if !PACKAGE_RE.is_match(package) {
                return Err(ConfigError::InvalidPackage(package.clone()));
            }
        }
        if !FIREWALL_RULE_RE.is_match(&self.admin_access_rule) {
            return Err(ConfigError::InvalidValue {
                field: "admin_access_rule",
                value: self.admin_access_rule.clone(),
            });
        }
        for (field, value) in [
            ("entry_point", &self.entry_point),
            ("requirements_file", &self.requirements_file),
        ] {
            if !is_relative_inside(Path::new(value)) {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: value.clone(),
                });
            }
        }
        for (field, value) in [
            ("uv_installer_url", &self.uv_installer_url),
            ("address_lookup_url", &self.address_lookup_url),
        ] {
            if !value.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// # Errors
///
/// Returns an error if `name` is not a safe systemd unit / account name.
pub fn validate_service_name(name: &str) -> Result<(), ConfigError> {
    if SERVICE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidServiceName(name.to_string()))
    }
}

/// # Errors
///
/// Returns an error unless `dir` is absolute, not `/`, and free of `..`.
pub fn validate_install_dir(dir: &Path) -> Result<(), ConfigError> {
    let normal = dir.components().all(|c| matches!(c, Component::RootDir | Component::Normal(_)));
    if dir.is_absolute() && dir.parent().is_some() && normal {
        Ok(())
    } else {
        Err(ConfigError::InvalidInstallDir(dir.to_path_buf()))
    }
}

/// # Errors
///
/// Returns an error if `tz` does not look like an IANA timezone name.
pub fn validate_timezone(tz: &str) -> Result<(), ConfigError> {
    if TIMEZONE_RE.is_match(tz) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimezone(tz.to_string()))
    }
}

/// # Errors
///
/// Returns an error for root or names `useradd` would reject.
pub fn validate_user(user: &str) -> Result<(), ConfigError> {
    if user == "root" {
        return Err(ConfigError::RootServiceUser);
    }
    if USER_RE.is_match(user) {
        Ok(())
    } else {
        Err(ConfigError::InvalidUser(user.to_string()))
    }
}

fn is_relative_inside(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

// ── Unit tests ───────────────────────────────────────────────────────────────
