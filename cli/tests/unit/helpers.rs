//! Shared test helpers: an in-memory host, filesystem and identity.

#![allow(dead_code, clippy::expect_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, bail};
use birthday_provision::application::ports::{
    Accounts, AddressLookup, Firewall, HostClock, HostFs, IdentityProbe, InitSystem,
    PackageManager, ProgressReporter, SourceControl, Toolchain,
};
use birthday_provision::domain::config::ProvisionConfig;
use birthday_provision::domain::error::ProvisionError;

// ── Filesystem ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry {
    content: Option<Vec<u8>>,
    mode: u32,
}

/// Files and directories keyed by absolute path. Directories carry no content.
#[derive(Default)]
pub struct MemoryFs {
    entries: Mutex<BTreeMap<PathBuf, Entry>>,
}

impl MemoryFs {
    pub fn seed(&self, path: impl AsRef<Path>, content: &str, mode: u32) {
        self.lock().insert(
            path.as_ref().to_path_buf(),
            Entry { content: Some(content.as_bytes().to_vec()), mode },
        );
    }

    pub fn mkdir(&self, path: impl AsRef<Path>) {
        self.lock()
            .entry(path.as_ref().to_path_buf())
            .or_insert(Entry { content: None, mode: 0o755 });
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock()
            .get(path.as_ref())
            .and_then(|e| e.content.clone())
            .map(|c| String::from_utf8_lossy(&c).into_owned())
    }

    pub fn exists_path(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        self.lock().get(path.as_ref()).map(|e| e.mode)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Entry>> {
        self.entries.lock().expect("memory fs lock")
    }
}

impl HostFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        for dir in path.ancestors() {
            self.mkdir(dir);
        }
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match self.lock().get(path).and_then(|e| e.content.clone()) {
            Some(content) => Ok(content),
            None => bail!("{}: no such file", path.display()),
        }
    }

    fn write_new(&self, path: &Path, content: &[u8], mode: u32) -> Result<()> {
        let mut entries = self.lock();
        if entries.contains_key(path) {
            bail!("{}: file exists", path.display());
        }
        entries.insert(path.to_path_buf(), Entry { content: Some(content.to_vec()), mode });
        Ok(())
    }

    fn copy(&self, src: &Path, dest: &Path, mode: u32) -> Result<()> {
        let content = self.read(src)?;
        self.lock()
            .insert(dest.to_path_buf(), Entry { content: Some(content), mode });
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        match self.lock().get_mut(path) {
            Some(entry) => {
                entry.mode = mode;
                Ok(())
            }
            None => bail!("{}: no such file", path.display()),
        }
    }
}

// ── Host ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct HostState {
    users: BTreeSet<String>,
    enabled: BTreeSet<String>,
    active: BTreeSet<String>,
    rules: Vec<String>,
    firewall_active: bool,
    timezone: String,
    uv_on_path: bool,
    owners: BTreeMap<PathBuf, String>,
    ops: Vec<String>,
    fail_on: BTreeSet<&'static str>,
}

/// Host whose command-backed capabilities act on in-memory state.
///
/// Every mutating call is appended to an ordered op log. Operations named
/// with [`FakeHost::fail_on`] exit non-zero the way a real command would.
pub struct FakeHost {
    state: Mutex<HostState>,
    fs: Arc<MemoryFs>,
}

impl FakeHost {
    pub fn new(fs: Arc<MemoryFs>) -> Self {
        Self {
            state: Mutex::new(HostState { timezone: "Etc/UTC".into(), ..HostState::default() }),
            fs,
        }
    }

    /// Make every call to `op` fail with exit code 100.
    pub fn fail_on(&self, op: &'static str) {
        self.lock().fail_on.insert(op);
    }

    pub fn clear_failures(&self) {
        self.lock().fail_on.clear();
    }

    pub fn ops(&self) -> Vec<String> {
        self.lock().ops.clone()
    }

    pub fn has_op(&self, prefix: &str) -> bool {
        self.ops().iter().any(|op| op.starts_with(prefix))
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.ops().iter().position(|op| op.starts_with(prefix))
    }

    pub fn timezone_now(&self) -> String {
        self.lock().timezone.clone()
    }

    pub fn firewall_is_active(&self) -> bool {
        self.lock().firewall_active
    }

    pub fn owner_of(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock().owners.get(path.as_ref()).cloned()
    }

    pub fn unit_active(&self, unit: &str) -> bool {
        self.lock().active.contains(unit)
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().expect("host state lock")
    }

    /// Record `op` and fail if it was marked failing.
    fn record(&self, op: &'static str, detail: String) -> Result<MutexGuard<'_, HostState>> {
        let mut state = self.lock();
        let line = if detail.is_empty() { op.to_string() } else { format!("{op} {detail}") };
        state.ops.push(line.clone());
        if state.fail_on.contains(op) {
            return Err(ProvisionError::StepFailed {
                command: line,
                exit_code: Some(100),
                stderr_tail: format!("E: {op} failed"),
            }
            .into());
        }
        Ok(state)
    }
}

impl PackageManager for FakeHost {
    async fn refresh_index(&self) -> Result<()> {
        self.record("refresh_index", String::new()).map(drop)
    }

    async fn install_packages(&self, packages: &[String]) -> Result<()> {
        self.record("install_packages", packages.join(" ")).map(drop)
    }
}

impl Toolchain for FakeHost {
    fn has_program(&self, program: &str) -> bool {
        program == "uv" && self.lock().uv_on_path
    }

    async fn install_uv(&self, installer_url: &str, _install_dir: &Path) -> Result<()> {
        let mut state = self.record("install_uv", installer_url.to_string())?;
        state.uv_on_path = true;
        Ok(())
    }

    async fn create_venv(&self, venv: &Path, user: &str) -> Result<()> {
        drop(self.record("create_venv", format!("{} as {user}", venv.display()))?);
        self.fs.seed(venv.join("bin").join("python"), "", 0o755);
        Ok(())
    }

    async fn install_requirements(
        &self,
        venv: &Path,
        requirements: &Path,
        user: &str,
    ) -> Result<()> {
        self.record(
            "install_requirements",
            format!("{} into {} as {user}", requirements.display(), venv.display()),
        )
        .map(drop)
    }
}

impl Accounts for FakeHost {
    async fn user_exists(&self, user: &str) -> Result<bool> {
        Ok(self.lock().users.contains(user))
    }

    async fn create_system_user(&self, user: &str) -> Result<()> {
        let mut state = self.record("create_system_user", user.to_string())?;
        state.users.insert(user.to_string());
        Ok(())
    }

    async fn chown(&self, path: &Path, user: &str, recursive: bool) -> Result<()> {
        let flag = if recursive { "-R " } else { "" };
        let mut state = self.record("chown", format!("{flag}{user} {}", path.display()))?;
        state.owners.insert(path.to_path_buf(), user.to_string());
        Ok(())
    }
}

impl SourceControl for FakeHost {
    async fn clone_repo(&self, repository: &str, dest: &Path) -> Result<()> {
        drop(self.record("clone_repo", format!("{repository} {}", dest.display()))?);
        self.fs.create_dir_all(&dest.join(".git"))?;
        self.fs.seed(dest.join("requirements.txt"), "python-telegram-bot\n", 0o644);
        Ok(())
    }
}

impl InitSystem for FakeHost {
    async fn reload_units(&self) -> Result<()> {
        self.record("reload_units", String::new()).map(drop)
    }

    async fn is_enabled(&self, unit: &str) -> Result<bool> {
        Ok(self.lock().enabled.contains(unit))
    }

    async fn enable(&self, unit: &str) -> Result<()> {
        let mut state = self.record("enable", unit.to_string())?;
        state.enabled.insert(unit.to_string());
        Ok(())
    }

    async fn is_active(&self, unit: &str) -> Result<bool> {
        Ok(self.lock().active.contains(unit))
    }

    async fn start(&self, unit: &str) -> Result<()> {
        let mut state = self.record("start", unit.to_string())?;
        state.active.insert(unit.to_string());
        Ok(())
    }
}

impl Firewall for FakeHost {
    async fn allow_rule(&self, rule: &str) -> Result<()> {
        let mut state = self.record("allow_rule", rule.to_string())?;
        state.rules.push(rule.to_string());
        Ok(())
    }

    async fn firewall_active(&self) -> Result<bool> {
        Ok(self.lock().firewall_active)
    }

    async fn enable_firewall(&self) -> Result<()> {
        let mut state = self.record("enable_firewall", String::new())?;
        if !state.rules.iter().any(|r| r == "OpenSSH") {
            bail!("firewall enabled without an administrative access rule");
        }
        state.firewall_active = true;
        Ok(())
    }
}

impl HostClock for FakeHost {
    async fn timezone(&self) -> Result<String> {
        Ok(self.lock().timezone.clone())
    }

    async fn set_timezone(&self, timezone: &str) -> Result<()> {
        let mut state = self.record("set_timezone", timezone.to_string())?;
        state.timezone = timezone.to_string();
        Ok(())
    }
}

// ── Identity, lookup and reporting ───────────────────────────────────────────

pub struct FakeIdentity {
    pub uid: u32,
    pub name: &'static str,
    pub sudo_user: Option<&'static str>,
    pub uv_on_path: bool,
}

impl FakeIdentity {
    pub fn root() -> Self {
        Self { uid: 0, name: "root", sudo_user: Some("deploy"), uv_on_path: false }
    }

    pub fn unprivileged() -> Self {
        Self { uid: 1000, name: "deploy", sudo_user: None, uv_on_path: false }
    }
}

impl IdentityProbe for FakeIdentity {
    async fn effective_uid(&self) -> Result<u32> {
        Ok(self.uid)
    }

    async fn effective_user(&self) -> Result<String> {
        Ok(self.name.to_string())
    }

    fn invoking_user(&self) -> Option<String> {
        self.sudo_user.map(str::to_string)
    }

    fn on_path(&self, program: &str) -> bool {
        program == "uv" && self.uv_on_path
    }
}

/// Returns the address, or fails like an offline host.
pub struct FakeLookup(pub Option<&'static str>);

impl AddressLookup for FakeLookup {
    async fn public_address(&self) -> Result<String> {
        match self.0 {
            Some(address) => Ok(address.to_string()),
            None => Err(ProvisionError::NetworkUnavailable("connection refused".into()).into()),
        }
    }
}

/// Collects every progress message in order.
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("reporter lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| m.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }

    fn push(&self, kind: &str, message: &str) {
        self.messages
            .lock()
            .expect("reporter lock")
            .push(format!("{kind}: {message}"));
    }
}

impl ProgressReporter for RecordingReporter {
    fn stage(&self, title: &str) {
        self.push("stage", title);
    }
    fn step(&self, message: &str) {
        self.push("step", message);
    }
    fn success(&self, message: &str) {
        self.push("ok", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const INSTALL_DIR: &str = "/opt/birthday-bot";

pub const USERS_EXAMPLE: &str = r#"{
    "birthday_time": "09:00",
    "default_chat_id": -1001234567890,
    "users": [{"name": "Anna", "birthday": "29.02"}]
}"#;

pub const UNIT_FILE: &str = "[Unit]\nDescription=Birthday bot\n\n[Service]\nUser=bot\n";

/// Settings for a run with an explicit service user and no repository.
pub fn config() -> ProvisionConfig {
    ProvisionConfig {
        service_user: Some("bot".into()),
        ..ProvisionConfig::default()
    }
}

/// Seed the bot's working tree the way a checkout leaves it.
pub fn seed_sources(fs: &MemoryFs, config: &ProvisionConfig) {
    fs.seed(config.requirements_path(), "python-telegram-bot\n", 0o644);
    fs.seed(config.users_example_path(), USERS_EXAMPLE, 0o644);
    fs.seed(config.unit_source_path(), UNIT_FILE, 0o644);
}
