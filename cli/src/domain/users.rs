//! Schema of `users_config.json` and a non-fatal lint over it.
//!
//! The bot validates its own config at startup; this lint only surfaces
//! obvious mistakes while the operator is still on the host.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIRTHDAY_TIME: &str = "09:00";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsersConfig {
    /// Time of day notifications go out, `HH:MM`.
    #[serde(default = "default_birthday_time")]
    pub birthday_time: String,
    /// Chat used when a user has no `chat_id` of their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_chat_id: Option<ChatId>,
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Birthday as `DD.MM`.
    #[serde(default)]
    pub birthday: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
}

/// Chat ids appear both as JSON numbers and strings in the wild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatId {
    Number(i64),
    Text(String),
}

fn default_birthday_time() -> String {
    DEFAULT_BIRTHDAY_TIME.to_string()
}

/// Whether a `.env` body sets a non-empty `CHAT_ID`, the bot's last-resort
/// destination after a user's own `chat_id` and `default_chat_id`.
#[must_use]
pub fn env_has_chat_id(env: &str) -> bool {
    env.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.strip_prefix("export ").unwrap_or(line).split_once('='))
        .any(|(key, value)| {
            key.trim() == "CHAT_ID" && !value.trim().trim_matches(['"', '\'']).is_empty()
        })
}

/// Return human-readable issues found in `text`; empty when it looks sound.
/// `env_chat_id` says whether `.env` supplies a fallback `CHAT_ID`.
#[must_use]
pub fn lint(text: &str, env_chat_id: bool) -> Vec<String> {
    let config: UsersConfig = match serde_json::from_str(text) {
        Ok(config) => config,
        Err(e) => return vec![format!("not valid JSON for the users schema: {e}")],
    };

    let mut issues = Vec::new();
    if NaiveTime::parse_from_str(&config.birthday_time, "%H:%M").is_err() {
        issues.push(format!(
            "birthday_time '{}' is not HH:MM",
            config.birthday_time
        ));
    }
    for (index, user) in config.users.iter().enumerate() {
        let label = if user.name.trim().is_empty() {
            issues.push(format!("user #{} has no name", index + 1));
            format!("user #{}", index + 1)
        } else {
            user.name.clone()
        };
        if !is_day_month(&user.birthday) {
            issues.push(format!("{label}: birthday '{}' is not DD.MM", user.birthday));
        }
        if user.chat_id.is_none() && config.default_chat_id.is_none() && !env_chat_id {
            issues.push(format!(
                "{label}: no chat_id, no default_chat_id and no CHAT_ID in .env"
            ));
        }
    }
    issues
}

/// `DD.MM`, checked against a leap year so 29.02 is accepted.
fn is_day_month(value: &str) -> bool {
    value.len() == 5 && NaiveDate::parse_from_str(&format!("{value}.2000"), "%d.%m.%Y").is_ok()
}
