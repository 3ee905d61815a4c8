use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::clock::{self, Timestamp};
use crate::error::{DripError, Result};

/// Top-level config (drip.toml + DRIP_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DripConfig {
    /// Directory holding the three durable schedule documents.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    /// Read-only content catalog document.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// File whose first line is the bot token. Never read from env or TOML.
    #[serde(default = "default_token_path")]
    pub token_path: String,
    /// Reply sent when a recipient registers.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Seconds between forced due-scans. The engine still wakes every
    /// second and scans early when any recipient is due.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Minimum seconds between two deliveries to the same recipient.
    #[serde(default = "default_min_send_interval_secs")]
    pub min_send_interval_secs: u64,
    /// Bound on a single outbound send. A timeout counts as transient.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    /// Fixed UTC offset (hours east) used for every persisted timestamp.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    /// Optional fixed first-contact time for new registrations, in the
    /// persisted timestamp format. Unset means "already due".
    #[serde(default)]
    pub first_contact_at: Option<String>,
}

impl Default for DripConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            catalog_path: default_catalog_path(),
            token_path: default_token_path(),
            greeting: default_greeting(),
            poll_interval_secs: default_poll_interval_secs(),
            min_send_interval_secs: default_min_send_interval_secs(),
            send_timeout_secs: default_send_timeout_secs(),
            utc_offset_hours: default_utc_offset_hours(),
            first_contact_at: None,
        }
    }
}

fn default_state_dir() -> String {
    "state".to_string()
}
fn default_catalog_path() -> String {
    "catalog.json".to_string()
}
fn default_token_path() -> String {
    "token".to_string()
}
fn default_greeting() -> String {
    "Hello! You're on the list.".to_string()
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_min_send_interval_secs() -> u64 {
    86_400
}
fn default_send_timeout_secs() -> u64 {
    30
}
fn default_utc_offset_hours() -> i32 {
    3
}

impl DripConfig {
    /// Load config from a TOML file with DRIP_* env var overrides.
    ///
    /// A missing file is fine — defaults plus env cover first runs; a file
    /// that exists but does not parse is an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path.unwrap_or("drip.toml");
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("DRIP_"))
            .extract()
            .map_err(|e| DripError::Config(e.to_string()))
    }

    /// The fixed offset every persisted timestamp is rendered in.
    pub fn zone(&self) -> Result<chrono::FixedOffset> {
        clock::zone(self.utc_offset_hours)
    }

    pub fn min_send_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.min_send_interval_secs as i64)
    }

    /// Parse the configured first-contact time, if any.
    pub fn first_contact(&self, zone: chrono::FixedOffset) -> Result<Option<Timestamp>> {
        self.first_contact_at
            .as_deref()
            .map(|s| clock::parse_ts(s, zone))
            .transpose()
    }
}

/// Read the bot token: first line of `path`, trailing whitespace stripped.
pub fn read_token(path: &str) -> Result<String> {
    let raw = std::fs::read_to_string(path)?;
    let token = raw.lines().next().unwrap_or("").trim().to_string();
    if token.is_empty() {
        return Err(DripError::Config(format!("token file {path} is empty")));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let cfg = DripConfig::default();
        assert_eq!(cfg.poll_interval_secs, 5);
        assert_eq!(cfg.min_send_interval_secs, 86_400);
        assert_eq!(cfg.utc_offset_hours, 3);
        assert!(cfg.first_contact_at.is_none());
    }

    #[test]
    fn load_merges_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("drip.toml");
        std::fs::write(
            &path,
            "min_send_interval_secs = 10\ngreeting = \"hi there\"\n",
        )
        .unwrap();

        let cfg = DripConfig::load(path.to_str()).unwrap();
        assert_eq!(cfg.min_send_interval_secs, 10);
        assert_eq!(cfg.greeting, "hi there");
        // untouched fields keep their defaults
        assert_eq!(cfg.poll_interval_secs, 5);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = DripConfig::load(Some("/nonexistent/drip.toml")).unwrap();
        assert_eq!(cfg.state_dir, "state");
    }

    #[test]
    fn first_contact_parses_configured_time() {
        let cfg = DripConfig {
            first_contact_at: Some("2024-03-01T09:00:00".to_string()),
            ..DripConfig::default()
        };
        let z = cfg.zone().unwrap();
        let ts = cfg.first_contact(z).unwrap().unwrap();
        assert_eq!(crate::clock::format_ts(ts), "2024-03-01T09:00:00");
    }

    #[test]
    fn read_token_strips_newline() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "123456:ABC-secret").unwrap();
        writeln!(f, "trailing junk").unwrap();

        let token = read_token(path.to_str().unwrap()).unwrap();
        assert_eq!(token, "123456:ABC-secret");
    }

    #[test]
    fn read_token_rejects_empty_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "\n").unwrap();
        assert!(read_token(path.to_str().unwrap()).is_err());
    }
}
