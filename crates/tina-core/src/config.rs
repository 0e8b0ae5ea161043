//! Configuration management for Tina.
//!
//! Loads configuration from ${TINA_HOME}/config.toml with sensible defaults.

use std::{env, fs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable that overrides `server_url`.
pub const SERVER_URL_ENV: &str = "TINA_SERVER_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Tina configuration and data files.
    //!
    //! TINA_HOME resolution order:
    //! 1. TINA_HOME environment variable (if set)
    //! 2. ~/.config/tina (default)

    use std::env;
    use std::path::PathBuf;

    /// Returns the Tina home directory.
    ///
    /// Checks TINA_HOME env var first, falls back to ~/.config/tina
    /// (or `.tina` in the working directory when no home is known).
    pub fn tina_home() -> PathBuf {
        if let Ok(home) = env::var("TINA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".tina"),
            |h| h.join(".config").join("tina"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        tina_home().join("config.toml")
    }

    /// Returns the path of the file holding the persisted session id.
    pub fn session_path() -> PathBuf {
        tina_home().join("session_id")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        tina_home().join("logs")
    }
}

/// Transcript export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name prefix; the date is appended.
    pub file_prefix: String,
    /// Output directory (current directory when unset).
    pub output_dir: Option<String>,
    /// First header line.
    pub title: String,
    /// Shown as "Consultant: ..." in the header.
    pub consultant: String,
    /// Prefix for assistant turns.
    pub assistant_label: String,
    /// Prefix for user turns.
    pub user_label: String,
    /// Header value when no recommendation is found.
    pub policy_placeholder: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "Tina_Insurance_Chat".to_string(),
            output_dir: None,
            title: "Insurance Consultation Summary".to_string(),
            consultant: "Tina (AI Insurance Consultant)".to_string(),
            assistant_label: "Tina:".to_string(),
            user_label: "Me:".to_string(),
            policy_placeholder: "Not yet recommended".to_string(),
        }
    }
}

impl ExportConfig {
    /// Returns the directory exports are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map_or_else(|| PathBuf::from("."), expand_home)
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the consultation backend
    pub server_url: String,

    /// Timeout for a chat request in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Persist the session id across runs
    pub persist_session: bool,

    /// Default tracing filter
    pub log_level: String,

    /// Transcript export settings
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: Self::DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: 0,
            persist_session: true,
            log_level: "info".to_string(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }

    /// Returns the server URL to use, honoring the CLI flag and env override.
    ///
    /// # Errors
    /// Returns an error if the winning value is not a valid URL.
    pub fn effective_server_url(&self, flag: Option<&str>) -> Result<String> {
        resolve_server_url(flag, SERVER_URL_ENV, &self.server_url)
    }
}

/// Resolves the server URL with precedence: flag > env > config > default.
///
/// Trailing slashes are removed so `/chat` can be appended directly.
///
/// # Errors
/// Returns an error if the chosen URL does not parse.
pub fn resolve_server_url(flag: Option<&str>, env_var: &str, config_value: &str) -> Result<String> {
    let env_value = env::var(env_var).ok();
    let chosen = [flag, env_value.as_deref(), Some(config_value)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(Config::DEFAULT_SERVER_URL);

    Url::parse(chosen).with_context(|| format!("Invalid server URL: {chosen}"))?;
    Ok(chosen.trim_end_matches('/').to_string())
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map_or_else(|| PathBuf::from(path), |h| h.join(rest)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server_url, "http://localhost:3001");
        assert!(config.persist_session);
    }

    #[test]
    fn test_default_template_matches_rust_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "persist_session = false\n[export]\nfile_prefix = \"Transcript\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(!config.persist_session);
        assert_eq!(config.export.file_prefix, "Transcript");
        assert_eq!(config.export.user_label, "Me:");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "persist_session = \"maybe\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::init(&path).unwrap();
        assert!(path.exists());

        let err = Config::init(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_request_timeout_enabled() {
        let config = Config {
            request_timeout_secs: 30,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_resolve_server_url_precedence() {
        let env_var = "TINA_TEST_SERVER_URL_PRECEDENCE";
        // SAFETY: the variable name is unique to this test.
        unsafe { env::remove_var(env_var) };

        let url = resolve_server_url(None, env_var, "http://config:1/").unwrap();
        assert_eq!(url, "http://config:1");

        // SAFETY: the variable name is unique to this test.
        unsafe { env::set_var(env_var, "http://env:2") };
        let url = resolve_server_url(None, env_var, "http://config:1").unwrap();
        assert_eq!(url, "http://env:2");

        let url = resolve_server_url(Some("http://flag:3"), env_var, "http://config:1").unwrap();
        assert_eq!(url, "http://flag:3");

        // SAFETY: the variable name is unique to this test.
        unsafe { env::remove_var(env_var) };
    }

    #[test]
    fn test_resolve_server_url_rejects_garbage() {
        let err = resolve_server_url(Some("not a url"), "TINA_TEST_UNSET_URL", "").unwrap_err();
        assert!(err.to_string().contains("Invalid server URL"));
    }

    #[test]
    fn test_export_output_dir_defaults_to_cwd() {
        assert_eq!(ExportConfig::default().output_dir(), PathBuf::from("."));
        let config = ExportConfig {
            output_dir: Some("/tmp/exports".to_string()),
            ..ExportConfig::default()
        };
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/exports"));
    }
}
