//! Configuration management with YAML support

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `server.base_url`
pub const URL_ENV: &str = "BOT_CONSOLE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Transient banner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_lifetime_secs")]
    pub lifetime_secs: u64,
}

/// Usage statistics view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Trailing window in days
    #[serde(default = "default_days")]
    pub days: u32,

    /// How many of the most used commands to show
    #[serde(default = "default_list_len")]
    pub top: usize,

    /// How many recent log entries to show
    #[serde(default = "default_list_len")]
    pub recent: usize,
}

/// Upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

/// Values filled into new records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_created_by")]
    pub created_by: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:1462".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_lifetime_secs() -> u64 {
    5
}

fn default_days() -> u32 {
    7
}

fn default_list_len() -> usize {
    10
}

fn default_max_bytes() -> u64 {
    // matches the server's multipart limit
    50 * 1024 * 1024
}

fn default_category() -> String {
    "general".to_string()
}

fn default_created_by() -> String {
    "admin".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            lifetime_secs: default_lifetime_secs(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            top: default_list_len(),
            recent: default_list_len(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            category: default_category(),
            created_by: default_created_by(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./bot-console.yaml (current directory)
    /// 3. <config dir>/bot-console/bot-console.yaml
    pub fn load(path: &str) -> Result<Self> {
        let mut search_paths = vec![
            PathBuf::from(shellexpand::tilde(path).to_string()),
            PathBuf::from("bot-console.yaml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            search_paths.push(dir.join("bot-console").join("bot-console.yaml"));
        }

        for search_path in &search_paths {
            if search_path.exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Apply `BOT_CONSOLE_URL` if it is set
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                self.server.base_url = url.trim().to_string();
            }
        }
    }

    pub fn notification_lifetime(&self) -> Duration {
        Duration::from_secs(self.notifications.lifetime_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://localhost:1462");
        assert_eq!(config.notification_lifetime(), Duration::from_secs(5));
        assert_eq!(config.stats.days, 7);
        assert_eq!(config.defaults.created_by, "admin");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
server:
  base_url: http://bot.internal:9000
  timeout_secs: 5

notifications:
  lifetime_secs: 3

stats:
  days: 30
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.base_url, "http://bot.internal:9000");
        assert_eq!(config.server.timeout_secs, 5);
        assert_eq!(config.server.connect_timeout_secs, 10);
        assert_eq!(config.notifications.lifetime_secs, 3);
        assert_eq!(config.stats.days, 30);
        assert_eq!(config.stats.top, 10);
        assert_eq!(config.defaults.category, "general");
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "defaults:\n  created_by: ops").unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.defaults.created_by, "ops");
        assert_eq!(config.upload.max_bytes, 50 * 1024 * 1024);
    }
}
