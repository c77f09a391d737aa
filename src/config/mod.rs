//! # Configuration
//!
//! Runtime settings for the `snakesave` tool, read from a TOML file.
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//! save_key = "SaveFile"
//!
//! [logging]
//! level = "info"
//! file = "snakesave.log"
//!
//! [rewards]
//! enabled = true
//! daily_play_bonus = 50
//! ```
//!
//! Every section has defaults, so a partial file (or none, via
//! [`Config::default`]) is enough to run. CLI verbosity flags override
//! `logging.level`.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::progress::{RewardPolicy, DEFAULT_SAVE_KEY};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the sled database.
    pub data_dir: String,
    /// Blob key the save string is written under.
    #[serde(default = "default_save_key")]
    pub save_key: String,
}

fn default_save_key() -> String {
    DEFAULT_SAVE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            save_key: default_save_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("snakesave.log".to_string()),
        }
    }
}

impl LoggingConfig {
    /// Parsed `level`, falling back to Info for unknown names.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    #[serde(default = "default_rewards_enabled")]
    pub enabled: bool,
    #[serde(default = "default_daily_play_bonus")]
    pub daily_play_bonus: u32,
}

fn default_rewards_enabled() -> bool {
    true
}

fn default_daily_play_bonus() -> u32 {
    RewardPolicy::default().daily_play_bonus
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            enabled: default_rewards_enabled(),
            daily_play_bonus: default_daily_play_bonus(),
        }
    }
}

impl RewardsConfig {
    pub fn policy(&self) -> RewardPolicy {
        RewardPolicy {
            enabled: self.enabled,
            daily_play_bonus: self.daily_play_bonus,
        }
    }
}

impl Config {
    /// Read and validate `path`.
    pub async fn load(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("cannot read snakesave config '{}': {}", path, e))?;
        let config: Config = toml::from_str(&text)
            .map_err(|e| anyhow!("'{}' is not a valid snakesave config: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the built-in defaults to `path`, replacing any existing file.
    pub async fn create_default(path: &str) -> Result<()> {
        let text = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("default config did not serialize: {}", e))?;
        fs::write(path, text)
            .await
            .map_err(|e| anyhow!("cannot write snakesave config '{}': {}", path, e))
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.storage.save_key.trim().is_empty() {
            return Err(anyhow!("storage.save_key must not be empty"));
        }
        if self.storage.save_key.chars().any(|c| c.is_control()) {
            return Err(anyhow!("storage.save_key contains control characters"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.save_key, "SaveFile");
        assert_eq!(config.rewards.daily_play_bonus, 50);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            data_dir = "/tmp/snake"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/snake");
        assert_eq!(config.storage.save_key, "SaveFile");
        assert!(config.rewards.enabled);
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.rewards.daily_play_bonus = 75;
        config.logging.level = "debug".to_string();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.rewards.policy().daily_play_bonus, 75);
        assert_eq!(parsed.logging.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let mut config = Config::default();
        config.storage.save_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let missing = missing.to_str().unwrap();
        let err = Config::load(missing).await.unwrap_err().to_string();
        assert!(err.starts_with("cannot read snakesave config"), "{err}");
        assert!(err.contains("absent.toml"), "{err}");

        let broken = dir.path().join("broken.toml");
        tokio::fs::write(&broken, "[storage\n").await.unwrap();
        let err = Config::load(broken.to_str().unwrap())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("is not a valid snakesave config"), "{err}");
    }

    #[tokio::test]
    async fn test_create_default_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snakesave.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded.storage.data_dir, "./data");
    }
}
