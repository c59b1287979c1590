//! Configuration file support for Lift.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lift/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub training: TrainingConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl DataConfig {
    /// Where finished workouts are appended
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("workout_logs.jsonl")
    }

    /// Where the in-progress session is snapshotted
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("active_session.json")
    }
}

/// Signed-in user; an empty id means workouts cannot be saved
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

/// Training defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Step used by the weight +/- controls
    #[serde(default = "default_weight_increment")]
    pub weight_increment: f64,

    /// Rest given to exercises added during a workout
    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,

    /// How many substitutes to suggest
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            weight_increment: default_weight_increment(),
            default_rest_seconds: default_rest_seconds(),
            similar_limit: default_similar_limit(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
        .unwrap_or_else(std::env::temp_dir);
    base.join("lift")
}

fn default_user_id() -> String {
    "local".into()
}

fn default_weight_increment() -> f64 {
    crate::tracker::DEFAULT_WEIGHT_INCREMENT
}

fn default_rest_seconds() -> u32 {
    90
}

fn default_similar_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let increment = self.training.weight_increment;
        if !increment.is_finite() || increment <= 0.0 {
            return Err(Error::Config(format!(
                "training.weight_increment must be positive, got {}",
                increment
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(std::env::temp_dir);
        base.join("lift").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.user.id, "local");
        assert_eq!(config.training.weight_increment, 2.5);
        assert_eq!(config.training.default_rest_seconds, 90);
        assert!(config.data.log_path().ends_with("workout_logs.jsonl"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("lift/config.toml");

        let mut config = Config::default();
        config.training.similar_limit = 8;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.training.similar_limit, 8);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[training]
weight_increment = 1.25
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.training.weight_increment, 1.25);
        assert_eq!(config.training.default_rest_seconds, 90); // default
        assert_eq!(config.user.id, "local"); // default
    }

    #[test]
    fn test_invalid_increment_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[training]\nweight_increment = -2.5\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
