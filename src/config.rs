//! Ledger configuration

use serde::Deserialize;
use thiserror::Error;

use std::fs;
use std::path::Path;

use crate::blockchain::block::HASH_HEX_LEN;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerConfig {
    /// Leading zero hex characters required of a mined block hash
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,

    /// Amount issued to the miner of each block
    #[serde(default = "default_mining_reward")]
    pub mining_reward: f64,
}

fn default_difficulty() -> usize {
    2
}

fn default_mining_reward() -> f64 {
    100.0
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            mining_reward: default_mining_reward(),
        }
    }
}

impl LedgerConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.difficulty > HASH_HEX_LEN {
            return Err(ConfigError::Invalid(format!(
                "difficulty must be at most {}, got {}",
                HASH_HEX_LEN, self.difficulty
            )));
        }
        if !self.mining_reward.is_finite() || self.mining_reward < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "mining_reward must be a non-negative number, got {}",
                self.mining_reward
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.difficulty, 2);
        assert_eq!(config.mining_reward, 100.0);

        assert_eq!(LedgerConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_override() {
        let config = LedgerConfig::from_toml_str("difficulty = 3").unwrap();
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.mining_reward, 100.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            LedgerConfig::from_toml_str("difficulty = 65"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            LedgerConfig::from_toml_str("mining_reward = -5.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            LedgerConfig::from_toml_str("difficulty = \"high\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "difficulty = 1\nmining_reward = 12.5").unwrap();

        let config = LedgerConfig::load(file.path()).unwrap();
        assert_eq!(config.difficulty, 1);
        assert_eq!(config.mining_reward, 12.5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = LedgerConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
