//! Configuration management.
//!
//! outr8 configuration can come from:
//! - Environment variables (OUTR8_*)
//! - Config file (~/.config/outr8/config.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// outr8 configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Execution engine settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Channel verification settings
    #[serde(default)]
    pub verification: VerificationConfig,
}

/// Execution engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Default hard cap on channel actions per execution. Hosts pass this
    /// as `max_actions` when invoking the runtime.
    #[serde(default = "default_max_actions")]
    pub max_actions_per_run: u32,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_actions_per_run: default_max_actions(),
        }
    }
}

fn default_max_actions() -> u32 {
    10
}

/// Channel verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Freshness window for live verifications, in whole days
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,

    /// Whether live verification sends are allowed at all
    #[serde(default = "default_true")]
    pub live_enabled: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            live_enabled: default_true(),
        }
    }
}

fn default_max_age_days() -> i64 {
    30
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Self {
        let mut config = Self::default();

        let path = Self::config_dir().join("config.toml");
        if let Ok(partial) = Self::load_partial_from_path(&path) {
            config.apply_partial(partial);
        }

        config.apply_env_overrides();
        config
    }

    /// Get the config directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("outr8"))
            .unwrap_or_else(|| PathBuf::from(".outr8"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(cap) = std::env::var("OUTR8_MAX_ACTIONS_PER_RUN") {
            if let Ok(parsed) = cap.parse::<u32>() {
                self.execution.max_actions_per_run = parsed;
            }
        }
        if let Ok(days) = std::env::var("OUTR8_VERIFICATION_MAX_AGE_DAYS") {
            if let Ok(parsed) = days.parse::<i64>() {
                self.verification.max_age_days = parsed;
            }
        }
        if let Ok(enabled) = std::env::var("OUTR8_LIVE_VERIFY_ENABLED") {
            self.verification.live_enabled = enabled.to_lowercase() == "true";
        }
    }

    fn load_partial_from_path(path: &Path) -> std::result::Result<PartialConfig, ()> {
        let content = std::fs::read_to_string(path).map_err(|_| ())?;
        toml::from_str(&content).map_err(|_| ())
    }

    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(execution) = partial.execution {
            self.execution = execution;
        }
        if let Some(verification) = partial.verification {
            self.verification = verification;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    execution: Option<ExecutionConfig>,
    verification: Option<VerificationConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.execution.max_actions_per_run, 10);
        assert_eq!(config.verification.max_age_days, 30);
        assert!(config.verification.live_enabled);
    }

    #[test]
    fn test_partial_toml_overrides_one_section() {
        let partial: PartialConfig = toml::from_str(
            r#"
[execution]
max_actions_per_run = 3
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_partial(partial);

        assert_eq!(config.execution.max_actions_per_run, 3);
        assert_eq!(config.verification.max_age_days, 30);
    }

    #[test]
    fn test_partial_toml_section_defaults() {
        let partial: PartialConfig = toml::from_str(
            r#"
[verification]
live_enabled = false
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_partial(partial);

        assert!(!config.verification.live_enabled);
        assert_eq!(config.verification.max_age_days, 30);
    }
}
