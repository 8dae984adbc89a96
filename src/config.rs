use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub shopmatch: ShopmatchConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub eval: EvalSettings,
}

/// Shopmatch-specific configuration: directory layout
#[derive(Debug, Clone, Deserialize)]
pub struct ShopmatchConfig {
    /// Directory holding the raw catalog (train.csv).
    pub data_dir: PathBuf,
    /// Directory split outputs are written to.
    pub split_dir: PathBuf,
    /// Directory for the trained index and evaluation artifacts.
    pub result_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Split configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SplitConfig {
    /// Target fraction of each large group kept for training.
    #[serde(default = "default_train_fraction")]
    pub train_fraction: f64,
    /// Fold count for the shuffle-split strategy.
    #[serde(default = "default_n_splits")]
    pub n_splits: usize,
}

/// Evaluation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EvalSettings {
    /// Score cutoff: a document counts as a predicted match only when its
    /// score strictly exceeds this.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Ranked cutoff for top-N retrieval.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Whether a query's own document may appear in its results.
    #[serde(default)]
    pub include_self: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_fraction: default_train_fraction(),
            n_splits: default_n_splits(),
        }
    }
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            top_n: default_top_n(),
            include_self: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_train_fraction() -> f64 {
    0.6
}

fn default_n_splits() -> usize {
    5
}

fn default_threshold() -> f64 {
    20.0
}

fn default_top_n() -> usize {
    10
}

impl Config {
    /// Load configuration from file
    ///
    /// Looks for the config file in this order:
    /// 1. Path specified in SHOPMATCH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SHOPMATCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str).context("Failed to parse config.toml")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if !self.shopmatch.data_dir.exists() {
            anyhow::bail!(
                "data_dir path does not exist: {}. Set data_dir in config.toml to your catalog directory.",
                self.shopmatch.data_dir.display()
            );
        }

        if !self.shopmatch.data_dir.is_dir() {
            anyhow::bail!(
                "data_dir must be a directory, not a file: {}",
                self.shopmatch.data_dir.display()
            );
        }

        // Validate numeric ranges
        if self.split.train_fraction <= 0.0 || self.split.train_fraction >= 1.0 {
            anyhow::bail!("split.train_fraction must be strictly between 0.0 and 1.0");
        }

        if self.split.n_splits == 0 {
            anyhow::bail!("split.n_splits must be greater than 0");
        }

        if self.eval.top_n == 0 {
            anyhow::bail!("eval.top_n must be greater than 0");
        }

        Ok(())
    }

    /// Get raw catalog directory
    pub fn data_dir(&self) -> &Path {
        &self.shopmatch.data_dir
    }

    /// Get split output directory
    pub fn split_dir(&self) -> &Path {
        &self.shopmatch.split_dir
    }

    /// Get result/artifact directory
    pub fn result_dir(&self) -> &Path {
        &self.shopmatch.result_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn create_test_config(temp_dir: &TempDir) -> String {
        let data_dir = temp_dir.path().canonicalize().unwrap();
        let data_dir_str = data_dir.to_str().unwrap().replace('\\', "\\\\");
        format!(
            r#"
[shopmatch]
data_dir = "{0}"
split_dir = "{0}/split_data"
result_dir = "{0}/result"
log_level = "debug"

[split]
train_fraction = 0.6
n_splits = 5

[eval]
threshold = 20.0
top_n = 10
include_self = false
"#,
            data_dir_str
        )
    }

    fn with_config_env(config_path: &std::path::Path, f: impl FnOnce()) {
        let original = std::env::var("SHOPMATCH_CONFIG").ok();
        std::env::set_var("SHOPMATCH_CONFIG", config_path.to_str().unwrap());
        f();
        std::env::remove_var("SHOPMATCH_CONFIG");
        if let Some(val) = original {
            std::env::set_var("SHOPMATCH_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_content = create_test_config(&temp_dir);
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, config_content).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.shopmatch.log_level, "debug");
            assert_eq!(config.split.n_splits, 5);
            assert_eq!(config.eval.top_n, 10);
            assert!(!config.eval.include_self);
        });
    }

    #[test]
    fn test_config_defaults_for_optional_sections() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().canonicalize().unwrap();
        let content = format!(
            r#"
[shopmatch]
data_dir = "{0}"
split_dir = "{0}/split_data"
result_dir = "{0}/result"
"#,
            data_dir.to_str().unwrap().replace('\\', "\\\\")
        );
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load().unwrap();
            assert_eq!(config.split.train_fraction, 0.6);
            assert_eq!(config.split.n_splits, 5);
            assert_eq!(config.eval.threshold, 20.0);
            assert_eq!(config.eval.top_n, 10);
        });
    }

    #[test]
    fn test_config_invalid_train_fraction() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let mut config_content = create_test_config(&temp_dir);
        config_content = config_content.replace("train_fraction = 0.6", "train_fraction = 1.5");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, config_content).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_err(), "Expected train_fraction range error");
            assert!(config.unwrap_err().to_string().contains("train_fraction"));
        });
    }

    #[test]
    fn test_config_missing_data_dir() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_content = create_test_config(&temp_dir)
            .replace(&temp_dir.path().canonicalize().unwrap().to_str().unwrap().replace('\\', "\\\\"), "/nonexistent/shopmatch-data");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, config_content).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_err(), "Expected missing data_dir error");
            assert!(config.unwrap_err().to_string().contains("data_dir"));
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("SHOPMATCH_CONFIG").ok();
        std::env::set_var("SHOPMATCH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("SHOPMATCH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("SHOPMATCH_CONFIG", v);
        }
    }
}
