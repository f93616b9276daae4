//! Layered configuration loading for chordify.
//!
//! # Usage
//!
//! ```rust,no_run
//! use chordconf::ChordifyConfig;
//!
//! let (config, sources) =
//!     ChordifyConfig::load_with_sources_from(None).expect("Failed to load config");
//! println!("files: {:?}", sources.files);
//! println!("threshold: {}", config.analysis.confidence_threshold);
//! if let Some(command) = config.oracle.active_command() {
//!     println!("oracle: {}", command.display());
//! }
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/chordify/config.toml` (system)
//! 2. `~/.config/chordify/config.toml` (user)
//! 3. `./chordify.toml` (local override, or the `--config` path)
//! 4. Environment variables (`CHORDIFY_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [analysis]
//! confidence_threshold = 0.7
//!
//! [oracle]
//! enabled = true
//! command = "~/bin/chord-oracle"
//! args = ["--strict"]
//! timeout_ms = 2000
//!
//! [telemetry]
//! log_level = "warn"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{AnalysisConfig, OracleConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid config value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Complete chordify configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChordifyConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ChordifyConfig {
    /// Load configuration from all sources and report where it came from.
    ///
    /// `config_path` replaces `./chordify.toml`; system and user configs
    /// still load first. Environment overrides apply last.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let files = loader::discover_config_files_with_override(config_path);
        Self::load_layers(&files, |key| std::env::var(key).ok())
    }

    /// Merge `files` in order, then apply overrides from `env`, then validate.
    pub fn load_layers<F>(files: &[PathBuf], env: F) -> Result<(Self, ConfigSources), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in files {
            let table = loader::load_from_file(path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path.clone());
        }

        let origin = sources.files.last().cloned().unwrap_or_default();
        let mut config: ChordifyConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: origin,
                message: e.to_string(),
            })?;

        config.oracle.command = config
            .oracle
            .command
            .take()
            .map(|command| loader::expand_path(&command.to_string_lossy()));

        loader::apply_overrides(&mut config, &mut sources, env)?;
        config.validate()?;

        Ok((config, sources))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.analysis.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid {
                field: "analysis.confidence_threshold".to_string(),
                message: format!("{} is outside 0.0..=1.0", threshold),
            });
        }
        if self.oracle.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "oracle.timeout_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        // Build TOML manually for nicer formatting
        let mut output = String::new();

        output.push_str("# chordify configuration\n\n");

        output.push_str("[analysis]\n");
        output.push_str(&format!(
            "confidence_threshold = {:?}\n",
            self.analysis.confidence_threshold
        ));

        output.push_str("\n[oracle]\n");
        output.push_str(&format!("enabled = {}\n", self.oracle.enabled));
        match &self.oracle.command {
            Some(command) => output.push_str(&format!("command = {:?}\n", command.display().to_string())),
            None => output.push_str("# command = \"/path/to/chord-oracle\"\n"),
        }
        let args: Vec<String> = self.oracle.args.iter().map(|a| format!("{:?}", a)).collect();
        output.push_str(&format!("args = [{}]\n", args.join(", ")));
        output.push_str(&format!("timeout_ms = {}\n", self.oracle.timeout_ms));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = {:?}\n", self.telemetry.log_level));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = ChordifyConfig::default();
        assert_eq!(config.analysis.confidence_threshold, 0.7);
        assert!(config.oracle.enabled);
        assert_eq!(config.oracle.command, None);
        assert_eq!(config.oracle.timeout_ms, 2000);
        assert_eq!(config.telemetry.log_level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_files_gives_defaults() {
        let (config, sources) = ChordifyConfig::load_layers(&[], no_env).unwrap();
        assert_eq!(config, ChordifyConfig::default());
        assert!(sources.files.is_empty());
    }

    #[test]
    fn test_later_file_wins_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let user = write_config(
            &dir,
            "user.toml",
            "[analysis]\nconfidence_threshold = 0.5\n\n[oracle]\ncommand = \"/opt/oracle\"\ntimeout_ms = 100\n",
        );
        let local = write_config(&dir, "local.toml", "[oracle]\ntimeout_ms = 800\n");

        let (config, sources) =
            ChordifyConfig::load_layers(&[user.clone(), local.clone()], no_env).unwrap();

        assert_eq!(config.analysis.confidence_threshold, 0.5);
        assert_eq!(config.oracle.command, Some(PathBuf::from("/opt/oracle")));
        assert_eq!(config.oracle.timeout_ms, 800);
        assert_eq!(config.telemetry.log_level, "warn");
        assert_eq!(sources.files, vec![user, local]);
    }

    #[test]
    fn test_env_beats_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "chordify.toml", "[telemetry]\nlog_level = \"info\"\n");
        let env = |key: &str| (key == "CHORDIFY_LOG_LEVEL").then(|| "debug".to_string());

        let (config, sources) = ChordifyConfig::load_layers(&[path], env).unwrap();
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(sources.env_overrides, vec!["CHORDIFY_LOG_LEVEL"]);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = ChordifyConfig::load_layers(&[PathBuf::from("/nonexistent/chordify.toml")], no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "chordify.toml", "[analysis]\nconfidence_threshold = 1.5\n");
        let err = ChordifyConfig::load_layers(&[path], no_env).unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { ref field, .. } if field == "analysis.confidence_threshold")
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let env = |key: &str| (key == "CHORDIFY_ORACLE_TIMEOUT_MS").then(|| "0".to_string());
        let err = ChordifyConfig::load_layers(&[], env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "oracle.timeout_ms"));
    }

    #[test]
    fn test_to_toml_parses_back() {
        let mut config = ChordifyConfig::default();
        config.oracle.command = Some(PathBuf::from("/opt/chord-oracle"));
        config.oracle.args = vec!["--json".to_string()];
        config.analysis.confidence_threshold = 0.8;

        let text = config.to_toml();
        assert!(text.contains("[analysis]"));
        assert!(text.contains("[oracle]"));
        assert!(text.contains("[telemetry]"));

        let parsed: ChordifyConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_to_toml_without_command() {
        let text = ChordifyConfig::default().to_toml();
        let parsed: ChordifyConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.oracle.command, None);
    }
}
