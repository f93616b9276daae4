//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Chord analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Label confidence below which a chord is reported as uncertain.
    /// Advisory only; results are never dropped.
    /// Default: 0.7
    #[serde(default = "AnalysisConfig::default_confidence_threshold")]
    pub confidence_threshold: f64,
}

impl AnalysisConfig {
    fn default_confidence_threshold() -> f64 {
        0.7
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: Self::default_confidence_threshold(),
        }
    }
}

/// External chord oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Set false to skip the oracle even when a command is configured.
    /// Default: true
    #[serde(default = "OracleConfig::default_enabled")]
    pub enabled: bool,

    /// Oracle executable. None means heuristic analysis only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<PathBuf>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Per-call limit, probe included.
    /// Default: 2000
    #[serde(default = "OracleConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl OracleConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_timeout_ms() -> u64 {
        2000
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The command to run, if the oracle should be used at all.
    pub fn active_command(&self) -> Option<&PathBuf> {
        self.command.as_ref().filter(|_| self.enabled)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            command: None,
            args: Vec::new(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// An `EnvFilter` directive such as `"info"` or `"chordify=debug"`.
    /// Default: "warn"
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "warn".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
