//! Config file discovery, loading, and environment variable overlay.

use crate::{ChordifyConfig, ConfigError};
use std::env;
use std::path::{Path, PathBuf};

/// Local override file, looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "chordify.toml";

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in load order (system, user, local/cli).
///
/// Only existing files are returned, except `cli_path`: it replaces the
/// local override and is returned even when missing so that loading
/// reports it.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/chordify/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("chordify/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file into a raw table.
///
/// The table is also checked against [`ChordifyConfig`] so that type errors
/// are reported against the file that caused them.
pub fn load_from_file(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

fn parse_toml(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    let parse_error = |e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let table: toml::Table = contents.parse().map_err(parse_error)?;
    toml::Value::Table(table.clone())
        .try_into::<ChordifyConfig>()
        .map_err(parse_error)?;

    Ok(table)
}

/// Merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Apply overrides from any key lookup. Later keys win, so `RUST_LOG`
/// beats `CHORDIFY_LOG_LEVEL`.
pub fn apply_overrides<F>(
    config: &mut ChordifyConfig,
    sources: &mut ConfigSources,
    lookup: F,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("CHORDIFY_CONFIDENCE_THRESHOLD") {
        config.analysis.confidence_threshold = parse_env("CHORDIFY_CONFIDENCE_THRESHOLD", &v)?;
        sources.env_overrides.push("CHORDIFY_CONFIDENCE_THRESHOLD".to_string());
    }

    if let Some(v) = lookup("CHORDIFY_ORACLE_COMMAND") {
        config.oracle.command = if v.is_empty() {
            None
        } else {
            Some(expand_path(&v))
        };
        sources.env_overrides.push("CHORDIFY_ORACLE_COMMAND".to_string());
    }
    if let Some(v) = lookup("CHORDIFY_ORACLE_TIMEOUT_MS") {
        config.oracle.timeout_ms = parse_env("CHORDIFY_ORACLE_TIMEOUT_MS", &v)?;
        sources.env_overrides.push("CHORDIFY_ORACLE_TIMEOUT_MS".to_string());
    }
    if let Some(v) = lookup("CHORDIFY_ORACLE_ENABLED") {
        config.oracle.enabled = parse_bool("CHORDIFY_ORACLE_ENABLED", &v)?;
        sources.env_overrides.push("CHORDIFY_ORACLE_ENABLED".to_string());
    }

    if let Some(v) = lookup("CHORDIFY_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("CHORDIFY_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        field: key.to_string(),
        message: format!("cannot parse {:?}", value),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            field: key.to_string(),
            message: format!("expected a boolean, got {:?}", value),
        }),
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/bin/chord-oracle");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("bin/chord-oracle"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let expanded = expand_path("/usr/local/bin/chord-oracle");
        assert_eq!(expanded, PathBuf::from("/usr/local/bin/chord-oracle"));
    }

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files_with_override(None);
    }

    #[test]
    fn test_cli_path_returned_even_if_missing() {
        let missing = Path::new("/nonexistent/chordify.toml");
        let files = discover_config_files_with_override(Some(missing));
        assert_eq!(files.last().map(PathBuf::as_path), Some(missing));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let err = parse_toml("[oracle]\ntimeout_ms = \"soon\"\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == Path::new("bad.toml")));
    }

    #[test]
    fn test_parse_rejects_bad_syntax() {
        assert!(matches!(
            parse_toml("[analysis\n", Path::new("bad.toml")),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_merge_tables_deep() {
        let mut base: toml::Table = r#"
[analysis]
confidence_threshold = 0.5

[oracle]
command = "/usr/bin/a"
timeout_ms = 100
"#
        .parse()
        .unwrap();
        let overlay: toml::Table = "[oracle]\ntimeout_ms = 900\n".parse().unwrap();

        merge_tables(&mut base, overlay);

        assert_eq!(base["analysis"]["confidence_threshold"].as_float(), Some(0.5));
        assert_eq!(base["oracle"]["command"].as_str(), Some("/usr/bin/a"));
        assert_eq!(base["oracle"]["timeout_ms"].as_integer(), Some(900));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ChordifyConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides(
            &mut config,
            &mut sources,
            lookup(&[
                ("CHORDIFY_CONFIDENCE_THRESHOLD", "0.9"),
                ("CHORDIFY_ORACLE_COMMAND", "/opt/oracle"),
                ("CHORDIFY_ORACLE_TIMEOUT_MS", "250"),
                ("CHORDIFY_ORACLE_ENABLED", "no"),
            ]),
        )
        .unwrap();

        assert_eq!(config.analysis.confidence_threshold, 0.9);
        assert_eq!(config.oracle.command, Some(PathBuf::from("/opt/oracle")));
        assert_eq!(config.oracle.timeout_ms, 250);
        assert!(!config.oracle.enabled);
        assert_eq!(sources.env_overrides.len(), 4);
    }

    #[test]
    fn test_rust_log_beats_chordify_log_level() {
        let mut config = ChordifyConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides(
            &mut config,
            &mut sources,
            lookup(&[("CHORDIFY_LOG_LEVEL", "info"), ("RUST_LOG", "chordify=trace")]),
        )
        .unwrap();
        assert_eq!(config.telemetry.log_level, "chordify=trace");
        assert_eq!(sources.env_overrides, vec!["CHORDIFY_LOG_LEVEL", "RUST_LOG"]);
    }

    #[test]
    fn test_empty_command_clears_oracle() {
        let mut config = ChordifyConfig::default();
        config.oracle.command = Some(PathBuf::from("/opt/oracle"));
        apply_overrides(
            &mut config,
            &mut ConfigSources::default(),
            lookup(&[("CHORDIFY_ORACLE_COMMAND", "")]),
        )
        .unwrap();
        assert_eq!(config.oracle.command, None);
    }

    #[test]
    fn test_unparsable_env_value() {
        let mut config = ChordifyConfig::default();
        let err = apply_overrides(
            &mut config,
            &mut ConfigSources::default(),
            lookup(&[("CHORDIFY_ORACLE_TIMEOUT_MS", "fast")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "CHORDIFY_ORACLE_TIMEOUT_MS"));
    }
}
