//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, FumenConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local). Only existing files
/// are returned, except `cli_path`: it replaces the local `./fumen.toml` and
/// is always listed so that loading reports it when missing.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/fumen/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or platform equivalent
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("fumen/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("fumen.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a config file into a raw TOML table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Merge `overlay` into `base`, recursing into sub-tables. Overlay values win.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(overlay_section) = value {
            if let Some(toml::Value::Table(base_section)) = base.get_mut(&key) {
                merge_tables(base_section, overlay_section);
                continue;
            }
            base.insert(key, toml::Value::Table(overlay_section));
        } else {
            base.insert(key, value);
        }
    }
}

/// Turn a merged table into a typed config; absent keys take defaults.
pub fn into_config(table: toml::Table, origin: &Path) -> Result<FumenConfig, ConfigError> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut FumenConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, env::vars());
}

/// Apply overrides from explicit key/value pairs.
///
/// Values that fail to parse are ignored.
pub fn apply_overrides_from<I>(config: &mut FumenConfig, sources: &mut ConfigSources, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let applied = match key.as_str() {
            "FUMEN_SEGMENTS" => {
                config.analysis.segments = value;
                true
            }
            "FUMEN_STRICT" => parse_bool(&value)
                .map(|strict| config.analysis.strict = strict)
                .is_some(),
            "FUMEN_SIGNATURE" => value
                .parse::<f64>()
                .map(|signature| config.analysis.initial_signature = signature)
                .is_ok(),
            "FUMEN_FORMAT" => {
                config.output.format = value;
                true
            }
            "FUMEN_PRECISION" => value
                .parse::<u32>()
                .map(|precision| config.output.precision = precision)
                .is_ok(),
            "FUMEN_COLOR" => parse_bool(&value)
                .map(|color| config.output.color = color)
                .is_some(),
            // https://no-color.org: any non-empty value disables color
            "NO_COLOR" if !value.is_empty() => {
                config.output.color = false;
                true
            }
            "FUMEN_LOG_LEVEL" | "RUST_LOG" => {
                config.telemetry.log_level = value;
                true
            }
            _ => false,
        };

        if applied {
            sources.env_overrides.push(key);
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        directories::BaseDirs::new()
            .map(|d| d.home_dir().join(stripped))
            .unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(stripped) = path.strip_prefix('$') {
        // $VAR/rest/of/path
        match stripped.split_once('/') {
            Some((var_name, rest)) => env::var(var_name)
                .map(|value| PathBuf::from(value).join(rest))
                .unwrap_or_else(|_| PathBuf::from(path)),
            None => env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path)),
        }
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/charts/song.tja");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("charts/song.tja"));
    }

    #[test]
    fn test_expand_path_env_var() {
        let home = env::var("HOME").unwrap_or_default();
        if !home.is_empty() {
            assert_eq!(expand_path("$HOME/fumen.toml"), PathBuf::from(&home).join("fumen.toml"));
        }
        assert_eq!(
            expand_path("$FUMEN_SURELY_UNSET_VAR/x.toml"),
            PathBuf::from("$FUMEN_SURELY_UNSET_VAR/x.toml")
        );
    }

    #[test]
    fn test_expand_path_absolute() {
        assert_eq!(expand_path("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_discover_config_files() {
        let files = discover_config_files_with_override(None);
        assert!(files.iter().all(|path| path.exists()));
    }

    #[test]
    fn test_cli_path_always_listed() {
        let files = discover_config_files_with_override(Some(Path::new("/nonexistent/fumen.toml")));
        assert_eq!(files.last(), Some(&PathBuf::from("/nonexistent/fumen.toml")));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let table = parse_table("[output]\nformat = \"json\"\n", Path::new("test.toml")).unwrap();
        let config = into_config(table, Path::new("test.toml")).unwrap();
        assert_eq!(config.output.format, "json");
        assert_eq!(config.output.precision, 3);
        assert_eq!(config.analysis.segments, "first");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_table("[output\n", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let table = parse_table("[output]\nprecision = \"three\"\n", Path::new("t.toml")).unwrap();
        assert!(into_config(table, Path::new("t.toml")).is_err());
    }

    #[test]
    fn test_merge_tables_overlay_wins() {
        let mut base = parse_table(
            "[analysis]\nsegments = \"all\"\nstrict = true\n[output]\nprecision = 5\n",
            Path::new("base.toml"),
        )
        .unwrap();
        let overlay = parse_table("[analysis]\nstrict = false\n", Path::new("overlay.toml")).unwrap();

        merge_tables(&mut base, overlay);
        let config = into_config(base, Path::new("merged")).unwrap();

        assert_eq!(config.analysis.segments, "all");
        assert!(!config.analysis.strict);
        assert_eq!(config.output.precision, 5);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = FumenConfig::default();
        let mut sources = ConfigSources::default();

        apply_overrides_from(
            &mut config,
            &mut sources,
            vars(&[
                ("FUMEN_FORMAT", "csv"),
                ("FUMEN_PRECISION", "2"),
                ("FUMEN_STRICT", "yes"),
                ("FUMEN_SEGMENTS", "all"),
                ("FUMEN_SIGNATURE", "0.75"),
                ("RUST_LOG", "fumen=debug"),
                ("HOME", "/home/someone"),
            ]),
        );

        assert_eq!(config.output.format, "csv");
        assert_eq!(config.output.precision, 2);
        assert!(config.analysis.strict);
        assert_eq!(config.analysis.segments, "all");
        assert_eq!(config.analysis.initial_signature, 0.75);
        assert_eq!(config.telemetry.log_level, "fumen=debug");
        assert_eq!(sources.env_overrides.len(), 6);
    }

    #[test]
    fn test_env_invalid_values_ignored() {
        let mut config = FumenConfig::default();
        let mut sources = ConfigSources::default();

        apply_overrides_from(
            &mut config,
            &mut sources,
            vars(&[("FUMEN_PRECISION", "lots"), ("FUMEN_STRICT", "maybe"), ("NO_COLOR", "")]),
        );

        assert_eq!(config.output.precision, 3);
        assert!(!config.analysis.strict);
        assert!(config.output.color);
        assert!(sources.env_overrides.is_empty());
    }

    #[test]
    fn test_no_color() {
        let mut config = FumenConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides_from(&mut config, &mut sources, vars(&[("NO_COLOR", "1")]));
        assert!(!config.output.color);
    }
}
