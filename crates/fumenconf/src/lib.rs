//! Layered configuration loading for fumen.
//!
//! # Usage
//!
//! ```rust,no_run
//! use fumenconf::FumenConfig;
//!
//! let config = FumenConfig::load().expect("Failed to load config");
//! println!("format: {}", config.output.format);
//! println!("segments: {}", config.analysis.segments);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/fumen/config.toml` (system)
//! 2. `~/.config/fumen/config.toml` (user)
//! 3. `./fumen.toml` (local override) or the path given with `--config`
//! 4. Environment variables (`FUMEN_*`, `NO_COLOR`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [analysis]
//! segments = "first"
//! strict = false
//! initial_signature = 1.0
//!
//! [output]
//! format = "table"
//! precision = 3
//! color = true
//!
//! [telemetry]
//! log_level = "warn"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, expand_path, ConfigSources};
pub use sections::{AnalysisConfig, OutputConfig, TelemetryConfig};

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
}

/// Complete fumen configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FumenConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl FumenConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with an explicit file replacing `./fumen.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            let table = loader::load_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let origin = sources
            .files
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<defaults>"));
        let mut config = loader::into_config(merged, &origin)?;

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# fumen configuration\n\n");

        output.push_str("[analysis]\n");
        output.push_str(&format!("segments = \"{}\"\n", self.analysis.segments));
        output.push_str(&format!("strict = {}\n", self.analysis.strict));
        output.push_str(&format!(
            "initial_signature = {:?}\n",
            self.analysis.initial_signature
        ));

        output.push_str("\n[output]\n");
        output.push_str(&format!("format = \"{}\"\n", self.output.format));
        output.push_str(&format!("precision = {}\n", self.output.precision));
        output.push_str(&format!("color = {}\n", self.output.color));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FumenConfig::default();
        assert_eq!(config.output.format, "table");
        assert_eq!(config.analysis.initial_signature, 1.0);
        assert_eq!(config.telemetry.log_level, "warn");
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = FumenConfig::default();
        let text = config.to_toml();
        assert!(text.contains("[analysis]"));
        assert!(text.contains("initial_signature = 1.0"));

        let parsed: FumenConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nformat = \"csv\"\nprecision = 1").unwrap();

        let (config, sources) = FumenConfig::load_with_sources_from(Some(file.path())).unwrap();
        assert_eq!(sources.files.last().map(PathBuf::as_path), Some(file.path()));
        if std::env::var("FUMEN_FORMAT").is_err() {
            assert_eq!(config.output.format, "csv");
        }
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let err = FumenConfig::load_from(Some(Path::new("/nonexistent/fumen.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
