//! Configuration sections.

use serde::{Deserialize, Serialize};

/// How charts are analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// What to do with a second comma-terminated segment on one line:
    /// "first" ignores it, "all" counts it as its own measure.
    #[serde(default = "AnalysisConfig::default_segments")]
    pub segments: String,

    /// Treat unparseable #BPMCHANGE / #MEASURE payloads as errors.
    #[serde(default)]
    pub strict: bool,

    /// Signature ratio before the first #MEASURE directive.
    /// Default: 1.0 (4/4)
    #[serde(default = "AnalysisConfig::default_initial_signature")]
    pub initial_signature: f64,
}

impl AnalysisConfig {
    fn default_segments() -> String {
        "first".to_string()
    }

    fn default_initial_signature() -> f64 {
        1.0
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segments: Self::default_segments(),
            strict: false,
            initial_signature: Self::default_initial_signature(),
        }
    }
}

/// How results are printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// table, csv, or json
    #[serde(default = "OutputConfig::default_format")]
    pub format: String,

    /// Decimal places kept in table output (values are floored, not rounded).
    /// Default: 3
    #[serde(default = "OutputConfig::default_precision")]
    pub precision: u32,

    /// Colorize feedback and table headers.
    #[serde(default = "OutputConfig::default_color")]
    pub color: bool,
}

impl OutputConfig {
    fn default_format() -> String {
        "table".to_string()
    }

    fn default_precision() -> u32 {
        3
    }

    fn default_color() -> bool {
        true
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: Self::default_format(),
            precision: Self::default_precision(),
            color: Self::default_color(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// tracing filter directive (trace, debug, info, warn, error, or any EnvFilter directive).
    /// Default: warn
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
