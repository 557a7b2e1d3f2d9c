//! TJA chart parser and per-measure note density analysis.
//!
//! A chart body is scanned one line at a time. `#BPMCHANGE` and `#MEASURE`
//! directives update the running tempo and time-signature, and every
//! comma-terminated run of note digits closes a measure. For each measure
//! the Don (`1`, `3`) and Ka (`2`, `4`) hits are divided by the measure's
//! real-time length to give hits per second.
//!
//! # Example
//!
//! ```
//! use fumen::{parse, AnalysisOptions};
//!
//! let tja = "TITLE:Demo\nBPM:120\n#START\n1100,\n#BPMCHANGE200\n2200,\n#END\n";
//!
//! let result = parse(tja, &AnalysisOptions::default()).unwrap();
//! assert_eq!(result.value.measures.len(), 2);
//! assert_eq!(result.value.measures[0].don_rate, 1.0);
//! ```
//!
//! The engine can also be driven directly with a pre-sliced body:
//!
//! ```
//! let records = fumen::analyze_lines(["#MEASURE3/4", "1212,"], 120.0, 1.0);
//! assert_eq!(records[0].signature, 0.75);
//! ```

pub mod engine;
pub mod feedback;
pub mod parser;
pub mod scanner;
pub mod series;
pub mod types;

pub use engine::{analyze_lines, DensityEngine, LineOutcome, SegmentPolicy};
pub use feedback::{Feedback, FeedbackLevel, ParseResult};
pub use parser::AnalysisOptions;
pub use scanner::{scan_line, LineKind, Signature};
pub use series::{peak, DensitySeries};
pub use types::*;

/// Fatal problems that stop a chart from being analyzed at all.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no #START line found")]
    MissingStart,

    #[error("no #END line found")]
    MissingEnd,

    #[error("no BPM: header field found")]
    MissingTempo,

    #[error("initial tempo {0} is not a positive number")]
    InvalidTempo(f64),

    #[error("line {line}: malformed directive '{text}'")]
    MalformedDirective { line: usize, text: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Analyze a complete chart document.
///
/// Malformed content is tolerated and reported through
/// [`ParseResult::feedback`]; only missing structure (markers, tempo) and,
/// in strict mode, malformed directives are errors.
pub fn parse(input: &str, options: &AnalysisOptions) -> Result<ParseResult<Chart>> {
    parser::parse(input, options)
}

impl Chart {
    pub fn series(&self) -> DensitySeries {
        DensitySeries::from_records(&self.measures)
    }

    pub fn peak(&self) -> Option<&MeasureRecord> {
        series::peak(&self.measures)
    }
}
