//! Document-level chart analysis.
//!
//! Locates the header and the `#START`..`#END` body, picks the initial tempo,
//! and drives a [`DensityEngine`] over the body while recording feedback
//! against document line numbers.

mod header;

pub use header::parse_header;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{DensityEngine, LineOutcome, SegmentPolicy};
use crate::feedback::{FeedbackCollector, ParseResult};
use crate::scanner::{SIGNATURE_MARKER, TEMPO_MARKER};
use crate::types::{Chart, TimingState};
use crate::Error;

/// Marks the first body line (exclusive).
pub const START_MARKER: &str = "#START";
/// Marks the end of the body (exclusive).
pub const END_MARKER: &str = "#END";

/// Knobs for [`parse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub segments: SegmentPolicy,
    /// Fail on malformed directive payloads instead of carrying NaN forward.
    pub strict: bool,
    /// Signature ratio in effect before any `#MEASURE` directive.
    pub initial_signature: f64,
    /// Use this tempo instead of the header `BPM:` field.
    pub tempo_override: Option<f64>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            segments: SegmentPolicy::FirstOnly,
            strict: false,
            initial_signature: 1.0,
            tempo_override: None,
        }
    }
}

/// Analyze a complete chart document.
pub fn parse(input: &str, options: &AnalysisOptions) -> Result<ParseResult<Chart>, Error> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let lines: Vec<&str> = input.lines().collect();
    let mut collector = FeedbackCollector::new();

    let start = find_marker(&lines, START_MARKER).ok_or(Error::MissingStart)?;
    let end = find_marker(&lines, END_MARKER).ok_or(Error::MissingEnd)?;

    let header = parse_header(&lines[..start], 1, &mut collector);
    let tempo = initial_tempo(header.bpm, options.tempo_override)?;
    let timing = TimingState::new(tempo, options.initial_signature);
    if !timing.is_valid() {
        collector.set_line(0);
        collector.warning_with_suggestion(
            format!(
                "initial signature {} is not positive and finite, densities will be meaningless until the first valid {}",
                timing.signature, SIGNATURE_MARKER
            ),
            "Use a ratio such as 1.0 (4/4) or 0.75 (3/4)",
        );
    }

    let body = if end > start {
        &lines[start + 1..end]
    } else {
        collector.set_line(end + 1);
        collector.warning_with_suggestion(
            "#END appears before #START, the chart body is empty",
            "Move #END after the last measure",
        );
        &lines[..0]
    };
    debug!(
        title = %header.title,
        tempo,
        body_lines = body.len(),
        "analyzing chart"
    );

    let mut engine = DensityEngine::new(timing.tempo, timing.signature).with_policy(options.segments);

    for (offset, line) in body.iter().enumerate() {
        // body[0] is the line after #START; document lines are 1-based
        let line_num = start + 2 + offset;
        collector.set_line(line_num);

        match engine.feed(line) {
            LineOutcome::Tempo(bpm) => {
                check_directive(bpm, TEMPO_MARKER, line, line_num, options.strict, &mut collector)?;
            }
            LineOutcome::Signature(ratio) => {
                check_directive(ratio, SIGNATURE_MARKER, line, line_num, options.strict, &mut collector)?;
            }
            LineOutcome::Measures {
                ignored_segments, ..
            } if ignored_segments > 0 => {
                collector.warning_with_suggestion(
                    format!(
                        "{} more comma-terminated segment(s) on this line were not counted",
                        ignored_segments
                    ),
                    "Put each measure on its own line, or analyze with the 'all' segment policy",
                );
            }
            LineOutcome::Measures { .. } | LineOutcome::Continued { .. } => {}
        }
    }

    let dropped_notes = engine.pending().to_string();
    if !dropped_notes.is_empty() {
        collector.set_line(end + 1);
        collector.info(format!(
            "{} note character(s) after the last ',' were not counted",
            dropped_notes.len()
        ));
    }

    let chart = Chart {
        header,
        measures: engine.finish(),
        dropped_notes,
    };

    Ok(ParseResult::new(chart, collector.into_feedback()))
}

/// Index of the first line containing `marker`.
fn find_marker(lines: &[&str], marker: &str) -> Option<usize> {
    lines.iter().position(|line| line.contains(marker))
}

fn initial_tempo(header_bpm: Option<f64>, tempo_override: Option<f64>) -> Result<f64, Error> {
    let tempo = tempo_override.or(header_bpm).ok_or(Error::MissingTempo)?;
    if tempo > 0.0 && tempo.is_finite() {
        Ok(tempo)
    } else {
        Err(Error::InvalidTempo(tempo))
    }
}

/// Report a directive whose value will produce NaN or inf densities.
fn check_directive(
    value: f64,
    marker: &str,
    line: &str,
    line_num: usize,
    strict: bool,
    collector: &mut FeedbackCollector,
) -> Result<(), Error> {
    if value.is_nan() {
        if strict {
            return Err(Error::MalformedDirective {
                line: line_num,
                text: line.trim().to_string(),
            });
        }
        collector.warning_with_suggestion(
            format!("{} payload is not a number, densities are NaN until the next valid {}", marker, marker),
            format!("Write it as {}", example_for(marker)),
        );
    } else if value <= 0.0 || value.is_infinite() {
        collector.warning(format!(
            "{} value {} is not positive and finite, densities will be meaningless",
            marker, value
        ));
    }
    Ok(())
}

fn example_for(marker: &str) -> &'static str {
    if marker == TEMPO_MARKER {
        "#BPMCHANGE150"
    } else {
        "#MEASURE3/4"
    }
}
