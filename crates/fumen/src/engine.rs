//! Measure density engine.
//!
//! The engine owns the running [`TimingState`] and the note buffer for the
//! measure being read. Lines are fed in order; each completed measure becomes
//! a [`MeasureRecord`]. Notes left in the buffer when input ends are dropped.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::scanner::{leading_notes, next_segment, scan_line, LineKind};
use crate::types::{MeasureRecord, TimingState};

/// What to do with further terminated segments after the first on one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPolicy {
    /// Only the leading segment closes a measure; the rest of the line is ignored.
    #[default]
    FirstOnly,
    /// Every terminated segment closes its own measure, and a trailing
    /// unterminated run carries into the next measure.
    All,
}

impl std::str::FromStr for SegmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first_only" | "first-only" => Ok(SegmentPolicy::FirstOnly),
            "all" => Ok(SegmentPolicy::All),
            other => Err(format!("unknown segment policy '{}' (expected 'first' or 'all')", other)),
        }
    }
}

/// Effect of feeding one line, reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOutcome {
    /// Tempo replaced; value may be NaN when the payload was malformed.
    Tempo(f64),
    /// Signature replaced with this ratio; may be NaN.
    Signature(f64),
    /// `emitted` measures completed. `ignored_segments` counts terminated
    /// segments skipped under [`SegmentPolicy::FirstOnly`].
    Measures { emitted: usize, ignored_segments: usize },
    /// `appended` note characters added to the pending measure.
    Continued { appended: usize },
}

/// Single-pass density engine for one chart.
#[derive(Debug, Clone)]
pub struct DensityEngine {
    state: TimingState,
    buffer: String,
    records: Vec<MeasureRecord>,
    policy: SegmentPolicy,
}

impl DensityEngine {
    pub fn new(tempo: f64, signature: f64) -> Self {
        DensityEngine {
            state: TimingState::new(tempo, signature),
            buffer: String::new(),
            records: Vec::new(),
            policy: SegmentPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SegmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> TimingState {
        self.state
    }

    /// Notes accumulated for a measure that has not been terminated yet.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn records(&self) -> &[MeasureRecord] {
        &self.records
    }

    /// Process one body line.
    pub fn feed(&mut self, line: &str) -> LineOutcome {
        match scan_line(line) {
            LineKind::TempoChange { bpm } => {
                debug!(from = self.state.tempo, to = bpm, "tempo change");
                self.state.tempo = bpm;
                LineOutcome::Tempo(bpm)
            }
            LineKind::SignatureChange(signature) => {
                let ratio = signature.ratio();
                debug!(
                    numerator = signature.numerator,
                    denominator = signature.denominator,
                    ratio,
                    "signature change"
                );
                self.state.signature = ratio;
                LineOutcome::Signature(ratio)
            }
            LineKind::MeasureEnd { notes, rest } => self.end_measures(notes, rest),
            LineKind::MeasureContinue { notes } => {
                self.buffer.push_str(notes);
                LineOutcome::Continued {
                    appended: notes.len(),
                }
            }
        }
    }

    /// Consume the engine. Any unterminated notes are discarded.
    pub fn finish(self) -> Vec<MeasureRecord> {
        if !self.buffer.is_empty() {
            debug!(
                notes = %self.buffer,
                "dropping unterminated notes at end of input"
            );
        }
        self.records
    }

    fn end_measures(&mut self, first: &str, rest: &str) -> LineOutcome {
        self.close_measure(first);

        let mut emitted = 1;
        let mut ignored_segments = 0;
        let mut remaining = rest;

        while let Some((notes, after)) = next_segment(remaining) {
            match self.policy {
                SegmentPolicy::FirstOnly => ignored_segments += 1,
                SegmentPolicy::All => {
                    self.close_measure(notes);
                    emitted += 1;
                }
            }
            remaining = after;
        }

        if self.policy == SegmentPolicy::All {
            self.buffer.push_str(leading_notes(remaining));
        }

        LineOutcome::Measures {
            emitted,
            ignored_segments,
        }
    }

    fn close_measure(&mut self, notes: &str) {
        self.buffer.push_str(notes);
        let record = MeasureRecord::compute(self.records.len() + 1, self.buffer.as_str(), self.state);
        trace!(
            index = record.index,
            combined = record.combined_rate,
            notes = %record.raw_notes,
            "measure"
        );
        self.records.push(record);
        self.buffer.clear();
    }
}

/// Run a fresh engine over `lines` and return every completed measure.
pub fn analyze_lines<I, S>(lines: I, tempo: f64, signature: f64) -> Vec<MeasureRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut engine = DensityEngine::new(tempo, signature);
    for line in lines {
        engine.feed(line.as_ref());
    }
    engine.finish()
}
