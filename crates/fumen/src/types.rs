//! Core data types: note codes, timing state, and measure records.

use serde::{Deserialize, Serialize};

/// Duration in seconds of one 4/4 bar at 1 BPM. A bar at tempo `T` lasts `240 / T`.
pub const SECONDS_PER_WHOLE_BAR_AT_1_BPM: f64 = 240.0;

/// Category of a single note character.
///
/// Classification is by literal character, not numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteCode {
    /// Center hits: `1` (small) and `3` (big)
    Don,
    /// Rim hits: `2` (small) and `4` (big)
    Ka,
    /// Rests, rolls, balloons and anything else. Not counted toward density.
    Other,
}

impl NoteCode {
    pub fn classify(c: char) -> Self {
        match c {
            '1' | '3' => NoteCode::Don,
            '2' | '4' => NoteCode::Ka,
            _ => NoteCode::Other,
        }
    }
}

/// Per-category counts over a run of note characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteCounts {
    pub don: usize,
    pub ka: usize,
    pub other: usize,
}

impl NoteCounts {
    pub fn count(notes: &str) -> Self {
        notes.chars().fold(NoteCounts::default(), |mut counts, c| {
            match NoteCode::classify(c) {
                NoteCode::Don => counts.don += 1,
                NoteCode::Ka => counts.ka += 1,
                NoteCode::Other => counts.other += 1,
            }
            counts
        })
    }

    /// Don + Ka. `Other` never contributes to density.
    pub fn hits(&self) -> usize {
        self.don + self.ka
    }
}

/// Tempo and time-signature in effect while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingState {
    /// Beats per minute
    pub tempo: f64,
    /// Time-signature as a ratio, 4/4 = 1.0
    pub signature: f64,
}

impl TimingState {
    pub fn new(tempo: f64, signature: f64) -> Self {
        TimingState { tempo, signature }
    }

    /// Real-time length of one measure.
    ///
    /// Zero or NaN tempo/signature are not guarded and yield inf/NaN.
    pub fn bar_seconds(&self) -> f64 {
        SECONDS_PER_WHOLE_BAR_AT_1_BPM / self.tempo * self.signature
    }

    /// Both values positive and finite, so densities are meaningful.
    pub fn is_valid(&self) -> bool {
        self.tempo > 0.0
            && self.tempo.is_finite()
            && self.signature > 0.0
            && self.signature.is_finite()
    }
}

impl Default for TimingState {
    fn default() -> Self {
        TimingState {
            tempo: 120.0,
            signature: 1.0,
        }
    }
}

/// One completed measure and its note densities (hits per second).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRecord {
    /// 1-based position in emission order
    pub index: usize,
    pub don_rate: f64,
    pub ka_rate: f64,
    /// Always `don_rate + ka_rate`, not the rate of every character in `raw_notes`
    pub combined_rate: f64,
    pub tempo: f64,
    pub signature: f64,
    /// Every note character accumulated for this measure, without the terminator
    pub raw_notes: String,
}

impl MeasureRecord {
    /// Compute the densities for a finished measure.
    pub fn compute(index: usize, raw_notes: impl Into<String>, timing: TimingState) -> Self {
        let raw_notes = raw_notes.into();
        let counts = NoteCounts::count(&raw_notes);
        let bar_seconds = timing.bar_seconds();
        let don_rate = counts.don as f64 / bar_seconds;
        let ka_rate = counts.ka as f64 / bar_seconds;

        MeasureRecord {
            index,
            don_rate,
            ka_rate,
            combined_rate: don_rate + ka_rate,
            tempo: timing.tempo,
            signature: timing.signature,
            raw_notes,
        }
    }
}

/// Chart metadata from the `KEY:VALUE` lines before `#START`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub title: String,
    pub subtitle: Option<String>,
    /// Initial tempo. May be NaN when the field was present but unparseable.
    pub bpm: Option<f64>,
    /// Seconds between audio start and the first measure
    pub offset: Option<f64>,
    pub wave: Option<String>,
    pub course: Option<String>,
    pub level: Option<u8>,
    pub other_fields: Vec<HeaderField>,
}

/// A header line with a key this crate does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderField {
    pub key: String,
    pub value: String,
}

/// A fully analyzed chart document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub header: Header,
    pub measures: Vec<MeasureRecord>,
    /// Notes after the last terminator. Never counted as a measure.
    pub dropped_notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(NoteCode::classify('1'), NoteCode::Don);
        assert_eq!(NoteCode::classify('3'), NoteCode::Don);
        assert_eq!(NoteCode::classify('2'), NoteCode::Ka);
        assert_eq!(NoteCode::classify('4'), NoteCode::Ka);
        assert_eq!(NoteCode::classify('0'), NoteCode::Other);
        assert_eq!(NoteCode::classify('5'), NoteCode::Other);
        assert_eq!(NoteCode::classify('A'), NoteCode::Other);
    }

    #[test]
    fn test_counts() {
        let counts = NoteCounts::count("1203400560");
        assert_eq!(counts.don, 2);
        assert_eq!(counts.ka, 2);
        assert_eq!(counts.other, 6);
        assert_eq!(counts.hits(), 4);
    }

    #[test]
    fn test_bar_seconds() {
        assert_eq!(TimingState::new(120.0, 1.0).bar_seconds(), 2.0);
        assert_eq!(TimingState::new(200.0, 1.0).bar_seconds(), 1.2);
        assert_eq!(TimingState::new(120.0, 0.75).bar_seconds(), 1.5);
    }

    #[test]
    fn test_compute_record() {
        let record = MeasureRecord::compute(1, "1100", TimingState::new(120.0, 1.0));
        assert_eq!(record.don_rate, 1.0);
        assert_eq!(record.ka_rate, 0.0);
        assert_eq!(record.combined_rate, 1.0);
        assert_eq!(record.raw_notes, "1100");
    }

    #[test]
    fn test_zero_timing_is_not_guarded() {
        // 240 / 0 = inf, so every rate collapses to zero
        let record = MeasureRecord::compute(1, "1", TimingState::new(0.0, 1.0));
        assert_eq!(record.don_rate, 0.0);
        assert!(!TimingState::new(0.0, 1.0).is_valid());
        assert!(!TimingState::new(f64::INFINITY, 1.0).is_valid());
        assert!(!TimingState::new(120.0, f64::NAN).is_valid());
        assert!(TimingState::default().is_valid());

        // zero-length bar: 1/0 = inf, 0/0 = NaN
        let record = MeasureRecord::compute(1, "1", TimingState::new(120.0, 0.0));
        assert!(record.don_rate.is_infinite());
        assert!(record.ka_rate.is_nan());
        assert!(record.combined_rate.is_nan());
    }
}
