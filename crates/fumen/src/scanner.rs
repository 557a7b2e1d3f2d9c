//! Line classification for chart bodies using winnow.
//!
//! Each body line is recognized as exactly one [`LineKind`], tried in a fixed
//! priority order: tempo change, signature change, measure terminator, and
//! finally measure continuation. The scanner only recognizes syntax; numeric
//! payloads that fail to parse come back as NaN.

use serde::{Deserialize, Serialize};
use winnow::ascii::{float, space0};
use winnow::combinator::{opt, peek, preceded, separated_pair, terminated};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

type PResult<T> = winnow::ModalResult<T>;

/// Tempo-change directive, followed directly by a number: `#BPMCHANGE180`
pub const TEMPO_MARKER: &str = "#BPMCHANGE";

/// Time-signature directive, followed by a fraction: `#MEASURE7/8`
pub const SIGNATURE_MARKER: &str = "#MEASURE";

/// Ends the current measure when it follows a run of note characters.
pub const MEASURE_TERMINATOR: char = ',';

/// A time-signature payload as written (`num/den`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub numerator: f64,
    pub denominator: f64,
}

impl Signature {
    pub fn ratio(&self) -> f64 {
        self.numerator / self.denominator
    }

    fn malformed() -> Self {
        Signature {
            numerator: f64::NAN,
            denominator: f64::NAN,
        }
    }
}

/// How a single body line affects the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKind<'a> {
    /// `#BPMCHANGE` anywhere in the line
    TempoChange { bpm: f64 },
    /// `#MEASURE` anywhere in the line
    SignatureChange(Signature),
    /// Leading note run closed by a terminator. `rest` is whatever follows the terminator.
    MeasureEnd { notes: &'a str, rest: &'a str },
    /// Leading note run (possibly empty) with no terminator
    MeasureContinue { notes: &'a str },
}

impl LineKind<'_> {
    pub fn is_directive(&self) -> bool {
        matches!(self, LineKind::TempoChange { .. } | LineKind::SignatureChange(_))
    }

    /// True when a directive's payload did not parse.
    pub fn is_malformed(&self) -> bool {
        match self {
            LineKind::TempoChange { bpm } => bpm.is_nan(),
            LineKind::SignatureChange(sig) => sig.ratio().is_nan(),
            _ => false,
        }
    }
}

/// Classify one body line.
pub fn scan_line(line: &str) -> LineKind<'_> {
    if let Some(payload) = directive_payload(line, TEMPO_MARKER) {
        return LineKind::TempoChange {
            bpm: parse_number(payload),
        };
    }

    if let Some(payload) = directive_payload(line, SIGNATURE_MARKER) {
        return LineKind::SignatureChange(parse_signature(payload));
    }

    if let Some((notes, rest)) = next_segment(line) {
        return LineKind::MeasureEnd { notes, rest };
    }

    LineKind::MeasureContinue {
        notes: leading_notes(line),
    }
}

/// Split a terminated note run off the front of `input`.
///
/// Returns the run (without the terminator) and the remaining text.
pub fn next_segment(input: &str) -> Option<(&str, &str)> {
    let mut remaining = input;
    terminated_run
        .parse_next(&mut remaining)
        .ok()
        .map(|notes| (notes, remaining))
}

/// Leading run of note characters, empty if the line starts with anything else.
pub fn leading_notes(input: &str) -> &str {
    let mut remaining = input;
    note_run_opt.parse_next(&mut remaining).unwrap_or("")
}

/// Parse a number using the longest valid prefix after optional leading
/// whitespace. Anything unparseable is NaN.
pub fn parse_number(payload: &str) -> f64 {
    let mut input = payload;
    number.parse_next(&mut input).unwrap_or(f64::NAN)
}

/// Parse a `num/den` payload. Either side failing makes both NaN.
pub fn parse_signature(payload: &str) -> Signature {
    let mut input = payload;
    fraction
        .parse_next(&mut input)
        .map(|(numerator, denominator)| Signature {
            numerator,
            denominator,
        })
        .unwrap_or_else(|_| Signature::malformed())
}

/// Text following the first occurrence of `marker`, if present.
fn directive_payload<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.find(marker).map(|pos| &line[pos + marker.len()..])
}

fn is_note_char(c: char) -> bool {
    c.is_ascii_digit()
}

fn terminated_run<'a>(input: &mut &'a str) -> PResult<&'a str> {
    terminated(take_while(1.., is_note_char), MEASURE_TERMINATOR).parse_next(input)
}

fn note_run_opt<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(0.., is_note_char).parse_next(input)
}

/// Decimal float only; `inf` and `nan` literals are not numbers here.
fn number(input: &mut &str) -> PResult<f64> {
    preceded((space0, peek(numeric_start)), float).parse_next(input)
}

fn numeric_start(input: &mut &str) -> PResult<()> {
    (
        opt(one_of(['+', '-'])),
        one_of(|c: char| c.is_ascii_digit() || c == '.'),
    )
        .void()
        .parse_next(input)
}

fn fraction(input: &mut &str) -> PResult<(f64, f64)> {
    separated_pair(number, preceded(space0, '/'), number).parse_next(input)
}
