//! Analysis feedback (warnings and notes about the chart).
//!
//! Malformed charts are analyzed anyway. Anything suspicious is recorded here
//! with the document line it came from, and the caller decides what to show.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A diagnostic tied to a line of the chart document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub message: String,
    /// 1-based line in the full document, 0 when not tied to a line
    pub line: usize,
    pub suggestion: Option<String>,
}

impl Feedback {
    pub fn warning(message: impl Into<String>, line: usize) -> Self {
        Feedback {
            level: FeedbackLevel::Warning,
            message: message.into(),
            line,
            suggestion: None,
        }
    }

    pub fn info(message: impl Into<String>, line: usize) -> Self {
        Feedback {
            level: FeedbackLevel::Info,
            message: message.into(),
            line,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.level)?;
        if self.line > 0 {
            write!(f, "line {}: ", self.line)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    /// Analysis continued but some densities are likely wrong
    Warning,
    /// Worth knowing, results unaffected
    Info,
}

impl fmt::Display for FeedbackLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackLevel::Warning => f.write_str("warning"),
            FeedbackLevel::Info => f.write_str("info"),
        }
    }
}

/// Collects feedback while walking a document.
#[derive(Debug, Default)]
pub struct FeedbackCollector {
    feedback: Vec<Feedback>,
    current_line: usize,
}

impl FeedbackCollector {
    pub fn new() -> Self {
        FeedbackCollector {
            feedback: Vec::new(),
            current_line: 0,
        }
    }

    pub fn set_line(&mut self, line: usize) {
        self.current_line = line;
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.feedback.push(Feedback::warning(message, self.current_line));
    }

    pub fn warning_with_suggestion(
        &mut self,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.feedback.push(
            Feedback::warning(message, self.current_line).with_suggestion(suggestion),
        );
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.feedback.push(Feedback::info(message, self.current_line));
    }

    pub fn has_warnings(&self) -> bool {
        self.feedback
            .iter()
            .any(|f| f.level == FeedbackLevel::Warning)
    }

    pub fn into_feedback(self) -> Vec<Feedback> {
        self.feedback
    }
}

/// A value produced from a chart, plus whatever feedback came with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult<T> {
    pub value: T,
    pub feedback: Vec<Feedback>,
}

impl<T> ParseResult<T> {
    pub fn new(value: T, feedback: Vec<Feedback>) -> Self {
        ParseResult { value, feedback }
    }

    pub fn has_warnings(&self) -> bool {
        self.feedback
            .iter()
            .any(|f| f.level == FeedbackLevel::Warning)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback
            .iter()
            .filter(|f| f.level == FeedbackLevel::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Feedback> {
        self.feedback
            .iter()
            .filter(|f| f.level == FeedbackLevel::Info)
    }
}
