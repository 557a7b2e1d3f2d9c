//! Rendering analysis results for the terminal and for other tools.

use std::fmt::Write as _;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use fumen::{Chart, Feedback, FeedbackLevel, Header, MeasureRecord};
use owo_colors::OwoColorize;
use serde::Serialize;

pub const CSV_HEADER: &str = "don_density,ka_density,all_density,bpm,measure,score";

const TABLE_COLUMNS: [&str; 7] = ["#", "Don/s", "Ka/s", "Total/s", "BPM", "Measure", "Notes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns, values floored to the configured precision
    Table,
    /// Unrounded values, one measure per row
    Csv,
    /// Header and measures as pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// Parse the `[output] format` config value.
    pub fn from_config(value: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(value, true)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Invalid output format '{}' in configuration", value))
    }
}

pub struct Renderer {
    format: OutputFormat,
    precision: u32,
    color: bool,
}

impl Renderer {
    pub fn new(format: OutputFormat, precision: u32, color: bool) -> Self {
        Self {
            format,
            precision,
            color,
        }
    }

    pub fn render(&self, chart: &Chart) -> Result<String> {
        match self.format {
            OutputFormat::Table => self.render_table(chart),
            OutputFormat::Csv => render_csv(&chart.measures),
            OutputFormat::Json => render_json(chart),
        }
    }

    fn render_table(&self, chart: &Chart) -> Result<String> {
        use prettytable::{format, Cell, Row, Table};

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);

        let header: Vec<Cell> = TABLE_COLUMNS
            .iter()
            .map(|title| {
                if self.color {
                    Cell::new(title).style_spec("Fb")
                } else {
                    Cell::new(title)
                }
            })
            .collect();
        table.add_row(Row::new(header));

        for m in &chart.measures {
            let numbers = [m.don_rate, m.ka_rate, m.combined_rate, m.tempo, m.signature];
            let mut cells = vec![Cell::new(&m.index.to_string()).style_spec("r")];
            cells.extend(
                numbers
                    .iter()
                    .map(|&v| Cell::new(&floor_to(v, self.precision).to_string()).style_spec("r")),
            );
            cells.push(Cell::new(&m.raw_notes));
            table.add_row(Row::new(cells));
        }

        let mut output = Vec::new();
        table.print(&mut output)?;
        let mut text = String::from_utf8(output).context("Failed to convert table to string")?;

        if let Some(peak) = chart.peak() {
            writeln!(
                text,
                "\npeak: measure {} at {} hits/s",
                peak.index,
                floor_to(peak.combined_rate, self.precision)
            )?;
        }

        Ok(text)
    }
}

/// Truncate toward negative infinity at `digits` decimal places.
pub fn floor_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits.min(15) as i32);
    (value * scale).floor() / scale
}

pub fn render_csv(measures: &[MeasureRecord]) -> Result<String> {
    let mut out = String::with_capacity((measures.len() + 1) * 48);
    writeln!(out, "{}", CSV_HEADER)?;
    for m in measures {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            m.don_rate, m.ka_rate, m.combined_rate, m.tempo, m.signature, m.raw_notes
        )?;
    }
    Ok(out)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    header: &'a Header,
    measures: &'a [MeasureRecord],
}

pub fn render_json(chart: &Chart) -> Result<String> {
    let report = JsonReport {
        header: &chart.header,
        measures: &chart.measures,
    };
    let mut json = serde_json::to_string_pretty(&report).context("Failed to format JSON")?;
    json.push('\n');
    Ok(json)
}

/// One line of stderr output for a feedback item.
pub fn format_feedback(feedback: &Feedback, color: bool) -> String {
    let text = feedback.to_string();
    if !color {
        return text;
    }
    match feedback.level {
        FeedbackLevel::Warning => text.yellow().to_string(),
        FeedbackLevel::Info => text.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fumen::{parse, AnalysisOptions};

    fn chart(body: &str) -> Chart {
        let text = format!("TITLE:Test\nBPM:120\n#START\n{}\n#END\n", body);
        parse(&text, &AnalysisOptions::default()).unwrap().value
    }

    #[test]
    fn test_floor_to() {
        assert_eq!(floor_to(1.666_666, 3), 1.666);
        assert_eq!(floor_to(2.0, 3), 2.0);
        assert_eq!(floor_to(0.999_9, 0), 0.0);
        assert!(floor_to(f64::NAN, 3).is_nan());
        assert_eq!(floor_to(f64::INFINITY, 3), f64::INFINITY);
    }

    #[test]
    fn test_output_format_from_config() {
        assert_eq!(OutputFormat::from_config("csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_config("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_config("xml").is_err());
    }

    #[test]
    fn test_csv_is_unrounded() {
        let chart = chart("#BPMCHANGE200\n2200,");
        let csv = render_csv(&chart.measures).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap();
        assert!(row.starts_with("0,1.66666"), "row was {}", row);
        assert!(row.ends_with(",200,1,2200"), "row was {}", row);
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_table_floors_values() {
        let chart = chart("#BPMCHANGE200\n2200,");
        let table = Renderer::new(OutputFormat::Table, 3, false)
            .render(&chart)
            .unwrap();
        assert!(table.contains("Don/s"));
        assert!(table.contains("1.666"));
        assert!(!table.contains("1.667"));
        assert!(table.contains("peak: measure 1"));
    }

    #[test]
    fn test_json_has_header_and_measures() {
        let chart = chart("1100,\n2200,");
        let json = render_json(&chart).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["header"]["title"], "Test");
        assert_eq!(value["measures"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["measures"][1]["raw_notes"], "2200");
    }

    #[test]
    fn test_json_nan_becomes_null() {
        let chart = chart("#BPMCHANGEabc\n1100,");
        let json = render_json(&chart).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["measures"][0]["don_rate"].is_null());
    }

    #[test]
    fn test_feedback_plain_and_colored() {
        let feedback = Feedback::warning("bad directive", 4);
        let plain = format_feedback(&feedback, false);
        assert_eq!(plain, feedback.to_string());
        let colored = format_feedback(&feedback, true);
        assert!(colored.contains("bad directive"));
        assert_ne!(colored, plain);
    }
}
