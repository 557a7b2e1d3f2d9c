//! Header field parsing for TJA charts.

use crate::feedback::FeedbackCollector;
use crate::scanner::parse_number;
use crate::types::{Header, HeaderField};

/// Parse the `KEY:VALUE` lines that precede `#START`.
///
/// `first_line` is the 1-based document line of `lines[0]`. The first
/// occurrence of a key wins; repeated keys produce a warning.
pub fn parse_header(lines: &[&str], first_line: usize, collector: &mut FeedbackCollector) -> Header {
    let mut header = Header::default();
    let mut found_title = false;

    for (offset, line) in lines.iter().enumerate() {
        collector.set_line(first_line + offset);

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        let Some((key, value)) = split_field(trimmed) else {
            continue;
        };

        match key {
            "TITLE" => {
                if found_title {
                    collector.warning("Repeated TITLE: field ignored");
                } else {
                    header.title = value.to_string();
                    found_title = true;
                }
            }
            "SUBTITLE" => {
                header.subtitle.get_or_insert_with(|| value.to_string());
            }
            "BPM" => {
                if header.bpm.is_some() {
                    collector.warning("Repeated BPM: field ignored, the first one sets the initial tempo");
                } else {
                    header.bpm = Some(parse_number(value));
                }
            }
            "OFFSET" => {
                let offset = parse_number(value);
                if offset.is_nan() {
                    collector.warning(format!("Invalid OFFSET '{}' ignored", value));
                } else {
                    header.offset = Some(offset);
                }
            }
            "WAVE" => {
                header.wave.get_or_insert_with(|| value.to_string());
            }
            "COURSE" => {
                header.course.get_or_insert_with(|| value.to_string());
            }
            "LEVEL" => match value.parse() {
                Ok(level) => header.level = Some(level),
                Err(_) => collector.warning(format!("Invalid LEVEL '{}' ignored", value)),
            },
            _ => header.other_fields.push(HeaderField {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    if !found_title {
        collector.set_line(0);
        collector.info("No TITLE: field");
    }

    header
}

/// Split `KEY:VALUE`, where KEY is upper-case ASCII letters, digits or `_`.
fn split_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    valid_key.then_some((key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(lines: &[&str]) -> (Header, Vec<crate::feedback::Feedback>) {
        let mut collector = FeedbackCollector::new();
        let header = parse_header(lines, 1, &mut collector);
        (header, collector.into_feedback())
    }

    #[test]
    fn test_parse_basic_header() {
        let (header, feedback) = parse(&[
            "TITLE:Sample Song",
            "SUBTITLE:--Artist",
            "BPM:150",
            "WAVE:sample.ogg",
            "OFFSET:-1.25",
            "COURSE:Oni",
            "LEVEL:8",
        ]);

        assert_eq!(header.title, "Sample Song");
        assert_eq!(header.subtitle.as_deref(), Some("--Artist"));
        assert_eq!(header.bpm, Some(150.0));
        assert_eq!(header.wave.as_deref(), Some("sample.ogg"));
        assert_eq!(header.offset, Some(-1.25));
        assert_eq!(header.course.as_deref(), Some("Oni"));
        assert_eq!(header.level, Some(8));
        assert!(feedback.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let (header, _) = parse(&["TITLE:x", "BALLOON:5,5", "SCOREINIT:300"]);
        assert_eq!(
            header.other_fields,
            vec![
                HeaderField {
                    key: "BALLOON".to_string(),
                    value: "5,5".to_string()
                },
                HeaderField {
                    key: "SCOREINIT".to_string(),
                    value: "300".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_first_bpm_wins() {
        let (header, feedback) = parse(&["TITLE:x", "BPM:120", "BPM:240"]);
        assert_eq!(header.bpm, Some(120.0));
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0].line, 3);
    }

    #[test]
    fn test_unparseable_bpm_is_nan() {
        let (header, _) = parse(&["TITLE:x", "BPM:fast"]);
        assert!(header.bpm.is_some_and(f64::is_nan));
    }

    #[test]
    fn test_missing_title_is_info() {
        let (header, feedback) = parse(&["BPM:100"]);
        assert_eq!(header.title, "");
        assert_eq!(feedback.len(), 1);
        assert!(feedback[0].message.contains("TITLE"));
    }

    #[test]
    fn test_comments_and_non_fields_skipped() {
        let (header, _) = parse(&["// BPM:999", "TITLE:x", "not a field", "lower:case", "BPM:60"]);
        assert_eq!(header.bpm, Some(60.0));
        assert!(header.other_fields.is_empty());
    }

    #[test]
    fn test_bpm_inside_another_field_is_not_tempo() {
        let (header, feedback) = parse(&["TITLE:x", "SUBTITLE:--BPM:999", "BPM:120"]);
        assert_eq!(header.bpm, Some(120.0));
        assert_eq!(header.subtitle.as_deref(), Some("--BPM:999"));
        assert!(feedback.is_empty());
    }

    #[test]
    fn test_invalid_level_warns() {
        let (header, feedback) = parse(&["TITLE:x", "LEVEL:ten"]);
        assert_eq!(header.level, None);
        assert_eq!(feedback.len(), 1);
    }
}
