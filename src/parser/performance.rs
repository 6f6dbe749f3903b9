use tracing::debug;

use super::{parse_field, parse_finite, record_fields};
use crate::error::AnalysisError;
use crate::scoring::types::{PerformanceEvent, Pitch};

/// Parse `<pitch> <duration>` performance records, one per line.
pub fn parse_performance(text: &str) -> Result<Vec<PerformanceEvent>, AnalysisError> {
    let mut events = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let fields = record_fields(line_no, line, 2)?;
        let pitch: i32 = parse_field(line_no, line, fields[0], "pitch")?;
        let duration = parse_finite(line_no, line, fields[1], "duration")?;
        events.push(PerformanceEvent {
            pitch: Pitch::from_midi(pitch),
            duration,
        });
    }
    debug!(events = events.len(), "parsed performance");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_performance() {
        let events = parse_performance("60 0.5\n60 0.25\n-1 0.1\n62 1.0\n").unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].pitch, Pitch::Midi(60));
        assert_eq!(events[1].duration, 0.25);
        assert_eq!(events[2].pitch, Pitch::Rest);
    }

    #[test]
    fn test_float_pitch_is_rejected() {
        let err = parse_performance("60 0.5\n60.5 0.5\n").unwrap_err();
        match err {
            AnalysisError::MalformedInput { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "60.5 0.5");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_is_empty_performance() {
        assert!(parse_performance("").unwrap().is_empty());
    }

    #[test]
    fn test_nan_duration_is_rejected() {
        let err = parse_performance("60 NaN\n62 1\n64 1\n").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { line: 1, .. }));
    }
}
