//! Plain-text renderings of the analysis results.

use crate::pitch::SegmentedNote;
use crate::scoring::types::{MeasureScore, Pitch, TimelineRow, REST_LEVEL};

/// One `index: duration_error, pitch_error, streak` line per measure, in the
/// order given.
pub fn format_ranking(scores: &[MeasureScore]) -> String {
    let mut out = String::new();
    for score in scores {
        out.push_str(&format!(
            "{}: {:.2}, {:.2}, {}\n",
            score.measure_index, score.duration_error, score.pitch_error, score.streak
        ));
    }
    out
}

fn plotted(pitch: Option<Pitch>) -> f64 {
    pitch.map_or(REST_LEVEL, Pitch::level)
}

/// Tab-separated `time expected performed` rows; `-1` marks silence.
pub fn format_timeline(rows: &[TimelineRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "{:.2}\t{:.2}\t{:.2}\n",
            row.time,
            plotted(row.expected),
            plotted(row.performed)
        ));
    }
    out
}

pub fn format_segments(notes: &[SegmentedNote]) -> String {
    let mut out = String::from("Start, MIDI, Duration (s)\n");
    for note in notes {
        out.push_str(&format!(
            "{:.2}, {:.2}, {:.2}\n",
            note.start_time,
            note.pitch.level(),
            note.duration()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Voicing;

    #[test]
    fn test_format_ranking() {
        let scores = vec![
            MeasureScore {
                duration_error: 0.5,
                pitch_error: 31.0,
                streak: 2,
                measure_index: 4,
            },
            MeasureScore::new(0),
        ];
        assert_eq!(format_ranking(&scores), "4: 0.50, 31.00, 2\n0: 0.00, 0.00, 0\n");
    }

    #[test]
    fn test_format_ranking_unmatchable_measure() {
        let scores = vec![MeasureScore {
            duration_error: f64::INFINITY,
            ..MeasureScore::new(0)
        }];
        assert_eq!(format_ranking(&scores), "0: inf, 0.00, 0\n");
    }

    #[test]
    fn test_format_timeline_marks_silence() {
        let rows = vec![
            TimelineRow {
                time: 0.0,
                expected: Some(Pitch::Midi(60)),
                performed: Some(Pitch::Rest),
            },
            TimelineRow {
                time: 0.05,
                expected: None,
                performed: Some(Pitch::Midi(62)),
            },
        ];
        assert_eq!(
            format_timeline(&rows),
            "0.00\t60.00\t-1.00\n0.05\t-1.00\t62.00\n"
        );
    }

    #[test]
    fn test_format_segments() {
        let notes = vec![SegmentedNote {
            start_time: 0.1,
            end_time: 0.6,
            pitch: Voicing::Voiced(60.25),
        }];
        assert_eq!(
            format_segments(&notes),
            "Start, MIDI, Duration (s)\n0.10, 60.25, 0.50\n"
        );
    }
}
