use crate::config::{TimelineConfig, MAX_TIMELINE_ROWS};
use crate::scoring::types::{ConsolidatedNote, Pitch, TimelineRow};

/// Plays a note sequence back end to end from time 0.
struct NoteClock<'a> {
    notes: &'a [ConsolidatedNote],
    index: usize,
    end: f64,
}

impl<'a> NoteClock<'a> {
    fn new(notes: &'a [ConsolidatedNote]) -> Self {
        NoteClock {
            notes,
            index: 0,
            end: notes.first().map_or(0.0, |n| n.duration),
        }
    }

    /// Pitch sounding at `time`. Times must not decrease between calls.
    fn at(&mut self, time: f64) -> Option<Pitch> {
        while self.index < self.notes.len() && self.end < time {
            self.index += 1;
            if let Some(next) = self.notes.get(self.index) {
                self.end += next.duration;
            }
        }
        self.notes.get(self.index).map(|n| n.pitch)
    }
}

/// Sample the expected and performed lines side by side on a fixed grid,
/// for plotting. Never yields more than [`MAX_TIMELINE_ROWS`] rows.
pub fn timeline(
    expected: &[ConsolidatedNote],
    performance: &[ConsolidatedNote],
    config: &TimelineConfig,
) -> Vec<TimelineRow> {
    let mut rows = Vec::new();
    if !(config.step > 0.0) {
        return rows;
    }

    let mut expected_clock = NoteClock::new(expected);
    let mut performed_clock = NoteClock::new(performance);
    let mut step: u64 = 0;
    loop {
        let time = step as f64 * config.step;
        if time >= config.horizon || step >= MAX_TIMELINE_ROWS {
            break;
        }
        rows.push(TimelineRow {
            time,
            expected: expected_clock.at(time),
            performed: performed_clock.at(time),
        });
        step += 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(pitch: i32, duration: f64) -> ConsolidatedNote {
        ConsolidatedNote::new(Pitch::from_midi(pitch), duration)
    }

    #[test]
    fn test_timeline_tracks_both_lines() {
        let expected = vec![note(60, 1.0), note(62, 0.5)];
        let performance = vec![note(60, 0.9), note(-1, 0.2), note(62, 0.5)];
        let rows = timeline(
            &expected,
            &performance,
            &TimelineConfig {
                step: 0.25,
                horizon: 2.0,
            },
        );

        assert_eq!(rows.len(), 8);
        let exp: Vec<Option<Pitch>> = rows.iter().map(|r| r.expected).collect();
        let perf: Vec<Option<Pitch>> = rows.iter().map(|r| r.performed).collect();
        let m = |p| Some(Pitch::Midi(p));
        assert_eq!(
            exp,
            vec![m(60), m(60), m(60), m(60), m(60), m(62), m(62), None]
        );
        assert_eq!(
            perf,
            vec![m(60), m(60), m(60), m(60), Some(Pitch::Rest), m(62), m(62), None]
        );
    }

    #[test]
    fn test_short_notes_are_skipped_between_steps() {
        let performance = vec![note(60, 0.01), note(61, 0.01), note(62, 1.0)];
        let rows = timeline(
            &[],
            &performance,
            &TimelineConfig {
                step: 0.05,
                horizon: 0.1,
            },
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].performed, Some(Pitch::Midi(60)));
        assert_eq!(rows[1].performed, Some(Pitch::Midi(62)));
        assert!(rows.iter().all(|r| r.expected.is_none()));
    }

    #[test]
    fn test_default_horizon_row_count() {
        let rows = timeline(&[note(60, 1.0)], &[], &TimelineConfig::default());
        assert_eq!(rows.len(), 700);
        assert_eq!(rows[0].expected, Some(Pitch::Midi(60)));
        assert_eq!(rows[699].expected, None);
    }

    #[test]
    fn test_row_count_is_capped() {
        let rows = timeline(
            &[],
            &[],
            &TimelineConfig {
                step: 1.0,
                horizon: 1e12,
            },
        );
        assert_eq!(rows.len() as u64, MAX_TIMELINE_ROWS);
    }
}
