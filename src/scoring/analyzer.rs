use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::config::AlignmentConfig;
use crate::scoring::types::*;

/// How consuming performance notes for one expected note ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consumption {
    /// The remaining gap to the expected duration is within tolerance.
    Satisfied,
    /// The performance ran out first.
    Exhausted,
}

/// The run of performance notes matched against one expected note.
#[derive(Clone, Debug)]
pub struct MatchedWindow<'a> {
    pub notes: &'a [ConsolidatedNote],
    pub outcome: Consumption,
}

impl<'a> MatchedWindow<'a> {
    pub fn performed_duration(&self) -> f64 {
        self.notes.iter().map(|n| n.duration).sum()
    }

    /// Time-weighted mean pitch, or `None` when nothing was consumed.
    pub fn performed_level(&self) -> Option<f64> {
        let duration = self.performed_duration();
        if duration == 0.0 {
            return None;
        }
        let weighted: f64 = self.notes.iter().map(|n| n.pitch.level() * n.duration).sum();
        Some(weighted / duration)
    }

    /// The single longest consumed note; the first one wins ties.
    pub fn held_candidate(&self) -> Option<&'a ConsolidatedNote> {
        let mut longest: Option<&'a ConsolidatedNote> = None;
        for note in self.notes {
            let best = longest.map_or(0.0, |n| n.duration);
            if note.duration > best {
                longest = Some(note);
            }
        }
        longest
    }

    /// Total time spent on the held candidate's pitch, so short off-pitch
    /// blips around a sustained note do not count against its length.
    pub fn held_duration(&self) -> f64 {
        match self.held_candidate() {
            Some(held) => self
                .notes
                .iter()
                .filter(|n| n.pitch == held.pitch)
                .map(|n| n.duration)
                .sum(),
            None => 0.0,
        }
    }
}

/// Forward-only position in the performance, shared by all expected notes.
struct PerformanceCursor<'a> {
    notes: &'a [ConsolidatedNote],
    position: usize,
}

impl<'a> PerformanceCursor<'a> {
    fn new(notes: &'a [ConsolidatedNote]) -> Self {
        PerformanceCursor { notes, position: 0 }
    }

    /// Consume notes until their total is within `tolerance` of
    /// `expected_duration` or the performance is exhausted.
    fn consume(&mut self, expected_duration: f64, tolerance: f64) -> MatchedWindow<'a> {
        let start = self.position;
        let mut performed = 0.0;
        let outcome = loop {
            if expected_duration - performed <= tolerance {
                break Consumption::Satisfied;
            }
            match self.notes.get(self.position) {
                Some(note) => {
                    performed += note.duration;
                    self.position += 1;
                }
                None => break Consumption::Exhausted,
            }
        };
        MatchedWindow {
            notes: &self.notes[start..self.position],
            outcome,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteErrors {
    pub duration_error: f64,
    pub pitch_error: f64,
}

impl NoteErrors {
    pub fn compute(expected: &ConsolidatedNote, window: &MatchedWindow<'_>) -> Self {
        let expected_duration = expected.duration;
        // nothing sung reads as pitch 0
        let performed_level = window.performed_level().unwrap_or(0.0);
        // a zero-length expected note can never be matched; rank it worst
        let duration_error = if expected_duration > 0.0 {
            (window.held_duration() - expected_duration).abs() / expected_duration
        } else {
            f64::INFINITY
        };
        NoteErrors {
            duration_error,
            pitch_error: (performed_level - expected.pitch.level()).abs() * expected_duration,
        }
    }
}

/// Score every measure of the expected line against the performance and rank
/// them worst first.
pub fn score_measures(
    expected: &[ConsolidatedNote],
    measure_count: usize,
    performance: &[ConsolidatedNote],
    config: &AlignmentConfig,
) -> Vec<MeasureScore> {
    let mut scores: Vec<MeasureScore> = (0..measure_count).map(MeasureScore::new).collect();
    accumulate_errors(&mut scores, expected, performance, config.duration_tolerance);
    compute_streaks(&mut scores);
    rank_measures(&mut scores);
    scores
}

fn accumulate_errors(
    scores: &mut [MeasureScore],
    expected: &[ConsolidatedNote],
    performance: &[ConsolidatedNote],
    tolerance: f64,
) {
    let mut cursor = PerformanceCursor::new(performance);

    for note in expected {
        let window = cursor.consume(note.duration, tolerance);
        let errors = NoteErrors::compute(note, &window);

        for &measure_index in &note.measures {
            match scores.get_mut(measure_index) {
                Some(score) => {
                    score.duration_error += errors.duration_error;
                    score.pitch_error += errors.pitch_error;
                }
                None => warn!(measure_index, "expected note refers to a missing measure"),
            }
        }

        if window.outcome == Consumption::Exhausted {
            debug!(pitch = ?note.pitch, "performance exhausted");
        }
    }
}

/// For each measure, count how many of the following measures keep a pitch
/// error at least as large as the one before them.
pub fn compute_streaks(scores: &mut [MeasureScore]) {
    for i in (0..scores.len()).rev() {
        let streak = match scores.get(i + 1) {
            Some(next) if next.pitch_error >= scores[i].pitch_error => next.streak + 1,
            _ => 0,
        };
        scores[i].streak = streak;
    }
}

fn ranking_order(a: &MeasureScore, b: &MeasureScore) -> Ordering {
    a.duration_error
        .total_cmp(&b.duration_error)
        .then_with(|| a.pitch_error.total_cmp(&b.pitch_error))
        .then_with(|| a.streak.cmp(&b.streak))
        .then_with(|| a.measure_index.cmp(&b.measure_index))
}

/// Sort descending by `(duration_error, pitch_error, streak, measure_index)`.
pub fn rank_measures(scores: &mut [MeasureScore]) {
    scores.sort_by(|a, b| ranking_order(b, a));
}
