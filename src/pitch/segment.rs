use std::collections::VecDeque;

use tracing::debug;

use super::{PitchSample, SegmentedNote, Voicing};
use crate::config::SegmentationConfig;
use crate::error::AnalysisError;
use crate::scoring::types::{PerformanceEvent, Pitch};

/// Sample standard deviation (n - 1 denominator). Zero for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    (squares / (n - 1.0)).sqrt()
}

struct StableRun {
    start: f64,
    pitches: Vec<Voicing>,
}

impl StableRun {
    fn open(start: f64) -> Self {
        StableRun {
            start,
            pitches: Vec::new(),
        }
    }

    fn close(self, end: f64) -> Option<SegmentedNote> {
        if self.pitches.is_empty() || end <= self.start {
            return None;
        }
        let pitch = if self.pitches.iter().all(|p| *p == Voicing::Unvoiced) {
            Voicing::Unvoiced
        } else {
            let sum: f64 = self.pitches.iter().map(|p| p.level()).sum();
            Voicing::Voiced(sum / self.pitches.len() as f64)
        };
        Some(SegmentedNote {
            start_time: self.start,
            end_time: end,
            pitch,
        })
    }
}

/// Splits a pitch track into notes wherever the pitch holds steady.
///
/// A sample is stable when the window of the last `window_size` samples
/// (itself included) has a standard deviation strictly below the threshold,
/// and unstable when strictly above. A deviation exactly at the threshold
/// changes nothing.
#[derive(Clone, Debug)]
pub struct NoteSegmenter {
    window_size: usize,
    threshold: f64,
    flush_trailing_run: bool,
}

impl NoteSegmenter {
    pub fn new(config: &SegmentationConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(NoteSegmenter {
            window_size: config.window_size,
            threshold: config.stability_threshold,
            flush_trailing_run: config.flush_trailing_run,
        })
    }

    pub fn segment(&self, samples: &[PitchSample]) -> Vec<SegmentedNote> {
        let mut window: VecDeque<f64> = VecDeque::with_capacity(self.window_size);
        let mut run: Option<StableRun> = None;
        let mut notes = Vec::new();

        for sample in samples {
            if window.len() == self.window_size {
                window.pop_front();
            }
            window.push_back(sample.pitch.level());
            if window.len() < self.window_size {
                continue;
            }

            let deviation = sample_std_dev(window.make_contiguous());
            if deviation < self.threshold {
                run.get_or_insert_with(|| StableRun::open(sample.time))
                    .pitches
                    .push(sample.pitch);
            } else if deviation > self.threshold {
                if let Some(note) = run.take().and_then(|r| r.close(sample.time)) {
                    notes.push(note);
                }
            }
        }

        if let Some(open) = run {
            if self.flush_trailing_run {
                let end = samples.last().map(|s| s.time).unwrap_or(open.start);
                if let Some(note) = open.close(end) {
                    notes.push(note);
                }
            } else {
                debug!(start = open.start, "dropping stable run still open at end of track");
            }
        }

        debug!(samples = samples.len(), notes = notes.len(), "segmented pitch track");
        notes
    }
}

/// Turn segmented notes into performance events, filling the unstable gaps
/// between consecutive notes with rests so the performance keeps its timing.
pub fn segments_to_events(notes: &[SegmentedNote]) -> Vec<PerformanceEvent> {
    let mut events = Vec::with_capacity(notes.len() * 2);
    let mut previous_end: Option<f64> = None;

    for note in notes {
        if let Some(end) = previous_end {
            let gap = note.start_time - end;
            if gap > 0.0 {
                events.push(PerformanceEvent {
                    pitch: Pitch::Rest,
                    duration: gap,
                });
            }
        }
        events.push(PerformanceEvent {
            pitch: note.pitch.to_pitch(),
            duration: note.duration(),
        });
        previous_end = Some(note.end_time);
    }

    events
}
