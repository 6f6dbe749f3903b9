use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PitchSample, Voicing};
use crate::error::AnalysisError;
use crate::parser::{parse_finite, record_fields};

/// Column layout of a pitch track file. The two layouts cannot be told apart
/// from the numbers alone, so callers always pick one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PitchInputMode {
    /// `<time seconds> <frequency Hz>`, as written by an external pitch tracker.
    Hz,
    /// `<fractional midi> <frame duration seconds>`.
    MidiDelta,
}

impl FromStr for PitchInputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hz" => Ok(PitchInputMode::Hz),
            "midi-delta" => Ok(PitchInputMode::MidiDelta),
            _ => Err(format!("Unknown pitch input mode: {} (expected hz or midi-delta)", s)),
        }
    }
}

impl fmt::Display for PitchInputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PitchInputMode::Hz => write!(f, "hz"),
            PitchInputMode::MidiDelta => write!(f, "midi-delta"),
        }
    }
}

/// Read a pitch track into timed samples.
///
/// In `MidiDelta` mode a frame starts where the previous one ended, so the
/// first frame is at time 0.
pub fn parse_pitch_track(
    text: &str,
    mode: PitchInputMode,
) -> Result<Vec<PitchSample>, AnalysisError> {
    let mut samples = Vec::new();
    let mut clock = 0.0;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let fields = record_fields(line_no, line, 2)?;
        let sample = match mode {
            PitchInputMode::Hz => {
                let time = parse_finite(line_no, line, fields[0], "time")?;
                let hz = parse_finite(line_no, line, fields[1], "frequency")?;
                PitchSample {
                    time,
                    pitch: Voicing::from_hz(hz),
                }
            }
            PitchInputMode::MidiDelta => {
                let midi = parse_finite(line_no, line, fields[0], "midi pitch")?;
                let delta = parse_finite(line_no, line, fields[1], "duration")?;
                let sample = PitchSample {
                    time: clock,
                    pitch: Voicing::from_midi(midi),
                };
                clock += delta;
                sample
            }
        };
        samples.push(sample);
    }

    debug!(samples = samples.len(), %mode, "parsed pitch track");
    Ok(samples)
}
