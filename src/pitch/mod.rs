pub mod ingest;
pub mod segment;

use serde::{Deserialize, Serialize};

use crate::scoring::types::Pitch;

/// Fractional MIDI number for a frequency, A4 = 440 Hz = 69.
pub fn hz_to_midi(hz: f64) -> f64 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// One frame of a pitch track.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum Voicing {
    Voiced(f64),
    Unvoiced,
}

impl Voicing {
    pub fn from_hz(hz: f64) -> Self {
        if hz > 0.0 {
            Voicing::Voiced(hz_to_midi(hz))
        } else {
            Voicing::Unvoiced
        }
    }

    pub fn from_midi(midi: f64) -> Self {
        if midi > 0.0 {
            Voicing::Voiced(midi)
        } else {
            Voicing::Unvoiced
        }
    }

    /// Value the frame contributes to the stability window. Silence sits at 0,
    /// so a voiced/unvoiced boundary always reads as unstable.
    pub fn level(self) -> f64 {
        match self {
            Voicing::Voiced(midi) => midi,
            Voicing::Unvoiced => 0.0,
        }
    }

    /// Nearest integer pitch.
    pub fn to_pitch(self) -> Pitch {
        match self {
            Voicing::Voiced(midi) => Pitch::from_midi(midi.round() as i32),
            Voicing::Unvoiced => Pitch::Rest,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PitchSample {
    pub time: f64,
    pub pitch: Voicing,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SegmentedNote {
    pub start_time: f64,
    pub end_time: f64,
    pub pitch: Voicing,
}

impl SegmentedNote {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hz_to_midi_reference_points() {
        assert!((hz_to_midi(440.0) - 69.0).abs() < 1e-12);
        assert!((hz_to_midi(880.0) - 81.0).abs() < 1e-12);
        assert!((hz_to_midi(261.625_565) - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_non_positive_frequency_is_unvoiced() {
        assert_eq!(Voicing::from_hz(0.0), Voicing::Unvoiced);
        assert_eq!(Voicing::from_hz(-3.0), Voicing::Unvoiced);
        assert_eq!(Voicing::Unvoiced.level(), 0.0);
    }

    #[test]
    fn test_to_pitch_rounds() {
        assert_eq!(Voicing::Voiced(59.6).to_pitch(), Pitch::Midi(60));
        assert_eq!(Voicing::Voiced(60.4).to_pitch(), Pitch::Midi(60));
        assert_eq!(Voicing::Unvoiced.to_pitch(), Pitch::Rest);
    }
}
