use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Position of a rest on the pitch axis when one has to be averaged or plotted.
pub const REST_LEVEL: f64 = -1.0;

/// A written or performed pitch: an integer MIDI note, or silence.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pitch {
    Midi(i32),
    Rest,
}

impl Pitch {
    /// Text records encode rests as negative numbers.
    pub fn from_midi(value: i32) -> Self {
        if value < 0 {
            Pitch::Rest
        } else {
            Pitch::Midi(value)
        }
    }

    pub fn level(self) -> f64 {
        match self {
            Pitch::Midi(midi) => midi as f64,
            Pitch::Rest => REST_LEVEL,
        }
    }

    pub fn is_rest(self) -> bool {
        matches!(self, Pitch::Rest)
    }
}

// Sheet music hierarchy

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScoreNote {
    pub pitch: Pitch,
    pub duration: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Chord {
    pub notes: Vec<ScoreNote>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Measure {
    pub chords: Vec<Chord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Staff {
    pub measures: Vec<Measure>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub name: Option<String>,
    pub staves: Vec<Staff>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SheetMusic {
    pub tracks: Vec<Track>,
}

/// Which track of a [`SheetMusic`] to score against.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum TrackSelector {
    Index(usize),
    Name(String),
}

impl Default for TrackSelector {
    fn default() -> Self {
        TrackSelector::Index(0)
    }
}

impl std::fmt::Display for TrackSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackSelector::Index(i) => write!(f, "#{}", i),
            TrackSelector::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

// Performance and alignment types

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PerformanceEvent {
    pub pitch: Pitch,
    pub duration: f64,
}

/// Adjacent identical pitches merged into one duration-summed note.
///
/// `measures` holds the indices of every measure the note sounds in; it is
/// empty for performance notes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConsolidatedNote {
    pub pitch: Pitch,
    pub duration: f64,
    pub measures: BTreeSet<usize>,
}

impl ConsolidatedNote {
    pub fn new(pitch: Pitch, duration: f64) -> Self {
        ConsolidatedNote {
            pitch,
            duration,
            measures: BTreeSet::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExpectedScore {
    pub notes: Vec<ConsolidatedNote>,
    pub measure_count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MeasureScore {
    pub duration_error: f64,
    pub pitch_error: f64,
    pub streak: u32,
    pub measure_index: usize,
}

impl MeasureScore {
    pub fn new(measure_index: usize) -> Self {
        MeasureScore {
            duration_error: 0.0,
            pitch_error: 0.0,
            streak: 0,
            measure_index,
        }
    }
}

/// One step of the synchronized expected/performed view.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimelineRow {
    pub time: f64,
    pub expected: Option<Pitch>,
    pub performed: Option<Pitch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_midi_is_rest() {
        assert_eq!(Pitch::from_midi(-1), Pitch::Rest);
        assert_eq!(Pitch::from_midi(0), Pitch::Midi(0));
        assert_eq!(Pitch::from_midi(67), Pitch::Midi(67));
    }

    #[test]
    fn test_rest_level() {
        assert_eq!(Pitch::Rest.level(), REST_LEVEL);
        assert_eq!(Pitch::Midi(60).level(), 60.0);
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(TrackSelector::Index(2).to_string(), "#2");
        assert_eq!(TrackSelector::Name("Alto".into()).to_string(), "\"Alto\"");
    }
}
