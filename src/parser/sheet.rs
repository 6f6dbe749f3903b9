use tracing::debug;

use super::{parse_field, parse_finite, record_fields};
use crate::error::AnalysisError;
use crate::scoring::types::{
    Chord, Measure, Pitch, ScoreNote, SheetMusic, Staff, Track, TrackSelector,
};

/// Container nesting, outermost first. The discriminant is the stack height
/// at which a container of that level sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Track = 0,
    Staff = 1,
    Measure = 2,
    Chord = 3,
}

const DEPTH: usize = 4;

impl Level {
    fn from_keyword(token: &str) -> Option<Level> {
        match token {
            "Track:" => Some(Level::Track),
            "Staff:" => Some(Level::Staff),
            "Measure:" => Some(Level::Measure),
            "{" | "}" => Some(Level::Chord),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum Open {
    Track(Track),
    Staff(Staff),
    Measure(Measure),
    Chord(Chord),
}

impl Open {
    fn empty_at(height: usize) -> Open {
        match height {
            0 => Open::Track(Track::default()),
            1 => Open::Staff(Staff::default()),
            2 => Open::Measure(Measure::default()),
            _ => Open::Chord(Chord::default()),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Open::Track(track) => track.staves.is_empty(),
            Open::Staff(staff) => staff.measures.is_empty(),
            Open::Measure(measure) => measure.chords.is_empty(),
            Open::Chord(chord) => chord.notes.is_empty(),
        }
    }

    fn adopt(&mut self, child: Open) {
        match (self, child) {
            (Open::Track(track), Open::Staff(staff)) => track.staves.push(staff),
            (Open::Staff(staff), Open::Measure(measure)) => staff.measures.push(measure),
            (Open::Measure(measure), Open::Chord(chord)) => measure.chords.push(chord),
            (parent, child) => {
                debug_assert!(false, "cannot nest {:?} inside {:?}", child, parent)
            }
        }
    }
}

/// Stack of the currently open Track, Staff, Measure and Chord.
struct SheetBuilder {
    music: SheetMusic,
    open: Vec<Open>,
}

impl SheetBuilder {
    fn new() -> Self {
        let mut builder = SheetBuilder {
            music: SheetMusic::default(),
            open: Vec::with_capacity(DEPTH),
        };
        builder.reopen();
        builder
    }

    fn reopen(&mut self) {
        while self.open.len() < DEPTH {
            self.open.push(Open::empty_at(self.open.len()));
        }
    }

    /// Close every container at `level` or deeper, innermost first. Empty
    /// containers are discarded instead of being attached to their parent.
    fn close(&mut self, level: Level) {
        while self.open.len() > level as usize {
            let Some(container) = self.open.pop() else {
                break;
            };
            if container.is_empty() {
                continue;
            }
            match (self.open.last_mut(), container) {
                (Some(parent), child) => parent.adopt(child),
                (None, Open::Track(track)) => self.music.tracks.push(track),
                (None, other) => debug_assert!(false, "{:?} left at the bottom of the stack", other),
            }
        }
    }

    fn push_note(&mut self, note: ScoreNote) {
        if let Some(Open::Chord(chord)) = self.open.last_mut() {
            chord.notes.push(note);
        }
    }

    fn name_track(&mut self, name: String) {
        if let Some(Open::Track(track)) = self.open.first_mut() {
            track.name = Some(name);
        }
    }

    fn finish(mut self) -> SheetMusic {
        self.close(Level::Track);
        self.music
    }
}

/// Parse the line-oriented sheet music format.
///
/// `Track:`, `Staff:`, `Measure:`, `{` and `}` lines open a new container at
/// their level; every other line is a `<pitch> <duration>` note in the open
/// chord. Negative pitches are rests.
pub fn parse_sheet_music(text: &str) -> Result<SheetMusic, AnalysisError> {
    let mut builder = SheetBuilder::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut tokens = line.split_whitespace();
        let first = tokens
            .next()
            .ok_or_else(|| AnalysisError::malformed(line_no, line, "blank line"))?;

        if let Some(level) = Level::from_keyword(first) {
            builder.close(level);
            builder.reopen();
            if level == Level::Track {
                let name = tokens.collect::<Vec<_>>().join(" ");
                if !name.is_empty() {
                    builder.name_track(name);
                }
            }
            continue;
        }

        let fields = record_fields(line_no, line, 2)?;
        let pitch: i32 = parse_field(line_no, line, fields[0], "pitch")?;
        let duration = parse_finite(line_no, line, fields[1], "duration")?;
        builder.push_note(ScoreNote {
            pitch: Pitch::from_midi(pitch),
            duration,
        });
    }

    let music = builder.finish();
    debug!(tracks = music.tracks.len(), "parsed sheet music");
    Ok(music)
}

impl SheetMusic {
    pub fn track(&self, selector: &TrackSelector) -> Result<&Track, AnalysisError> {
        let found = match selector {
            TrackSelector::Index(index) => self.tracks.get(*index),
            TrackSelector::Name(name) => self
                .tracks
                .iter()
                .find(|t| t.name.as_deref() == Some(name.as_str())),
        };
        found.ok_or_else(|| AnalysisError::TrackNotFound(selector.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(pitch: i32, duration: f64) -> ScoreNote {
        ScoreNote {
            pitch: Pitch::from_midi(pitch),
            duration,
        }
    }

    fn chord(notes: Vec<ScoreNote>) -> Chord {
        Chord { notes }
    }

    #[test]
    fn test_trailing_containers_are_flushed() {
        let music = parse_sheet_music("Track:\nMeasure:\n60 1.0\n").unwrap();
        assert_eq!(
            music,
            SheetMusic {
                tracks: vec![Track {
                    name: None,
                    staves: vec![Staff {
                        measures: vec![Measure {
                            chords: vec![chord(vec![note(60, 1.0)])],
                        }],
                    }],
                }],
            }
        );
    }

    #[test]
    fn test_implicit_containers_without_header() {
        let music = parse_sheet_music("60 0.5\n62 0.5").unwrap();
        assert_eq!(music.tracks.len(), 1);
        let measures = &music.tracks[0].staves[0].measures;
        assert_eq!(measures.len(), 1);
        assert_eq!(measures[0].chords[0].notes, vec![note(60, 0.5), note(62, 0.5)]);
    }

    #[test]
    fn test_measure_keyword_closes_measure() {
        let text = "Track:\nStaff:\nMeasure:\n60 1\n62 1\nMeasure:\n64 2\n";
        let music = parse_sheet_music(text).unwrap();
        let measures = &music.tracks[0].staves[0].measures;
        assert_eq!(measures.len(), 2);
        assert_eq!(measures[0].chords, vec![chord(vec![note(60, 1.0), note(62, 1.0)])]);
        assert_eq!(measures[1].chords, vec![chord(vec![note(64, 2.0)])]);
    }

    #[test]
    fn test_braces_split_chords_only() {
        let text = "Measure:\n{\n60 1\n}\n{\n67 1\n}\nMeasure:\n{\n62 2\n}\n";
        let music = parse_sheet_music(text).unwrap();
        let staff = &music.tracks[0].staves[0];
        assert_eq!(staff.measures.len(), 2);
        assert_eq!(staff.measures[0].chords.len(), 2);
        assert_eq!(staff.measures[0].chords[1].notes, vec![note(67, 1.0)]);
        assert_eq!(staff.measures[1].chords[0].notes, vec![note(62, 2.0)]);
    }

    #[test]
    fn test_staff_and_track_cascade() {
        let text = "Track: Soprano\nStaff:\nMeasure:\n60 1\nStaff:\nMeasure:\n48 1\n\
                    Track: Alto\nMeasure:\n55 1\nMeasure:\n57 1\n";
        let music = parse_sheet_music(text).unwrap();
        assert_eq!(music.tracks.len(), 2);
        assert_eq!(music.tracks[0].name.as_deref(), Some("Soprano"));
        assert_eq!(music.tracks[0].staves.len(), 2);
        assert_eq!(music.tracks[0].staves[1].measures[0].chords[0].notes, vec![note(48, 1.0)]);
        assert_eq!(music.tracks[1].name.as_deref(), Some("Alto"));
        assert_eq!(music.tracks[1].staves[0].measures.len(), 2);
    }

    #[test]
    fn test_multi_word_track_name() {
        let music = parse_sheet_music("Track: Piano Upper 2\n60 1\n").unwrap();
        assert_eq!(music.tracks[0].name.as_deref(), Some("Piano Upper 2"));
    }

    #[test]
    fn test_negative_pitch_is_rest() {
        let music = parse_sheet_music("-1 0.5\n").unwrap();
        let notes = &music.tracks[0].staves[0].measures[0].chords[0].notes;
        assert_eq!(notes[0].pitch, Pitch::Rest);
    }

    #[test]
    fn test_empty_input_has_no_tracks() {
        let music = parse_sheet_music("").unwrap();
        assert!(music.tracks.is_empty());
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let err = parse_sheet_music("Track:\n\n60 1\n").unwrap_err();
        match err {
            AnalysisError::MalformedInput { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_bad_note_is_malformed() {
        assert!(parse_sheet_music("Measure:\nC4 1.0\n").is_err());
        assert!(parse_sheet_music("Measure:\n60 quarter\n").is_err());
        assert!(parse_sheet_music("Measure:\n60\n").is_err());
    }

    #[test]
    fn test_infinite_duration_is_malformed() {
        let err = parse_sheet_music("Measure:\n60 1\n62 inf\n").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { line: 3, .. }));
    }

    #[test]
    fn test_track_selection() {
        let music = parse_sheet_music("Track: Soprano\n60 1\nTrack: Alto\n55 1\n").unwrap();
        let alto = music.track(&TrackSelector::Name("Alto".into())).unwrap();
        assert_eq!(alto.staves[0].measures[0].chords[0].notes, vec![note(55, 1.0)]);
        assert_eq!(
            music.track(&TrackSelector::Index(0)).unwrap().name.as_deref(),
            Some("Soprano")
        );
        assert!(matches!(
            music.track(&TrackSelector::Index(5)),
            Err(AnalysisError::TrackNotFound(_))
        ));
        assert!(music.track(&TrackSelector::Name("Bass".into())).is_err());
    }
}
