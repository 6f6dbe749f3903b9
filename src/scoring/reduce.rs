use tracing::debug;

use crate::scoring::types::{ConsolidatedNote, ExpectedScore, PerformanceEvent, Pitch, Track};

/// Append a note, merging it into the previous one when the pitch repeats.
/// Returns the note that now ends the sequence.
fn push_merged(notes: &mut Vec<ConsolidatedNote>, pitch: Pitch, duration: f64) -> &mut ConsolidatedNote {
    let repeats = notes.last().map_or(false, |last| last.pitch == pitch);
    if repeats {
        if let Some(last) = notes.last_mut() {
            last.duration += duration;
        }
    } else {
        notes.push(ConsolidatedNote::new(pitch, duration));
    }
    let end = notes.len() - 1;
    &mut notes[end]
}

/// Flatten one track into the monophonic line it expects to hear.
///
/// Only the first staff and, within each measure, only the first chord are
/// read. A pitch held across a bar line becomes a single note that lists
/// every measure it sounds in.
pub fn reduce_expected(track: &Track) -> ExpectedScore {
    let Some(staff) = track.staves.first() else {
        return ExpectedScore {
            notes: Vec::new(),
            measure_count: 0,
        };
    };

    let mut notes: Vec<ConsolidatedNote> = Vec::new();
    for (measure_index, measure) in staff.measures.iter().enumerate() {
        let Some(chord) = measure.chords.first() else {
            continue;
        };
        for note in &chord.notes {
            push_merged(&mut notes, note.pitch, note.duration)
                .measures
                .insert(measure_index);
        }
    }

    debug!(
        notes = notes.len(),
        measures = staff.measures.len(),
        "reduced expected notes"
    );
    ExpectedScore {
        notes,
        measure_count: staff.measures.len(),
    }
}

pub fn reduce_performance(events: &[PerformanceEvent]) -> Vec<ConsolidatedNote> {
    let mut notes: Vec<ConsolidatedNote> = Vec::new();
    for event in events {
        push_merged(&mut notes, event.pitch, event.duration);
    }
    debug!(events = events.len(), notes = notes.len(), "reduced performance");
    notes
}
