//! End-to-end analysis over text inputs, shared by the CLI and the wasm API.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{AnalysisConfig, TimelineConfig};
use crate::error::AnalysisError;
use crate::parser::performance::parse_performance;
use crate::parser::sheet::parse_sheet_music;
use crate::pitch::ingest::{parse_pitch_track, PitchInputMode};
use crate::pitch::segment::{segments_to_events, NoteSegmenter};
use crate::scoring::analyzer::score_measures;
use crate::scoring::reduce::{reduce_expected, reduce_performance};
use crate::scoring::timeline::timeline;
use crate::scoring::types::*;
use crate::synth::deform_seeded;

/// Where the performed notes come from.
#[derive(Clone, Copy, Debug)]
pub enum PerformanceSource<'a> {
    /// `<pitch> <duration>` records.
    Notes(&'a str),
    /// A raw pitch track that still needs segmenting.
    PitchTrack { text: &'a str, mode: PitchInputMode },
}

#[derive(Clone, Debug)]
pub struct AnalysisRequest<'a> {
    pub sheet_music: &'a str,
    pub track: TrackSelector,
    pub performance: PerformanceSource<'a>,
    /// Perturb the performance with this seed before scoring.
    pub deform_seed: Option<u64>,
}

#[derive(Serialize, Clone, Debug)]
pub struct Analysis {
    pub expected: ExpectedScore,
    pub performance: Vec<ConsolidatedNote>,
    /// Worst measure first.
    pub ranking: Vec<MeasureScore>,
}

impl Analysis {
    pub fn timeline(&self, config: &TimelineConfig) -> Vec<TimelineRow> {
        timeline(&self.expected.notes, &self.performance, config)
    }
}

pub fn read_input(path: &Path) -> Result<String, AnalysisError> {
    std::fs::read_to_string(path).map_err(|e| AnalysisError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn load_expected(sheet_text: &str, track: &TrackSelector) -> Result<ExpectedScore, AnalysisError> {
    let music = parse_sheet_music(sheet_text)?;
    let track = music.track(track)?;
    Ok(reduce_expected(track))
}

pub fn load_performance_events(
    source: &PerformanceSource<'_>,
    config: &AnalysisConfig,
) -> Result<Vec<PerformanceEvent>, AnalysisError> {
    match source {
        PerformanceSource::Notes(text) => parse_performance(text),
        PerformanceSource::PitchTrack { text, mode } => {
            let samples = parse_pitch_track(text, *mode)?;
            let segmenter = NoteSegmenter::new(&config.segmentation)?;
            let notes = segmenter.segment(&samples);
            Ok(segments_to_events(&notes))
        }
    }
}

pub fn analyze(request: &AnalysisRequest<'_>, config: &AnalysisConfig) -> Result<Analysis, AnalysisError> {
    config.validate()?;

    let expected = load_expected(request.sheet_music, &request.track)?;
    let mut events = load_performance_events(&request.performance, config)?;
    if let Some(seed) = request.deform_seed {
        debug!(seed, "deforming performance");
        events = deform_seeded(&events, seed);
    }
    let performance = reduce_performance(&events);

    let ranking = score_measures(
        &expected.notes,
        expected.measure_count,
        &performance,
        &config.alignment,
    );
    info!(
        track = %request.track,
        expected_notes = expected.notes.len(),
        performed_notes = performance.len(),
        measures = ranking.len(),
        "scored performance"
    );

    Ok(Analysis {
        expected,
        performance,
        ranking,
    })
}
