use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod pitch;
pub mod scoring;
pub mod synth;

use config::AnalysisConfig;
use pipeline::{AnalysisRequest, PerformanceSource};
use pitch::ingest::PitchInputMode;
use pitch::segment::NoteSegmenter;
use scoring::types::TrackSelector;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn track_selector(track_index: Option<u32>) -> TrackSelector {
    TrackSelector::Index(track_index.unwrap_or(0) as usize)
}

#[wasm_bindgen]
pub fn parse_sheet_music(text: &str) -> Result<JsValue, JsValue> {
    let music = parser::sheet::parse_sheet_music(text).map_err(js_err)?;
    serde_wasm_bindgen::to_value(&music).map_err(js_err)
}

/// Segment a pitch track, returning Float64Array [start, end, midi, start, end, midi, ...].
/// Silent segments report midi 0.
#[wasm_bindgen]
pub fn segment_pitch_track(
    text: &str,
    mode: &str,
    flush_trailing: bool,
) -> Result<js_sys::Float64Array, JsValue> {
    let mode: PitchInputMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
    let samples = pitch::ingest::parse_pitch_track(text, mode).map_err(js_err)?;

    let mut config = AnalysisConfig::default().segmentation;
    config.flush_trailing_run = flush_trailing;
    let notes = NoteSegmenter::new(&config).map_err(js_err)?.segment(&samples);

    let arr = js_sys::Float64Array::new_with_length((notes.len() * 3) as u32);
    for (i, note) in notes.iter().enumerate() {
        let base = (i * 3) as u32;
        arr.set_index(base, note.start_time);
        arr.set_index(base + 1, note.end_time);
        arr.set_index(base + 2, note.pitch.level());
    }
    Ok(arr)
}

/// Score a performance (`<pitch> <duration>` lines) against one track of the
/// sheet music. Returns the expected notes, the consolidated performance and
/// the measures ranked worst first.
#[wasm_bindgen]
pub fn score_performance(
    sheet_music: &str,
    performance: &str,
    track_index: Option<u32>,
    duration_tolerance: Option<f64>,
) -> Result<JsValue, JsValue> {
    let mut config = AnalysisConfig::default();
    if let Some(tolerance) = duration_tolerance {
        config.alignment.duration_tolerance = tolerance;
    }
    let request = AnalysisRequest {
        sheet_music,
        track: track_selector(track_index),
        performance: PerformanceSource::Notes(performance),
        deform_seed: None,
    };
    let analysis = pipeline::analyze(&request, &config).map_err(js_err)?;
    serde_wasm_bindgen::to_value(&analysis).map_err(js_err)
}

/// Expected and performed pitch sampled side by side for plotting.
#[wasm_bindgen]
pub fn performance_timeline(
    sheet_music: &str,
    performance: &str,
    track_index: Option<u32>,
    step: Option<f64>,
    horizon: Option<f64>,
) -> Result<JsValue, JsValue> {
    let mut config = AnalysisConfig::default();
    if let Some(step) = step {
        config.timeline.step = step;
    }
    if let Some(horizon) = horizon {
        config.timeline.horizon = horizon;
    }
    let request = AnalysisRequest {
        sheet_music,
        track: track_selector(track_index),
        performance: PerformanceSource::Notes(performance),
        deform_seed: None,
    };
    let analysis = pipeline::analyze(&request, &config).map_err(js_err)?;
    let rows = analysis.timeline(&config.timeline);
    serde_wasm_bindgen::to_value(&rows).map_err(js_err)
}
