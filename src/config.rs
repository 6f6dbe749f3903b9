//! Tunable constants for segmentation, alignment and the timeline view.
//!
//! Every value has a default matching the hand-tuned constants the analysis
//! was developed with, so an empty TOML file (or no file) is valid:
//!
//! ```toml
//! [segmentation]
//! window_size = 10
//! stability_threshold = 0.05
//! flush_trailing_run = false
//!
//! [alignment]
//! duration_tolerance = 0.08
//!
//! [timeline]
//! step = 0.05
//! horizon = 35.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Upper bound on the rows a timeline may produce.
pub const MAX_TIMELINE_ROWS: u64 = 1_000_000;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Number of samples in the stability window, current sample included.
    pub window_size: usize,
    /// Sample standard deviation (in semitones) below which a window is stable.
    pub stability_threshold: f64,
    /// Emit a run that is still stable when the track ends instead of dropping it.
    pub flush_trailing_run: bool,
}

impl SegmentationConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.window_size < 2 {
            return Err(AnalysisError::InvalidConfig(format!(
                "segmentation.window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        if !self.stability_threshold.is_finite() || self.stability_threshold < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "segmentation.stability_threshold must be a non-negative number, got {}",
                self.stability_threshold
            )));
        }
        Ok(())
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        SegmentationConfig {
            window_size: 10,
            stability_threshold: 0.05,
            flush_trailing_run: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Seconds of expected duration that may remain unmatched before the
    /// scorer stops consuming performance notes for an expected note.
    pub duration_tolerance: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        AlignmentConfig {
            duration_tolerance: 0.08,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TimelineConfig {
    pub step: f64,
    pub horizon: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        TimelineConfig {
            step: 0.05,
            horizon: 35.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub segmentation: SegmentationConfig,
    pub alignment: AlignmentConfig,
    pub timeline: TimelineConfig,
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let contents = std::fs::read_to_string(path).map_err(|e| AnalysisError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents, path)
    }

    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig =
            toml::from_str(contents).map_err(|e: toml::de::Error| AnalysisError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.segmentation.validate()?;
        let tolerance = self.alignment.duration_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "alignment.duration_tolerance must be a non-negative number, got {}",
                tolerance
            )));
        }
        let timeline = &self.timeline;
        if !(timeline.step.is_finite() && timeline.step > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "timeline.step must be positive, got {}",
                timeline.step
            )));
        }
        if !timeline.horizon.is_finite() {
            return Err(AnalysisError::InvalidConfig(format!(
                "timeline.horizon must be finite, got {}",
                timeline.horizon
            )));
        }
        if timeline.horizon / timeline.step > MAX_TIMELINE_ROWS as f64 {
            return Err(AnalysisError::InvalidConfig(format!(
                "timeline.horizon / timeline.step must be at most {} rows, got {} / {}",
                MAX_TIMELINE_ROWS, timeline.horizon, timeline.step
            )));
        }
        Ok(())
    }
}
