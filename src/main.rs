//! practice - score a sung or played performance against sheet music
//!
//! Subcommands:
//! - `practice segment` - split a pitch track into notes
//! - `practice score` - rank measures worst first
//! - `practice timeline` - expected vs performed pitch on a fixed time grid
//! - `practice deform` - perturb a performance for testing the scorer

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use practice_rs::config::AnalysisConfig;
use practice_rs::error::AnalysisError;
use practice_rs::parser::performance::parse_performance;
use practice_rs::pipeline::{self, AnalysisRequest, PerformanceSource};
use practice_rs::pitch::ingest::{parse_pitch_track, PitchInputMode};
use practice_rs::pitch::segment::NoteSegmenter;
use practice_rs::scoring::report::{format_ranking, format_segments, format_timeline};
use practice_rs::scoring::types::{Pitch, TrackSelector};
use practice_rs::synth::deform_seeded;

#[derive(Parser)]
#[command(name = "practice")]
#[command(about = "Find the measures of a performance that need the most practice")]
#[command(version)]
struct Cli {
    /// TOML file with segmentation, alignment and timeline settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a pitch track into notes
    Segment {
        /// Pitch track file
        #[arg(short, long)]
        input: PathBuf,

        /// Column layout: hz or midi-delta
        #[arg(short, long, default_value = "hz")]
        mode: PitchInputMode,

        /// Keep a note that is still held when the track ends
        #[arg(long)]
        flush_trailing: bool,

        #[arg(long)]
        json: bool,
    },

    /// Rank measures by duration and pitch error
    Score {
        #[command(flatten)]
        inputs: Inputs,

        /// Seconds of expected duration allowed to go unmatched
        #[arg(long)]
        tolerance: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Print expected and performed pitch side by side over time
    Timeline {
        #[command(flatten)]
        inputs: Inputs,

        /// Seconds between rows
        #[arg(long)]
        step: Option<f64>,

        /// Stop before this many seconds
        #[arg(long)]
        horizon: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Randomly perturb a performance's pitches and durations
    Deform {
        /// Performance file (`<pitch> <duration>` lines)
        #[arg(short, long)]
        performance: PathBuf,

        #[arg(short, long, default_value = "0")]
        seed: u64,
    },
}

#[derive(Args)]
struct Inputs {
    /// Sheet music file
    #[arg(long)]
    sheet: PathBuf,

    /// Performance file (`<pitch> <duration>` lines)
    #[arg(long, conflicts_with = "pitch_track", required_unless_present = "pitch_track")]
    performance: Option<PathBuf>,

    /// Pitch track to segment into a performance
    #[arg(long)]
    pitch_track: Option<PathBuf>,

    /// Column layout of --pitch-track: hz or midi-delta
    #[arg(long, default_value = "hz")]
    mode: PitchInputMode,

    /// Track name from a `Track: <name>` line
    #[arg(long, conflicts_with = "track_index")]
    track: Option<String>,

    /// Zero-based track position
    #[arg(long, default_value = "0")]
    track_index: usize,

    /// Perturb the performance with this seed before scoring
    #[arg(long)]
    deform_seed: Option<u64>,
}

impl Inputs {
    fn selector(&self) -> TrackSelector {
        match &self.track {
            Some(name) => TrackSelector::Name(name.clone()),
            None => TrackSelector::Index(self.track_index),
        }
    }
}

/// Input files read into memory so the request can borrow them.
struct LoadedInputs {
    sheet: String,
    performance: String,
    from_pitch_track: bool,
}

impl LoadedInputs {
    fn read(inputs: &Inputs) -> Result<Self, AnalysisError> {
        let sheet = pipeline::read_input(&inputs.sheet)?;
        let (path, from_pitch_track) = match (&inputs.performance, &inputs.pitch_track) {
            (Some(path), _) => (path, false),
            (None, Some(path)) => (path, true),
            (None, None) => {
                return Err(AnalysisError::InvalidConfig(
                    "one of --performance or --pitch-track is required".to_string(),
                ))
            }
        };
        Ok(LoadedInputs {
            sheet,
            performance: pipeline::read_input(path)?,
            from_pitch_track,
        })
    }

    fn request<'a>(&'a self, inputs: &Inputs) -> AnalysisRequest<'a> {
        let performance = if self.from_pitch_track {
            PerformanceSource::PitchTrack {
                text: &self.performance,
                mode: inputs.mode,
            }
        } else {
            PerformanceSource::Notes(&self.performance)
        };
        AnalysisRequest {
            sheet_music: &self.sheet,
            track: inputs.selector(),
            performance,
            deform_seed: inputs.deform_seed,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, AnalysisError> {
    match path {
        Some(path) => {
            let config = AnalysisConfig::load(path)?;
            info!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AnalysisError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), AnalysisError> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Segment {
            input,
            mode,
            flush_trailing,
            json,
        } => {
            if flush_trailing {
                config.segmentation.flush_trailing_run = true;
            }
            let text = pipeline::read_input(&input)?;
            let samples = parse_pitch_track(&text, mode)?;
            let notes = NoteSegmenter::new(&config.segmentation)?.segment(&samples);
            info!(notes = notes.len(), "segmented {}", input.display());
            if json {
                print_json(&notes)?;
            } else {
                print!("{}", format_segments(&notes));
            }
        }
        Commands::Score {
            inputs,
            tolerance,
            json,
        } => {
            if let Some(tolerance) = tolerance {
                config.alignment.duration_tolerance = tolerance;
            }
            let loaded = LoadedInputs::read(&inputs)?;
            let analysis = pipeline::analyze(&loaded.request(&inputs), &config)?;
            if json {
                print_json(&analysis.ranking)?;
            } else {
                print!("{}", format_ranking(&analysis.ranking));
            }
        }
        Commands::Timeline {
            inputs,
            step,
            horizon,
            json,
        } => {
            if let Some(step) = step {
                config.timeline.step = step;
            }
            if let Some(horizon) = horizon {
                config.timeline.horizon = horizon;
            }
            let loaded = LoadedInputs::read(&inputs)?;
            let analysis = pipeline::analyze(&loaded.request(&inputs), &config)?;
            let rows = analysis.timeline(&config.timeline);
            if json {
                print_json(&rows)?;
            } else {
                print!("{}", format_timeline(&rows));
            }
        }
        Commands::Deform { performance, seed } => {
            let text = pipeline::read_input(&performance)?;
            let events = deform_seeded(&parse_performance(&text)?, seed);
            for event in &events {
                let pitch = match event.pitch {
                    Pitch::Midi(midi) => midi,
                    Pitch::Rest => -1,
                };
                println!("{} {}", pitch, event.duration);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
