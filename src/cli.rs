use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::db::TransportMode;

#[derive(Parser)]
#[command(name = "tripglobe")]
#[command(about = "Find trips in a location-history export and play them back on a globe", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the database and settings
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Reference city dataset (JSON array of {name, lat, lon, population})
    #[arg(long, global = true)]
    pub cities: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a timeline export, replacing the stored segment log
    Import {
        /// Export file with a `semanticSegments` array
        file: PathBuf,
    },

    /// Classify the stored segments into trips
    Classify,

    /// List stored trips
    Trips {
        /// Only list trips of this mode
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<TransportMode>,
    },

    /// Play back stored trips in time order
    Play(PlayArgs),

    /// Import, classify and play in one go
    Run {
        file: PathBuf,

        #[command(flatten)]
        play: PlayArgs,
    },

    /// Inspect or change the per-mode trip thresholds
    Thresholds {
        #[command(subcommand)]
        action: ThresholdAction,
    },

    /// Inspect or change the saved reference city dataset
    Cities {
        #[command(subcommand)]
        action: CitiesAction,
    },
}

#[derive(Subcommand)]
pub enum CitiesAction {
    /// Print the dataset in use and where settings are stored
    Show,

    /// Remember a dataset path for later runs
    Set {
        /// JSON array of {name, lat, lon, population}
        path: PathBuf,
    },

    /// Forget the saved path and fall back to `<data dir>/cities.json`
    Clear,
}

#[derive(Args, Clone)]
pub struct PlayArgs {
    /// Only play trips that started in this year (defaults to the current year)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Write render commands to stdout as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Random seed for reproducible camera jitter
    #[arg(short, long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum ThresholdAction {
    /// Print the active thresholds
    Show,

    /// Set the minimum distance and duration for one mode
    Set {
        /// Mode tag, e.g. FLYING or IN_TRAIN
        #[arg(value_parser = parse_mode)]
        mode: TransportMode,

        /// Minimum distance in miles
        miles: f64,

        /// Minimum duration in minutes
        minutes: f64,
    },

    /// Remove the threshold for one mode so it never counts as a trip
    Unset {
        #[arg(value_parser = parse_mode)]
        mode: TransportMode,
    },

    /// Restore the default thresholds
    Reset,
}

fn parse_mode(value: &str) -> Result<TransportMode, String> {
    match TransportMode::from_tag(&value.to_ascii_uppercase()) {
        TransportMode::Unrecognized => Err(format!("unknown transport mode '{value}'")),
        mode => Ok(mode),
    }
}
