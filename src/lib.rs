pub mod cities;
pub mod classification;
mod cli;
pub mod db;
pub mod geo;
pub mod pipeline;
pub mod playback;
pub mod settings;
pub mod status;
pub mod utils;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use log::{info, warn};

use cities::CityIndex;
use cli::{CitiesAction, Cli, Commands, PlayArgs, ThresholdAction};
use db::{models::ModeThreshold, Database, TransportMode};
use playback::{JsonLinesSink, LogSink, PlaybackController, PlaybackState, RenderSink};
use settings::SettingsStore;
use status::LogReporter;

/// Everything a command needs, built once per invocation.
pub struct AppState {
    pub db: Database,
    pub cities: Arc<CityIndex>,
    pub settings: SettingsStore,
}

impl AppState {
    /// Open the database and settings under `data_dir` and load the city
    /// dataset. A missing dataset leaves every city unresolved.
    pub fn open(data_dir: &Path, cities_override: Option<PathBuf>) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;

        let settings = SettingsStore::new(data_dir.join("settings.json"))?;
        let db = Database::new(data_dir.join("tripglobe.sqlite3"))?;

        let cities_path = cities_override
            .or_else(|| settings.cities_path())
            .unwrap_or_else(|| data_dir.join("cities.json"));
        let cities = CityIndex::load(&cities_path);
        if cities.is_empty() {
            warn!(
                "No reference cities loaded from {}; trips will show \"{}\"",
                cities_path.display(),
                cities::UNKNOWN_LOCATION
            );
        } else {
            info!("Loaded {} reference cities", cities.len());
        }

        Ok(Self {
            db,
            cities: Arc::new(cities),
            settings,
        })
    }
}

pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .context("could not determine the platform data directory")?
            .join("tripglobe"),
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(async move {
        let state = AppState::open(&data_dir, cli.cities)?;
        dispatch(&state, cli.command).await
    })
}

async fn dispatch(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Import { file } => import(state, &file).await,
        Commands::Classify => classify(state).await,
        Commands::Trips { mode } => print_trips(state, mode).await,
        Commands::Play(args) => play(state, &args).await,
        Commands::Run { file, play: args } => {
            import(state, &file).await?;
            classify(state).await?;
            play(state, &args).await
        }
        Commands::Thresholds { action } => thresholds(state, action),
        Commands::Cities { action } => cities_setting(state, action),
    }
}

async fn import(state: &AppState, file: &Path) -> Result<()> {
    let export = pipeline::read_export(file)?;
    pipeline::import_timeline(&state.db, export, Arc::new(LogReporter)).await?;
    Ok(())
}

async fn classify(state: &AppState) -> Result<()> {
    if state.db.count_timeline_segments().await? == 0 {
        warn!("No timeline stored in {}; run `tripglobe import` first", state.db.path().display());
    }

    let config = state.settings.trip_config();
    let trips = pipeline::find_trips(&state.db, &state.cities, &config, &LogReporter).await?;
    info!("Classification finished: {} trips", trips.len());
    Ok(())
}

async fn print_trips(state: &AppState, mode: Option<TransportMode>) -> Result<()> {
    let trips = match mode {
        Some(mode) => state.db.list_trips_by_mode(mode).await?,
        None => state.db.list_trips().await?,
    };
    if trips.is_empty() {
        println!("No trips stored. Run `tripglobe classify` first.");
        return Ok(());
    }

    for trip in &trips {
        println!(
            "{}  {:<20}  {:>8.1} mi  {} -> {}",
            trip.start_time.format("%Y-%m-%d %H:%M"),
            trip.mode,
            geo::meters_to_miles(trip.distance_meters),
            trip.start_city,
            trip.end_city
        );
    }
    Ok(())
}

async fn play(state: &AppState, args: &PlayArgs) -> Result<()> {
    let year = args.year.unwrap_or_else(|| Local::now().year());
    let trips = pipeline::load_playable_trips(&state.db, year).await?;

    let sink: Arc<dyn RenderSink> = if args.json {
        Arc::new(JsonLinesSink::new(std::io::stdout()))
    } else {
        Arc::new(LogSink)
    };
    let mut controller = PlaybackController::new(sink);
    if let Some(seed) = args.seed {
        controller = controller.with_seed(seed);
    }

    controller.start_playback(trips).await?;
    let finished = wait_or_interrupt(&controller).await?;
    info!(
        "Playback {:?} after {} of {} trips",
        finished.status,
        finished.step.map_or(0, |step| step + 1),
        finished.total_steps
    );
    Ok(())
}

async fn wait_or_interrupt(controller: &PlaybackController) -> Result<PlaybackState> {
    tokio::select! {
        state = controller.wait() => Ok(state),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            info!("Interrupted, stopping playback");
            controller.stop_playback().await
        }
    }
}

fn thresholds(state: &AppState, action: ThresholdAction) -> Result<()> {
    match action {
        ThresholdAction::Show => {}
        ThresholdAction::Set {
            mode,
            miles,
            minutes,
        } => {
            state
                .settings
                .set_threshold(mode, ModeThreshold::new(miles, minutes))?;
            info!("{mode} now needs {miles} mi and {minutes} min");
        }
        ThresholdAction::Unset { mode } => {
            state.settings.remove_threshold(mode)?;
            info!("{mode} segments will no longer count as trips");
        }
        ThresholdAction::Reset => {
            state.settings.reset_thresholds()?;
            info!("Thresholds reset to defaults");
        }
    }

    let config = state.settings.trip_config();
    for mode in TransportMode::KNOWN {
        match config.threshold(mode) {
            Some(threshold) => println!(
                "{:<22} {:>8} mi {:>8} min",
                mode.as_str(),
                threshold.distance,
                threshold.duration
            ),
            None => println!("{:<22} {:>8}", mode.as_str(), "ignored"),
        }
    }
    Ok(())
}

fn cities_setting(state: &AppState, action: CitiesAction) -> Result<()> {
    match action {
        CitiesAction::Show => {}
        CitiesAction::Set { path } => {
            if CityIndex::load(&path).is_empty() {
                warn!("{} holds no usable city records", path.display());
            }
            state.settings.set_cities_path(Some(path))?;
        }
        CitiesAction::Clear => state.settings.set_cities_path(None)?,
    }

    match state.settings.cities_path() {
        Some(path) => println!("City dataset: {}", path.display()),
        None => println!("City dataset: default (<data dir>/cities.json)"),
    }
    println!("Cities loaded this run: {}", state.cities.len());
    println!("Settings file: {}", state.settings.path().display());
    Ok(())
}
