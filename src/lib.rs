pub mod db;
pub mod mode;
pub mod settings;
pub mod timer;
pub mod utils;
pub mod weather;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{self, MissedTickBehavior},
};

use db::Database;
use mode::{Flow, InputEvent, ModeController};
use settings::{data_dir, debug_enabled, SettingsStore};
use timer::Timer;
use utils::logging::init_logging;
use weather::{HttpForecastProvider, WeatherFeed, WeatherPipeline};

pub fn run() -> Result<()> {
    init_logging(debug_enabled());

    info!("Desk clock starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(run_display());
    // A pending stdin read would otherwise hold shutdown open.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run_display() -> Result<()> {
    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let settings_store = SettingsStore::new(data_dir.join("settings.json"))?;
    let settings = settings_store.get();
    settings.validate().context("invalid settings")?;
    if !settings_store.path().exists() {
        settings_store.persist(&settings)?;
    }

    // Without its store the display has nothing to fall back on.
    let database = Database::new(data_dir.join("weather.sqlite3"))
        .context("failed to open weather store")?;

    let provider = HttpForecastProvider::new(&settings.user_agent, settings.request_timeout())?;
    let pipeline = WeatherPipeline::new(
        database,
        Arc::new(provider),
        settings.points_base_url.clone(),
    );
    let feed = WeatherFeed::start(pipeline, settings.location, settings.refresh_interval()).await;

    let mut controller =
        ModeController::new(Timer::new(settings.timer_durations()?), feed.reader());

    info!(
        "Timer set to {}min work / {}min break; weather every {}min",
        settings.work_minutes, settings.break_minutes, settings.refresh_interval_minutes
    );
    println!("Enter: next panel | t: start/pause timer | r: reset timer | q: quit");

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = time::interval(settings.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = String::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = controller.tick(Utc::now()).to_string();
                if frame != last_frame {
                    println!("{frame}");
                    last_frame = frame;
                }
            }
            line = input.next_line() => match line {
                Ok(Some(line)) => match InputEvent::parse(&line) {
                    Some(event) => {
                        if controller.handle(event, Utc::now()) == Flow::Quit {
                            break;
                        }
                        last_frame.clear();
                    }
                    None => warn!("Ignoring unknown input {line:?}"),
                },
                Ok(None) => break,
                Err(err) => {
                    error!("Failed to read input: {err}");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Desk clock shutting down");
    feed.stop().await
}
