use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::{LoadError, Location, WeatherPipeline, WeatherSnapshot};

/// What the weather panel shows: the newest complete snapshot, or why there is none.
pub type WeatherView = Result<Arc<WeatherSnapshot>, LoadError>;

/// Background refresher. Owns the only writer of the published view.
pub struct WeatherFeed {
    reader: WeatherReader,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl WeatherFeed {
    /// Publishes whatever the store already holds, then refreshes right away
    /// and again every `interval` on a spawned task.
    pub async fn start(pipeline: WeatherPipeline, location: Location, interval: Duration) -> Self {
        let initial = pipeline.load().await.map(Arc::new);
        match &initial {
            Ok(snapshot) => info!(
                "Serving cached weather from {}",
                snapshot.fetched_at.to_rfc3339()
            ),
            Err(LoadError::NoDataYet) => info!("No cached weather yet"),
            Err(err) => warn!("Cached weather unavailable: {err}"),
        }

        let (view_tx, view_rx) = watch::channel(initial);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(refresh_loop(
            pipeline,
            location,
            interval,
            view_tx,
            cancel_token.clone(),
        ));

        Self {
            reader: WeatherReader::new(view_rx),
            cancel_token,
            handle: Some(handle),
        }
    }

    pub fn reader(&self) -> WeatherReader {
        self.reader.clone()
    }

    pub async fn stop(mut self) -> Result<()> {
        self.cancel_token.cancel();

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("weather refresh task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Drop for WeatherFeed {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Read side of the feed. Cheap to clone; every read sees one whole snapshot.
#[derive(Clone)]
pub struct WeatherReader {
    view_rx: watch::Receiver<WeatherView>,
}

impl WeatherReader {
    pub(crate) fn new(view_rx: watch::Receiver<WeatherView>) -> Self {
        Self { view_rx }
    }

    pub fn current(&self) -> WeatherView {
        self.view_rx.borrow().clone()
    }

    /// Waits for the next published view. Returns `false` once the feed is gone.
    pub async fn changed(&mut self) -> bool {
        self.view_rx.changed().await.is_ok()
    }
}

async fn refresh_loop(
    pipeline: WeatherPipeline,
    location: Location,
    interval: Duration,
    view_tx: watch::Sender<WeatherView>,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    result = pipeline.refresh(location, Utc::now()) => match result {
                        Ok(snapshot) => {
                            let _previous = view_tx.send_replace(Ok(Arc::new(snapshot)));
                        }
                        Err(err) => {
                            error!("Weather refresh failed, keeping previous data: {err}");
                        }
                    },
                }
            }
        }
    }

    info!("Weather refresh task stopped");
}
