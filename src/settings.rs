use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration as StdDuration,
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Duration;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{timer::TimerDurations, weather::Location};

pub const DEFAULT_POINTS_BASE_URL: &str = "https://api.weather.gov/points";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub location: Location,
    pub points_base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub refresh_interval_minutes: u64,
    pub work_minutes: u64,
    pub break_minutes: u64,
    pub tick_millis: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: Location::default(),
            points_base_url: DEFAULT_POINTS_BASE_URL.into(),
            user_agent: concat!("deskclock/", env!("CARGO_PKG_VERSION")).into(),
            request_timeout_secs: 15,
            refresh_interval_minutes: 35,
            work_minutes: 20,
            break_minutes: 5,
            tick_millis: 250,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("requestTimeoutSecs", self.request_timeout_secs),
            ("refreshIntervalMinutes", self.refresh_interval_minutes),
            ("workMinutes", self.work_minutes),
            ("breakMinutes", self.break_minutes),
            ("tickMillis", self.tick_millis),
        ] {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }
        // Keeps every minute count well inside chrono's range.
        for (name, value) in [
            ("workMinutes", self.work_minutes),
            ("breakMinutes", self.break_minutes),
            ("refreshIntervalMinutes", self.refresh_interval_minutes),
        ] {
            if value > 24 * 60 * 365 {
                bail!("{name} is unreasonably large ({value})");
            }
        }
        Ok(())
    }

    pub fn timer_durations(&self) -> Result<TimerDurations> {
        Ok(TimerDurations {
            work: minutes(self.work_minutes, "workMinutes")?,
            rest: minutes(self.break_minutes, "breakMinutes")?,
        })
    }

    pub fn refresh_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.refresh_interval_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.request_timeout_secs)
    }

    pub fn tick_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.tick_millis)
    }
}

fn minutes(value: u64, field: &str) -> Result<Duration> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_minutes)
        .ok_or_else(|| anyhow!("{field} value {value} is out of range"))
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    /// Loads settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Ignoring invalid settings in {}: {err}; using defaults",
                    path.display()
                );
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Settings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn persist(&self, data: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// Where settings and the weather cache live: `DESKCLOCK_HOME`, else
/// `$HOME/.local/share/deskclock`, else the working directory.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("DESKCLOCK_HOME") {
        return PathBuf::from(dir);
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local/share/deskclock"),
        None => PathBuf::from("."),
    }
}

pub fn debug_enabled() -> bool {
    std::env::var("DESKCLOCK_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_desk_display() {
        let settings = Settings::default();

        assert_eq!(settings.refresh_interval(), StdDuration::from_secs(35 * 60));
        assert_eq!(
            settings.timer_durations().unwrap(),
            TimerDurations {
                work: Duration::minutes(20),
                rest: Duration::minutes(5),
            }
        );
        assert_eq!(
            settings.location.points_url(&settings.points_base_url),
            "https://api.weather.gov/points/40.7483,-73.9856"
        );
        settings.validate().unwrap();
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"workMinutes": 25, "location": {"latitude": 51.5, "longitude": -0.12}}"#)
            .unwrap();

        let settings = SettingsStore::new(path).unwrap().get();

        assert_eq!(settings.work_minutes, 25);
        assert_eq!(settings.break_minutes, 5);
        assert_eq!(settings.location.latitude, 51.5);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::new(path).unwrap();

        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn persist_writes_a_file_the_next_start_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut changed = store.get();
        changed.break_minutes = 10;
        store.persist(&changed).unwrap();

        assert!(store.path().exists());
        assert_eq!(SettingsStore::new(path).unwrap().get(), changed);
    }

    #[test]
    fn rejects_zero_durations() {
        let mut zero_work = Settings::default();
        zero_work.work_minutes = 0;

        assert!(zero_work.validate().is_err());
    }
}
