use thiserror::Error;

/// Why a refresh cycle was abandoned. The store is untouched in every case.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("{resource} response did not match the expected shape: {reason}")]
    Schema {
        resource: &'static str,
        reason: String,
    },
    #[error("weather store write failed: {0}")]
    Store(String),
}

impl WeatherError {
    pub fn network(url: &str, reason: impl ToString) -> Self {
        WeatherError::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(resource: &'static str, reason: impl ToString) -> Self {
        WeatherError::Schema {
            resource,
            reason: reason.to_string(),
        }
    }
}

/// Why the cache could not produce a snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("no weather data cached yet")]
    NoDataYet,
    #[error("cached weather data is corrupt: {0}")]
    CorruptCache(String),
    #[error("weather store read failed: {0}")]
    Store(String),
}
