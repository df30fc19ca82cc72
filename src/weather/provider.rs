use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};

use super::WeatherError;

/// Source of raw forecast documents, keyed by URL.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, WeatherError>;
}

pub struct HttpForecastProvider {
    client: Client,
}

impl HttpForecastProvider {
    /// `timeout` bounds each request end to end, so a hung provider surfaces
    /// as an ordinary network failure.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ForecastProvider for HttpForecastProvider {
    async fn fetch(&self, url: &str) -> Result<String, WeatherError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/geo+json")
            .send()
            .await
            .map_err(|e| WeatherError::network(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::network(url, e))?;
        if !status.is_success() {
            return Err(WeatherError::network(url, format!("HTTP {status}")));
        }

        Ok(body)
    }
}
