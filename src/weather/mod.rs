mod error;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod provider;

pub use error::{LoadError, WeatherError};
pub use feed::{WeatherFeed, WeatherReader, WeatherView};
pub use models::{
    CurrentConditions, DailyPeriod, ForecastIcon, Location, WeatherSnapshot, DISPLAYED_PERIODS,
};
pub use pipeline::WeatherPipeline;
pub use provider::{ForecastProvider, HttpForecastProvider};
