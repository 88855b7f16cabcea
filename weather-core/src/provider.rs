use crate::{Config, WeatherArtifact, WeatherQuery, error::UpstreamError};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

pub use open_meteo::OpenMeteoProvider;

/// Daily variables requested for every query.
pub const DAILY_VARIABLES: [&str; 6] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "temperature_2m_mean",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "apparent_temperature_mean",
];

/// A source of historical weather.
///
/// One call is one outbound request; implementations do not retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_daily(&self, query: &WeatherQuery) -> Result<WeatherArtifact, UpstreamError>;
}

/// Construct the configured provider.
pub fn provider_from_config(config: &Config) -> Result<OpenMeteoProvider, UpstreamError> {
    OpenMeteoProvider::new(&config.upstream)
}
