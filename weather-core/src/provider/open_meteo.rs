use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    config::UpstreamConfig,
    error::UpstreamError,
    model::{WeatherArtifact, WeatherQuery},
    validate::DATE_FORMAT,
};

use super::{DAILY_VARIABLES, WeatherProvider};

/// Client for the Open-Meteo historical archive API.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(UpstreamError::Network)?;

        Ok(Self { base_url: config.base_url.clone(), http })
    }

    fn query_params(query: &WeatherQuery) -> [(&'static str, String); 5] {
        [
            ("latitude", query.latitude.to_string()),
            ("longitude", query.longitude.to_string()),
            ("start_date", query.start_date.format(DATE_FORMAT).to_string()),
            ("end_date", query.end_date.format(DATE_FORMAT).to_string()),
            ("daily", DAILY_VARIABLES.join(",")),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_daily(&self, query: &WeatherQuery) -> Result<WeatherArtifact, UpstreamError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&Self::query_params(query))
            .send()
            .await
            .map_err(|e| {
                warn!(timeout = e.is_timeout(), "weather provider request failed: {e}");
                UpstreamError::Network(e)
            })?;

        let status = res.status();
        let body = res.bytes().await.map_err(UpstreamError::Network)?;

        if !status.is_success() {
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body: truncate_body(&String::from_utf8_lossy(&body)),
            });
        }

        debug!(size = body.len(), "received weather data");

        WeatherArtifact::from_bytes(body).map_err(|e| UpstreamError::Parse(e.to_string()))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
