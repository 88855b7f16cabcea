//! HTTP layer of the weather data backend.
//!
//! Endpoints:
//! - `POST /store-weather-data` fetch from the provider and store as a blob
//! - `GET /list-weather-files`
//! - `GET /weather-file-content/{filename}`
//! - `GET /health`

use std::sync::Arc;
use weather_core::{ArtifactStore, WeatherProvider};

pub mod error;
pub mod routes;
pub mod startup;

/// Shared by every worker; immutable after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
    pub store: Arc<dyn ArtifactStore>,
}

impl AppState {
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<dyn ArtifactStore>) -> Self {
        Self { provider, store }
    }
}
