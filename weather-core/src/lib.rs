//! Core library for the weather data backend.
//!
//! This crate defines:
//! - Request validation into a typed [`WeatherQuery`]
//! - The historical weather provider client
//! - Deterministic artifact naming
//! - Artifact storage over a cloud bucket or an in-memory store
//!
//! It is used by `weather-server`, but has no dependency on the HTTP layer.

pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod provider;
pub mod storage;
pub mod validate;

pub use config::{Config, StorageBackend};
pub use error::{StorageError, UpstreamError, ValidationError};
pub use model::{ArtifactKey, ArtifactMetadata, WeatherArtifact, WeatherQuery};
pub use naming::{ARTIFACT_PREFIX, artifact_key};
pub use provider::{OpenMeteoProvider, WeatherProvider, provider_from_config};
pub use storage::{ArtifactStore, CloudStore, MemoryStore, store_from_config};
