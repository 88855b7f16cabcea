use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Value, value::RawValue};
use tracing::info;
use weather_core::{
    ARTIFACT_PREFIX, ArtifactKey, ArtifactMetadata, StorageError, ValidationError, WeatherQuery,
};

use crate::{AppState, error::ApiError};

pub const SERVICE_NAME: &str = "weather-data-backend";

/// Coordinates echoed as the client sent them (`52` stays `52`).
#[derive(Debug, Serialize)]
pub struct Location {
    pub latitude: Value,
    pub longitude: Value,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct StoredResponse {
    pub message: &'static str,
    pub filename: ArtifactKey,
    pub location: Location,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct FileList {
    pub files: Vec<ArtifactMetadata>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct FileContent {
    pub filename: ArtifactKey,
    /// Stored document, passed through without re-encoding.
    pub data: Box<RawValue>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub service: &'static str,
}

#[tracing::instrument(skip(state, body))]
pub async fn store_weather_data(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let body: Value = serde_json::from_slice(&body).map_err(|_| ValidationError::NotJson)?;
    let query = WeatherQuery::from_json(&body)?;

    let artifact = state.provider.fetch_daily(&query).await?;

    let key = query.artifact_key(Utc::now());
    let size = artifact.len();
    state.store.put(&key, artifact.into_bytes()).await?;

    info!(%key, size, "stored weather data");

    Ok(HttpResponse::Created().json(StoredResponse {
        message: "Weather data stored successfully",
        filename: key,
        location: Location {
            latitude: body["latitude"].clone(),
            longitude: body["longitude"].clone(),
        },
        date_range: DateRange { start_date: query.start_date, end_date: query.end_date },
    }))
}

#[tracing::instrument(skip(state))]
pub async fn list_weather_files(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let files = state.store.list(Some(ARTIFACT_PREFIX)).await?;

    Ok(HttpResponse::Ok().json(FileList { count: files.len(), files }))
}

#[tracing::instrument(skip(state))]
pub async fn weather_file_content(
    state: web::Data<AppState>,
    filename: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let key = ArtifactKey::new(filename.into_inner());
    // Only artifacts are served; other objects in the bucket stay hidden as in the listing.
    if !key.as_str().starts_with(ARTIFACT_PREFIX) {
        return Err(StorageError::NotFound(key.into_string()).into());
    }
    let body = state.store.get(&key).await?;

    let data = String::from_utf8(body.to_vec())
        .ok()
        .and_then(|s| RawValue::from_string(s).ok())
        .ok_or_else(|| StorageError::InvalidContent(key.to_string()))?;

    Ok(HttpResponse::Ok().json(FileContent { filename: key, data }))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(Health { status: "ok", timestamp: Utc::now(), service: SERVICE_NAME })
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::RouteNotFound)
}

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}
