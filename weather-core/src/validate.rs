//! Turns an untrusted request body into a [`WeatherQuery`].

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{error::ValidationError, model::WeatherQuery};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED_FIELDS: [&str; 4] = ["latitude", "longitude", "start_date", "end_date"];

impl WeatherQuery {
    /// Validate a decoded JSON request body.
    ///
    /// Fields are checked in a fixed order: presence of all four, then
    /// coordinates, then date formats, then ordering.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let fields = body.as_object().ok_or(ValidationError::NotJson)?;

        if let Some(missing) = REQUIRED_FIELDS.into_iter().find(|f| !fields.contains_key(*f)) {
            return Err(ValidationError::MissingField(missing));
        }

        let latitude = number(fields, "latitude")?;
        let longitude = number(fields, "longitude")?;
        let start_date = date(fields, "start_date")?;
        let end_date = date(fields, "end_date")?;

        Self::new(latitude, longitude, start_date, end_date)
    }

    /// Build a query from already-typed values, enforcing the range and ordering rules.
    pub fn new(
        latitude: f64,
        longitude: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange(longitude));
        }
        if start_date > end_date {
            return Err(ValidationError::StartAfterEnd);
        }

        Ok(Self { latitude, longitude, start_date, end_date })
    }
}

fn number(fields: &Map<String, Value>, name: &'static str) -> Result<f64, ValidationError> {
    fields.get(name).and_then(Value::as_f64).ok_or(ValidationError::InvalidType(name))
}

fn date(fields: &Map<String, Value>, name: &'static str) -> Result<NaiveDate, ValidationError> {
    let raw = fields.get(name).and_then(Value::as_str).ok_or(ValidationError::InvalidDate(name))?;
    parse_date(raw).ok_or(ValidationError::InvalidDate(name))
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    // chrono accepts signs, padding and unpadded fields; the wire format does not.
    let bytes = raw.as_bytes();
    let digits = |range: &[u8]| range.iter().all(u8::is_ascii_digit);
    if bytes.len() != 10
        || bytes[4] != b'-'
        || bytes[7] != b'-'
        || !digits(&bytes[..4])
        || !digits(&bytes[5..7])
        || !digits(&bytes[8..])
    {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}
