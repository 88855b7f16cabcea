use thiserror::Error;

/// A request body that cannot be turned into a [`WeatherQuery`](crate::WeatherQuery).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Request must be a JSON object")]
    NotJson,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid type for field: {0}")]
    InvalidType(&'static str),

    #[error("latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),

    #[error("invalid date format for {0}. Use YYYY-MM-DD")]
    InvalidDate(&'static str),

    #[error("start_date must be before or equal to end_date")]
    StartAfterEnd,
}

impl ValidationError {
    /// Name of the request field at fault, if the error concerns a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotJson | ValidationError::StartAfterEnd => None,
            ValidationError::MissingField(f)
            | ValidationError::InvalidType(f)
            | ValidationError::InvalidDate(f) => Some(f),
            ValidationError::LatitudeOutOfRange(_) => Some("latitude"),
            ValidationError::LongitudeOutOfRange(_) => Some("longitude"),
        }
    }
}

/// Failure talking to the weather provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("weather provider unreachable: {0}")]
    Network(#[source] reqwest::Error),

    #[error("weather provider returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("weather provider returned malformed JSON: {0}")]
    Parse(String),
}

impl UpstreamError {
    pub fn kind(&self) -> String {
        match self {
            UpstreamError::Network(_) => "network".to_string(),
            UpstreamError::Http { status, .. } => format!("http_{status}"),
            UpstreamError::Parse(_) => "parse".to_string(),
        }
    }
}

/// Failure in the blob store backing the artifacts.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("failed to list objects: {0}")]
    List(#[source] object_store::Error),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("object {0} does not contain valid JSON")]
    InvalidContent(String),

    #[error("failed to initialise storage backend: {0}")]
    Backend(#[source] object_store::Error),
}

impl StorageError {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Write { .. } => "write",
            StorageError::List(_) => "list",
            StorageError::NotFound(_) => "not_found",
            StorageError::Read { .. } => "read",
            StorageError::InvalidContent(_) => "invalid_content",
            StorageError::Backend(_) => "backend",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_names_the_field() {
        let err = ValidationError::MissingField("end_date");
        assert_eq!(err.to_string(), "missing field: end_date");
        assert_eq!(err.field(), Some("end_date"));
    }

    #[test]
    fn upstream_kind_includes_status() {
        let err = UpstreamError::Http { status: 503, body: String::new() };
        assert_eq!(err.kind(), "http_503");
        assert_eq!(UpstreamError::Parse("eof".into()).kind(), "parse");
    }

    #[test]
    fn storage_not_found_is_distinguished() {
        let err = StorageError::NotFound("weather_data_x.json".into());
        assert!(err.is_not_found());
        assert_eq!(err.kind(), "not_found");

        let err = StorageError::InvalidContent("weather_data_x.json".into());
        assert!(!err.is_not_found());
    }
}
