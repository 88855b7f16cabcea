use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    model::{ArtifactKey, WeatherQuery},
    validate::DATE_FORMAT,
};

/// Every key produced by [`artifact_key`] starts with this.
pub const ARTIFACT_PREFIX: &str = "weather_data_";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Derive the storage key for an artifact.
///
/// `weather_data_lat{lat}_lon{lon}_{start}_to_{end}_{YYYYMMDD_HHMMSS}.json`
///
/// Coordinates use the shortest round-tripping decimal form (`52.52`,
/// `13.405`, `-7`). The timestamp has second granularity, so two identical
/// requests inside the same second produce the same key.
pub fn artifact_key(
    latitude: f64,
    longitude: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    now: DateTime<Utc>,
) -> ArtifactKey {
    ArtifactKey::new(format!(
        "{ARTIFACT_PREFIX}lat{latitude}_lon{longitude}_{}_to_{}_{}.json",
        start_date.format(DATE_FORMAT),
        end_date.format(DATE_FORMAT),
        now.format(TIMESTAMP_FORMAT),
    ))
}

impl WeatherQuery {
    pub fn artifact_key(&self, now: DateTime<Utc>) -> ArtifactKey {
        artifact_key(self.latitude, self.longitude, self.start_date, self.end_date, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_reference_example() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let key = artifact_key(52.52, 13.405, date(2023, 1, 1), date(2023, 1, 31), now);
        assert_eq!(
            key.as_str(),
            "weather_data_lat52.52_lon13.405_2023-01-01_to_2023-01-31_20240305_070809.json"
        );
    }

    #[test]
    fn trims_trailing_zeros_and_keeps_sign() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let key = artifact_key(-33.0, 151.20, date(2020, 2, 29), date(2020, 3, 1), now);
        assert_eq!(
            key.as_str(),
            "weather_data_lat-33_lon151.2_2020-02-29_to_2020-03-01_20241231_235959.json"
        );
    }

    #[test]
    fn same_inputs_same_key() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = artifact_key(1.5, 2.5, date(2023, 5, 1), date(2023, 5, 2), now);
        let b = artifact_key(1.5, 2.5, date(2023, 5, 1), date(2023, 5, 2), now);
        assert_eq!(a, b);

        let later = now + chrono::Duration::seconds(1);
        let c = artifact_key(1.5, 2.5, date(2023, 5, 1), date(2023, 5, 2), later);
        assert_ne!(a, c);
    }

    #[test]
    fn keys_carry_the_listing_prefix() {
        let key = artifact_key(0.0, 0.0, date(2023, 1, 1), date(2023, 1, 1), Utc::now());
        assert!(key.as_str().starts_with(ARTIFACT_PREFIX));
        assert!(key.as_str().ends_with(".json"));
    }
}
