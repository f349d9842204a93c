//! Error types, one per concern.
//!
//! None of these are fatal to the page: each is surfaced locally (a banner,
//! a degraded map, a silent control reset or an in-memory fallback).

use thiserror::Error;

/// The dataset document could not be fetched, parsed or validated.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to fetch dataset: {0}")]
    Fetch(String),

    #[error("dataset request returned HTTP {0}")]
    Status(u16),

    #[error("malformed dataset document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("place '{place}' references unknown category '{category}'")]
    UnknownCategory { place: String, category: String },

    #[error("place '{place}' references unknown district '{district}'")]
    UnknownDistrict { place: String, district: String },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
}

/// The mapping SDK failed to load or initialize.
#[derive(Debug, Error)]
pub enum MapInitError {
    #[error("map SDK is not available")]
    SdkUnavailable,

    #[error("map container '#{0}' not found")]
    MissingContainer(String),

    #[error("map SDK error: {0}")]
    Js(String),
}

/// A position request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("position request timed out")]
    Timeout,

    #[error("geolocation is not supported")]
    Unsupported,
}

impl GeolocationError {
    /// Map a `GeolocationPositionError.code` to an error.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationError::PermissionDenied,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::PositionUnavailable,
        }
    }
}

/// The key-value store could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("storage error: {0}")]
    Backend(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_message_names_place_and_id() {
        let err = DataLoadError::UnknownCategory {
            place: "Cafe Central".to_string(),
            category: "bar".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "place 'Cafe Central' references unknown category 'bar'"
        );
    }

    #[test]
    fn test_geolocation_codes() {
        assert_eq!(
            GeolocationError::from_code(1),
            GeolocationError::PermissionDenied
        );
        assert_eq!(
            GeolocationError::from_code(2),
            GeolocationError::PositionUnavailable
        );
        assert_eq!(GeolocationError::from_code(3), GeolocationError::Timeout);
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: DataLoadError = parse.into();
        assert!(matches!(err, DataLoadError::Parse(_)));
    }
}
