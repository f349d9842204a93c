//! Application configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::model::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the dataset document is fetched from.
    pub dataset_url: String,
    /// Display language code.
    pub language: String,
    /// Language used when a value has no entry for `language`.
    pub fallback_language: String,
    pub map: MapOptions,
    pub icons: MarkerIcons,
    /// Root-relative path of the offline worker script.
    pub service_worker: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_url: "/data.json".to_string(),
            language: "pt".to_string(),
            fallback_language: "pt".to_string(),
            map: MapOptions::default(),
            icons: MarkerIcons::default(),
            service_worker: "/sw.js".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Initial map region and widget options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub container_id: String,
    pub center: Position,
    pub zoom: u8,
    pub street_view: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            center: Position::new(40.0, -8.0),
            zoom: 7,
            street_view: false,
        }
    }
}

/// Marker icon URLs, one per certification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerIcons {
    pub certified: String,
    pub standard: String,
}

impl Default for MarkerIcons {
    fn default() -> Self {
        Self {
            certified: "/assets/img/pin-green.svg".to_string(),
            standard: "/assets/img/pin-black.svg".to_string(),
        }
    }
}
