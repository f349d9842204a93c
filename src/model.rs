//! Dataset document: places, categories and districts.
//!
//! A [`Dataset`] is built once from the JSON document, validated, sorted and
//! then shared read-only. Places carry no identifier of their own; after
//! sorting they are addressed by [`PlaceId`], their index in
//! [`Dataset::places`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DataLoadError;
use crate::text::{Translations, sort_by_name_ignore_case};

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Index of a place in the sorted place list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceId(pub usize);

/// A point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub categories: Vec<String>,
    pub district: String,
    #[serde(default)]
    pub certified: bool,
}

impl Place {
    pub fn has_category(&self, id: &str) -> bool {
        self.categories.iter().any(|c| c == id)
    }
}

/// A category with a per-language name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: Translations,
}

/// A district with a single display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: String,
    pub name: String,
}

/// The complete dataset document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub districts: Vec<District>,
}

impl Dataset {
    /// Parse, validate and sort a dataset document.
    pub fn from_json(text: &str) -> Result<Self, DataLoadError> {
        let dataset: Dataset = serde_json::from_str(text)?;
        dataset.prepare()
    }

    /// Validate references and sort places and districts by name.
    pub fn prepare(mut self) -> Result<Self, DataLoadError> {
        self.validate()?;
        sort_by_name_ignore_case(&mut self.places, |p| &p.name);
        sort_by_name_ignore_case(&mut self.districts, |d| &d.name);
        log::info!(
            "dataset ready: {} places, {} categories, {} districts",
            self.places.len(),
            self.categories.len(),
            self.districts.len()
        );
        Ok(self)
    }

    /// Check id uniqueness and that every place references known entries.
    pub fn validate(&self) -> Result<(), DataLoadError> {
        let mut categories = HashSet::new();
        for category in &self.categories {
            if !categories.insert(category.id.as_str()) {
                return Err(DataLoadError::DuplicateId {
                    kind: "category",
                    id: category.id.clone(),
                });
            }
        }

        let mut districts = HashSet::new();
        for district in &self.districts {
            if !districts.insert(district.id.as_str()) {
                return Err(DataLoadError::DuplicateId {
                    kind: "district",
                    id: district.id.clone(),
                });
            }
        }

        for place in &self.places {
            if let Some(missing) = place
                .categories
                .iter()
                .find(|c| !categories.contains(c.as_str()))
            {
                return Err(DataLoadError::UnknownCategory {
                    place: place.name.clone(),
                    category: missing.clone(),
                });
            }
            if !districts.contains(place.district.as_str()) {
                return Err(DataLoadError::UnknownDistrict {
                    place: place.name.clone(),
                    district: place.district.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.places.get(id.0)
    }

    pub fn place_ids(&self) -> impl Iterator<Item = PlaceId> + '_ {
        (0..self.places.len()).map(PlaceId)
    }

    pub fn has_category(&self, id: &str) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    pub fn has_district(&self, id: &str) -> bool {
        self.districts.iter().any(|d| d.id == id)
    }

    pub fn district(&self, id: &str) -> Option<&District> {
        self.districts.iter().find(|d| d.id == id)
    }
}
