//! # placemap
//!
//! Core of a small directory-and-map viewer for a catalog of places.
//!
//! ## Overview
//!
//! A dataset document lists places, their categories and districts. The
//! viewer shows them as a filterable list and as clustered map markers:
//! - **Loader**: parse, validate and sort the dataset ([`Dataset::from_json`])
//! - **View-state**: observable and computed cells ([`ViewState`])
//! - **Filters**: category, district and certification, combined by AND
//! - **Persistence**: filter selections survive reloads ([`KeyValueStore`])
//! - **Map**: a [`MapController`] drives any [`MapAdapter`] implementation
//! - **Install prompt**: single-use "add to home screen" token
//!
//! Nothing here touches a browser; the web crate supplies the adapters.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use placemap::{AppConfig, Dataset, MemoryStore, ViewState};
//!
//! let doc = r#"{
//!     "places": [
//!         {"name": "Tasca", "position": {"lat": 40.6, "lng": -8.6},
//!          "categories": ["food"], "district": "A", "certified": true},
//!         {"name": "Loja", "position": {"lat": 41.5, "lng": -8.4},
//!          "categories": ["shop"], "district": "B"}
//!     ],
//!     "categories": [{"id": "food", "name": {"pt": "Comida"}},
//!                    {"id": "shop", "name": {"pt": "Loja"}}],
//!     "districts": [{"id": "A", "name": "Aveiro"}, {"id": "B", "name": "Braga"}]
//! }"#;
//!
//! let state = ViewState::new(&AppConfig::default(), Rc::new(MemoryStore::new()));
//! state.finish_load(Dataset::from_json(doc));
//!
//! state.filters.district.set(Some("A".to_string()));
//! assert_eq!(state.visible_places.get().len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod geolocation;
pub mod install;
pub mod map;
pub mod model;
pub mod persistence;
pub mod reactive;
pub mod storage;
pub mod text;
pub mod view_state;

pub use config::{AppConfig, MapOptions, MarkerIcons};
pub use error::{DataLoadError, GeolocationError, MapInitError, PersistenceError};
pub use filters::{FilterSelection, Predicate};
pub use geolocation::{CenterControl, CenterControlState, Geolocator, PositionCallback};
pub use install::{DeferredPrompt, InstallOutcome, InstallPrompt, OutcomeCallback};
pub use map::{MapAdapter, MapController, MarkerIcon, MarkerSpec, PopupContent, Scheduler};
pub use model::{Category, Dataset, District, Place, PlaceId, Position};
pub use reactive::{Flag, Observable, SubscriptionId, WeakObservable, computed};
pub use storage::{FileStore, KeyValueStore, MemoryStore, ResilientStore};
pub use text::{Translations, compare_ignore_case, translate};
pub use view_state::{CategoryOption, FilterSet, Rect, ViewState, Viewport};
