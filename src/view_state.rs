//! The reactive view-state behind the list and the map.
//!
//! Cells are created in dependency order:
//!
//! ```text
//! language, dataset ─┬─> category_values ─> categories_by_id
//!                    ├─> district_values
//! filters ───────────┴─> visible_places
//! ```
//!
//! so a change upstream recomputes each derived cell once, synchronously,
//! before `set` returns.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::AppConfig;
use crate::error::DataLoadError;
use crate::filters::FilterSelection;
use crate::model::{Dataset, District, Place, PlaceId};
use crate::persistence::{CATEGORY_KEY, CERTIFIED_KEY, DISTRICT_KEY, bind_to_storage};
use crate::reactive::{Flag, Observable, computed};
use crate::storage::KeyValueStore;
use crate::text::{Translations, sort_by_name_ignore_case, translate};

/// A category localized to the current language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
}

/// The three filter selections.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub category: Observable<Option<String>>,
    pub district: Observable<Option<String>>,
    pub certified: Observable<bool>,
}

impl FilterSet {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            category: self.category.get(),
            district: self.district.get(),
            certified_only: self.certified.get(),
        }
    }

    pub fn clear(&self) {
        self.category.set(None);
        self.district.set(None);
        self.certified.set(false);
    }
}

/// Bounding box of the map container relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
}

/// Scrolling surface hosting the map.
pub trait Viewport {
    fn page_y_offset(&self) -> f64;
    fn map_rect(&self) -> Option<Rect>;
    fn smooth_scroll_to(&self, top: f64);
}

pub struct ViewState {
    pub language: Observable<String>,
    fallback_language: String,
    pub dataset: Observable<Option<Rc<Dataset>>>,
    pub loaded: Flag,
    pub map_loaded: Flag,
    pub load_error: Observable<Option<String>>,
    pub map_error: Observable<Option<String>>,
    pub filters: FilterSet,
    pub category_values: Observable<Vec<CategoryOption>>,
    pub categories_by_id: Observable<BTreeMap<String, String>>,
    pub district_values: Observable<Vec<District>>,
    pub visible_places: Observable<Vec<PlaceId>>,
    pub selected_place: Observable<Option<PlaceId>>,
}

impl ViewState {
    /// Build the view-state and bind the filters to `store`.
    pub fn new(config: &AppConfig, store: Rc<dyn KeyValueStore>) -> Self {
        let language = Observable::new(config.language.clone());
        let fallback_language = config.fallback_language.clone();
        let dataset: Observable<Option<Rc<Dataset>>> = Observable::default();
        let loaded = Flag::new();
        let filters = FilterSet::default();

        let category_values = {
            let lang = language.downgrade();
            let data = dataset.downgrade();
            let fallback = fallback_language.clone();
            computed(&[&language, &dataset], move || {
                let lang = lang.get().filter(|l| !l.is_empty());
                let (Some(lang), Some(data)) = (lang, data.get().flatten()) else {
                    return Vec::new();
                };
                localized_categories(&data, &lang, &fallback)
            })
        };

        let categories_by_id = {
            let values = category_values.downgrade();
            computed(&[&category_values], move || {
                values
                    .get_or_default()
                    .into_iter()
                    .map(|c| (c.id, c.name))
                    .collect()
            })
        };

        let district_values = {
            let data = dataset.downgrade();
            computed(&[&dataset], move || {
                data.get()
                    .flatten()
                    .map(|d| d.districts.clone())
                    .unwrap_or_default()
            })
        };

        let visible_places = {
            let data = dataset.downgrade();
            let category = filters.category.downgrade();
            let district = filters.district.downgrade();
            let certified = filters.certified.downgrade();
            computed(
                &[
                    &dataset,
                    &filters.category,
                    &filters.district,
                    &filters.certified,
                ],
                move || {
                    let Some(data) = data.get().flatten() else {
                        return Vec::new();
                    };
                    FilterSelection {
                        category: category.get().flatten(),
                        district: district.get().flatten(),
                        certified_only: certified.get().unwrap_or(false),
                    }
                    .apply(&data)
                },
            )
        };

        let known_category = {
            let data = dataset.downgrade();
            move |id: &Option<String>| {
                id_is_known(&data.get().flatten(), id, Dataset::has_category)
            }
        };
        let known_district = {
            let data = dataset.downgrade();
            move |id: &Option<String>| {
                id_is_known(&data.get().flatten(), id, Dataset::has_district)
            }
        };
        bind_to_storage(
            &loaded,
            &filters.category,
            Rc::clone(&store),
            CATEGORY_KEY,
            known_category,
        );
        bind_to_storage(
            &loaded,
            &filters.district,
            Rc::clone(&store),
            DISTRICT_KEY,
            known_district,
        );
        bind_to_storage(&loaded, &filters.certified, store, CERTIFIED_KEY, |_| true);

        Self {
            language,
            fallback_language,
            dataset,
            loaded,
            map_loaded: Flag::new(),
            load_error: Observable::default(),
            map_error: Observable::default(),
            filters,
            category_values,
            categories_by_id,
            district_values,
            visible_places,
            selected_place: Observable::default(),
        }
    }

    /// Publish the outcome of the dataset fetch.
    ///
    /// On success the dataset is published before `loaded` is raised, so
    /// everything observing `loaded` sees a populated state. Failures are
    /// kept in `load_error` and `loaded` stays lowered.
    pub fn finish_load(&self, result: Result<Dataset, DataLoadError>) {
        if self.loaded.is_raised() {
            log::warn!("dataset already loaded, ignoring second load");
            return;
        }
        match result {
            Ok(dataset) => {
                self.dataset.set(Some(Rc::new(dataset)));
                self.loaded.raise();
            }
            Err(e) => {
                log::error!("failed to load places: {e}");
                self.load_error.set(Some(e.to_string()));
            }
        }
    }

    pub fn data(&self) -> Option<Rc<Dataset>> {
        self.dataset.get()
    }

    /// All places, or none before load.
    pub fn places(&self) -> Vec<Place> {
        self.dataset
            .with(|d| d.as_ref().map(|d| d.places.clone()))
            .unwrap_or_default()
    }

    pub fn place(&self, id: PlaceId) -> Option<Place> {
        self.dataset
            .with(|d| d.as_ref().and_then(|d| d.place(id).cloned()))
    }

    /// Resolve a per-language value to the current language.
    pub fn translated_value(&self, values: &Translations) -> Option<String> {
        self.language
            .with(|lang| translate(values, lang, &self.fallback_language).map(str::to_string))
    }

    /// Localized category name.
    pub fn category_name(&self, id: &str) -> Option<String> {
        self.categories_by_id.with(|names| names.get(id).cloned())
    }

    pub fn district_name(&self, id: &str) -> Option<String> {
        self.district_values
            .with(|districts| districts.iter().find(|d| d.id == id).map(|d| d.name.clone()))
    }

    pub fn filter_selection(&self) -> FilterSelection {
        self.filters.selection()
    }

    /// Focus `id` and scroll the map to the top of the viewport.
    pub fn goto_place(&self, id: PlaceId, viewport: &dyn Viewport) {
        if let Some(rect) = viewport.map_rect() {
            viewport.smooth_scroll_to(viewport.page_y_offset() + rect.top - rect.left);
        }
        self.select_place(Some(id));
    }

    /// Select `id`. Every call notifies, so re-selecting the current place
    /// pans to it and reopens its popup.
    pub fn select_place(&self, id: Option<PlaceId>) {
        self.selected_place.replace(id);
    }

    pub fn clear_selection(&self) {
        self.select_place(None);
    }
}

fn localized_categories(data: &Dataset, lang: &str, fallback: &str) -> Vec<CategoryOption> {
    let mut values: Vec<CategoryOption> = data
        .categories
        .iter()
        .map(|c| CategoryOption {
            id: c.id.clone(),
            name: translate(&c.name, lang, fallback)
                .unwrap_or(c.id.as_str())
                .to_string(),
        })
        .collect();
    sort_by_name_ignore_case(&mut values, |c| &c.name);
    values
}

fn id_is_known(
    data: &Option<Rc<Dataset>>,
    id: &Option<String>,
    lookup: fn(&Dataset, &str) -> bool,
) -> bool {
    match (data, id) {
        (_, None) => true,
        (Some(data), Some(id)) => lookup(data, id),
        (None, Some(_)) => false,
    }
}
