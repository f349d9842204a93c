//! Browser implementations of the core capability traits.
//!
//! Everything that touches `window` lives here so the rest of the crate can
//! be read against the core traits alone.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use js_sys::{Function, Promise, Reflect};
use placemap::{
    AppConfig, DeferredPrompt, GeolocationError, Geolocator, InstallOutcome, InstallPrompt,
    KeyValueStore, OutcomeCallback, PersistenceError, Position, PositionCallback, Rect, Scheduler,
    Viewport,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{ScrollBehavior, ScrollToOptions};

pub const CONFIG_ELEMENT_ID: &str = "placemap-config";
const MAPS_READY_EVENT: &str = "placemap:maps-ready";
const MAPS_FAILED_EVENT: &str = "placemap:maps-failed";
/// Set by the page's script handlers so an outcome that fired before the
/// app started is still seen.
const MAPS_STATE_KEY: &str = "placemapMapsState";

/// Walk `root.a.b.c`, returning `None` at the first missing link.
pub(crate) fn js_path(root: &JsValue, keys: &[&str]) -> Option<JsValue> {
    let mut current = root.clone();
    for key in keys {
        current = Reflect::get(&current, &JsValue::from_str(key)).ok()?;
        if current.is_undefined() || current.is_null() {
            return None;
        }
    }
    Some(current)
}

fn has_property(target: &JsValue, key: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(key)).unwrap_or(false)
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Read the JSON config element, with `<html lang>` overriding the language.
pub fn read_config() -> AppConfig {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return AppConfig::default();
    };
    let mut config = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
        .filter(|text| !text.trim().is_empty())
        .map(|text| {
            AppConfig::from_json(&text).unwrap_or_else(|e| {
                log::warn!("invalid #{CONFIG_ELEMENT_ID}, using defaults: {e}");
                AppConfig::default()
            })
        })
        .unwrap_or_default();
    if let Some(lang) = document
        .document_element()
        .and_then(|html| html.get_attribute("lang"))
        .filter(|lang| !lang.is_empty())
    {
        config.language = lang;
    }
    config
}

/// `window.localStorage`.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, PersistenceError> {
        let window = web_sys::window().ok_or(PersistenceError::Unavailable)?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistenceError::Backend(js_error(&e)))?
            .ok_or(PersistenceError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistenceError::Backend(format!("get_item({key}) failed: {}", js_error(&e))))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistenceError::Backend(format!("set_item({key}) failed: {}", js_error(&e))))
    }

    fn remove_item(&self, key: &str) -> Result<(), PersistenceError> {
        self.storage.remove_item(key).map_err(|e| {
            PersistenceError::Backend(format!("remove_item({key}) failed: {}", js_error(&e)))
        })
    }
}

/// `navigator.geolocation`, when the browser has it.
pub struct BrowserGeolocator {
    geolocation: web_sys::Geolocation,
}

impl BrowserGeolocator {
    pub fn detect() -> Option<Self> {
        let navigator = web_sys::window()?.navigator();
        if !has_property(&navigator, "geolocation") {
            return None;
        }
        let geolocation = navigator.geolocation().ok()?;
        Some(Self { geolocation })
    }
}

fn read_position(value: &JsValue) -> Result<Position, GeolocationError> {
    let lat = js_path(value, &["coords", "latitude"]).and_then(|v| v.as_f64());
    let lng = js_path(value, &["coords", "longitude"]).and_then(|v| v.as_f64());
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Position::new(lat, lng)),
        _ => Err(GeolocationError::PositionUnavailable),
    }
}

impl Geolocator for BrowserGeolocator {
    fn current_position(&self, done: PositionCallback) {
        // Only one of the two callbacks ever runs; they share the completion.
        let done = Rc::new(RefCell::new(Some(done)));
        let complete = {
            let done = Rc::clone(&done);
            move |result: Result<Position, GeolocationError>| {
                let callback = done.borrow_mut().take();
                if let Some(callback) = callback {
                    callback(result);
                }
            }
        };

        // Each closure is freed by the JS side after its single call.
        let on_success = {
            let complete = complete.clone();
            Closure::once_into_js(move |position: JsValue| {
                complete(read_position(&position));
            })
        };
        let on_error = {
            let complete = complete.clone();
            Closure::once_into_js(move |error: JsValue| {
                let code = js_path(&error, &["code"])
                    .and_then(|c| c.as_f64())
                    .unwrap_or(2.0);
                complete(Err(GeolocationError::from_code(code as u16)));
            })
        };

        let requested = self.geolocation.get_current_position_with_error_callback(
            on_success.unchecked_ref(),
            Some(on_error.unchecked_ref()),
        );
        if requested.is_err() {
            complete(Err(GeolocationError::Unsupported));
        }
    }
}

/// Runs deferred work on the next event-loop turn.
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        Timeout::new(0, task).forget();
    }
}

/// The window, scrolled so the map element sits at the top.
pub struct BrowserViewport {
    map_id: String,
}

impl BrowserViewport {
    pub fn new(map_id: impl Into<String>) -> Self {
        Self {
            map_id: map_id.into(),
        }
    }
}

impl Viewport for BrowserViewport {
    fn page_y_offset(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.page_y_offset().ok())
            .unwrap_or(0.0)
    }

    fn map_rect(&self) -> Option<Rect> {
        let element = web_sys::window()?
            .document()?
            .get_element_by_id(&self.map_id)?;
        let rect = element.get_bounding_client_rect();
        Some(Rect {
            top: rect.top(),
            left: rect.left(),
        })
    }

    fn smooth_scroll_to(&self, top: f64) {
        if let Some(window) = web_sys::window() {
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            window.scroll_to_with_scroll_to_options(&options);
        }
    }
}

/// Register the offline worker. Failure only costs offline support.
pub fn register_service_worker(path: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let navigator = window.navigator();
    if !has_property(&navigator, "serviceWorker") {
        log::info!("service workers unsupported, running online only");
        return;
    }
    let registration = navigator.service_worker().register(path);
    spawn_local(async move {
        match JsFuture::from(registration).await {
            Ok(_) => log::info!("service worker registered"),
            Err(e) => log::warn!("service worker registration failed: {}", js_error(&e)),
        }
    });
}

/// A captured `beforeinstallprompt` event.
pub struct BrowserInstallEvent(JsValue);

impl DeferredPrompt for BrowserInstallEvent {
    fn prompt(self: Box<Self>, on_choice: OutcomeCallback) {
        let event = self.0;
        let prompt = Reflect::get(&event, &JsValue::from_str("prompt"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok());
        let Some(prompt) = prompt else {
            log::warn!("install event has no prompt()");
            return;
        };
        if let Err(e) = prompt.call0(&event) {
            log::warn!("install prompt failed: {}", js_error(&e));
            return;
        }
        let Some(choice) = js_path(&event, &["userChoice"]).and_then(|c| c.dyn_into::<Promise>().ok())
        else {
            return;
        };
        spawn_local(async move {
            match JsFuture::from(choice).await {
                Ok(result) => {
                    let outcome = js_path(&result, &["outcome"])
                        .and_then(|o| o.as_string())
                        .unwrap_or_default();
                    on_choice(InstallOutcome::from_platform(&outcome));
                }
                Err(e) => log::warn!("install choice failed: {}", js_error(&e)),
            }
        });
    }
}

/// Capture `beforeinstallprompt` into `prompt` instead of the browser UI.
pub fn listen_install_prompt(prompt: Rc<InstallPrompt>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    EventListener::new(&window, "beforeinstallprompt", move |event| {
        event.prevent_default();
        let event: JsValue = event.clone().into();
        prompt.capture(Box::new(BrowserInstallEvent(event)));
    })
    .forget();
}

/// Run `on_ready` once the Maps SDK script has loaded, or `on_failed` if it
/// could not be loaded.
///
/// The page's SDK `<script>` dispatches `placemap:maps-ready` from its
/// callback and `placemap:maps-failed` from `onerror`. Both also record the
/// outcome in `window.placemapMapsState`, which is checked first.
pub fn when_maps_ready(on_ready: impl FnOnce() + 'static, on_failed: impl FnOnce() + 'static) {
    let global: JsValue = js_sys::global().into();
    let recorded = js_path(&global, &[MAPS_STATE_KEY]).and_then(|state| state.as_string());
    match recorded.as_deref() {
        Some("failed") => {
            on_failed();
            return;
        }
        Some("ready") => {
            if crate::gmaps::sdk_available() {
                on_ready();
            } else {
                on_failed();
            }
            return;
        }
        _ => {}
    }
    if crate::gmaps::sdk_available() {
        on_ready();
        return;
    }
    let Some(window) = web_sys::window() else {
        on_failed();
        return;
    };

    type Outcome = (Box<dyn FnOnce()>, Box<dyn FnOnce()>);
    let pending: Rc<RefCell<Option<Outcome>>> =
        Rc::new(RefCell::new(Some((Box::new(on_ready), Box::new(on_failed)))));

    let ready = Rc::clone(&pending);
    EventListener::once(&window, MAPS_READY_EVENT, move |_| {
        let outcome = ready.borrow_mut().take();
        if let Some((on_ready, on_failed)) = outcome {
            if crate::gmaps::sdk_available() {
                on_ready();
            } else {
                on_failed();
            }
        }
    })
    .forget();

    let failed = pending;
    EventListener::once(&window, MAPS_FAILED_EVENT, move |_| {
        let outcome = failed.borrow_mut().take();
        if let Some((_, on_failed)) = outcome {
            on_failed();
        }
    })
    .forget();
}

#[cfg(test)]
mod tests {
    use super::*;
    use placemap::{Dataset, ResilientStore, ViewState};
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const DOCUMENT: &str = r#"{
        "places": [
            {"name": "Tasca", "position": {"lat": 40.6, "lng": -8.6},
             "categories": ["food"], "district": "A", "certified": true},
            {"name": "Loja", "position": {"lat": 41.5, "lng": -8.4},
             "categories": ["shop"], "district": "B"}
        ],
        "categories": [{"id": "food", "name": {"pt": "Comida"}},
                       {"id": "shop", "name": {"pt": "Loja"}}],
        "districts": [{"id": "A", "name": "Aveiro"}, {"id": "B", "name": "Braga"}]
    }"#;

    fn clear(store: &LocalStorageStore) {
        for key in ["filters.category", "filters.district", "filters.certified"] {
            store.remove_item(key).unwrap();
        }
    }

    #[wasm_bindgen_test]
    fn test_local_storage_round_trip() {
        let store = LocalStorageStore::open().unwrap();
        store.set_item("placemap.test", "\"food\"").unwrap();
        assert_eq!(
            store.get_item("placemap.test").unwrap().as_deref(),
            Some("\"food\"")
        );
        store.remove_item("placemap.test").unwrap();
        assert_eq!(store.get_item("placemap.test").unwrap(), None);
    }

    #[wasm_bindgen_test]
    fn test_filters_survive_reload() {
        clear(&LocalStorageStore::open().unwrap());
        let config = AppConfig::default();

        let first = ViewState::new(
            &config,
            Rc::new(ResilientStore::new(LocalStorageStore::open().unwrap())),
        );
        first.finish_load(Dataset::from_json(DOCUMENT));
        first.filters.district.set(Some("B".to_string()));
        first.filters.certified.set(true);

        let second = ViewState::new(
            &config,
            Rc::new(ResilientStore::new(LocalStorageStore::open().unwrap())),
        );
        second.finish_load(Dataset::from_json(DOCUMENT));
        assert_eq!(second.filters.district.get().as_deref(), Some("B"));
        assert!(second.filters.certified.get());
        assert!(second.visible_places.get().is_empty());

        clear(&LocalStorageStore::open().unwrap());
    }

    #[wasm_bindgen_test]
    fn test_missing_config_element_uses_defaults() {
        let config = read_config();
        assert_eq!(config.dataset_url, "/data.json");
        assert_eq!(config.service_worker, "/sw.js");
    }

    #[wasm_bindgen_test]
    fn test_maps_sdk_absent_in_test_page() {
        assert!(!crate::gmaps::sdk_available());
    }

    #[wasm_bindgen_test]
    fn test_failure_recorded_before_start_runs_failed_callback() {
        let global: JsValue = js_sys::global().into();
        let key = JsValue::from_str(MAPS_STATE_KEY);
        Reflect::set(&global, &key, &JsValue::from_str("failed")).unwrap();

        let ready = Rc::new(Cell::new(false));
        let failed = Rc::new(Cell::new(false));
        when_maps_ready(
            {
                let ready = Rc::clone(&ready);
                move || ready.set(true)
            },
            {
                let failed = Rc::clone(&failed);
                move || failed.set(true)
            },
        );
        Reflect::delete_property(global.unchecked_ref(), &key).unwrap();

        assert!(failed.get());
        assert!(!ready.get());
    }

    #[wasm_bindgen_test]
    fn test_recorded_ready_without_sdk_runs_failed_callback() {
        let global: JsValue = js_sys::global().into();
        let key = JsValue::from_str(MAPS_STATE_KEY);
        Reflect::set(&global, &key, &JsValue::from_str("ready")).unwrap();

        let failed = Rc::new(Cell::new(false));
        when_maps_ready(|| panic!("the SDK is not on the test page"), {
            let failed = Rc::clone(&failed);
            move || failed.set(true)
        });
        Reflect::delete_property(global.unchecked_ref(), &key).unwrap();

        assert!(failed.get());
    }

    #[wasm_bindgen_test]
    fn test_js_path_stops_at_missing_link() {
        let global: JsValue = js_sys::global().into();
        assert!(js_path(&global, &["navigator"]).is_some());
        assert!(js_path(&global, &["google", "maps"]).is_none());
    }
}
