//! [`MapAdapter`] over the Google Maps JavaScript SDK and the
//! `@googlemaps/markerclusterer` bundle.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use js_sys::{Array, Function, Object, Reflect};
use placemap::{
    CenterControlState, MapAdapter, MapInitError, MapOptions, MarkerSpec, PopupContent, Position,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::browser::js_path;

pub const CENTER_BUTTON_ID: &str = "center-bt";
const CONTROL_SLOT: &str = "RIGHT_BOTTOM";

pub mod sdk {
    use js_sys::Array;
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Debug, Clone)]
        pub type Map;

        #[wasm_bindgen(catch, constructor, js_namespace = ["google", "maps"])]
        pub fn new(container: &web_sys::Element, options: &JsValue) -> Result<Map, JsValue>;

        #[wasm_bindgen(method, js_name = panTo)]
        pub fn pan_to(this: &Map, position: &JsValue);

        #[wasm_bindgen(method, js_name = setCenter)]
        pub fn set_center(this: &Map, position: &JsValue);

        /// One `MVCArray` of elements per `ControlPosition`.
        #[wasm_bindgen(method, getter)]
        pub fn controls(this: &Map) -> Array;

        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Debug, Clone)]
        pub type Marker;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"])]
        pub fn new(options: &JsValue) -> Marker;

        #[wasm_bindgen(method, js_name = setMap)]
        pub fn set_map(this: &Marker, map: &JsValue);

        #[wasm_bindgen(method, js_name = addListener)]
        pub fn add_listener(this: &Marker, event: &str, handler: &js_sys::Function) -> JsValue;

        #[wasm_bindgen(js_namespace = ["google", "maps"])]
        #[derive(Debug, Clone)]
        pub type InfoWindow;

        #[wasm_bindgen(constructor, js_namespace = ["google", "maps"])]
        pub fn new(options: &JsValue) -> InfoWindow;

        #[wasm_bindgen(method, js_name = setOptions)]
        pub fn set_options(this: &InfoWindow, options: &JsValue);

        #[wasm_bindgen(method)]
        pub fn open(this: &InfoWindow, options: &JsValue);

        #[wasm_bindgen(method)]
        pub fn close(this: &InfoWindow);

        #[wasm_bindgen(js_namespace = markerClusterer)]
        #[derive(Debug, Clone)]
        pub type MarkerClusterer;

        #[wasm_bindgen(constructor, js_namespace = markerClusterer)]
        pub fn new(options: &JsValue) -> MarkerClusterer;

        #[wasm_bindgen(method, js_name = clearMarkers)]
        pub fn clear_markers(this: &MarkerClusterer, no_draw: bool);

        #[wasm_bindgen(method, js_name = addMarkers)]
        pub fn add_markers(this: &MarkerClusterer, markers: &Array);

        /// Zooms the map to the clicked cluster's bounds.
        #[wasm_bindgen(js_namespace = markerClusterer, js_name = defaultOnClusterClickHandler)]
        pub fn default_on_cluster_click(event: &JsValue, cluster: &JsValue, map: &JsValue);
    }
}

/// Both the maps SDK and the clusterer bundle are on the page.
pub fn sdk_available() -> bool {
    let global: JsValue = js_sys::global().into();
    js_path(&global, &["google", "maps", "Map"]).is_some()
        && js_path(&global, &["markerClusterer", "MarkerClusterer"]).is_some()
}

fn object(fields: &[(&str, JsValue)]) -> JsValue {
    let object = Object::new();
    for (key, value) in fields {
        // Setting a property on a fresh plain object cannot fail.
        let _ = Reflect::set(&object, &JsValue::from_str(key), value);
    }
    object.into()
}

fn lat_lng(position: Position) -> JsValue {
    object(&[
        ("lat", JsValue::from(position.lat)),
        ("lng", JsValue::from(position.lng)),
    ])
}

fn document() -> Result<web_sys::Document, MapInitError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| MapInitError::Js("no document".to_string()))
}

#[derive(Default)]
pub struct GoogleMapAdapter {
    popup_template_id: String,
    map: RefCell<Option<sdk::Map>>,
    popup: RefCell<Option<sdk::InfoWindow>>,
    clusterer: RefCell<Option<sdk::MarkerClusterer>>,
    markers: RefCell<Vec<sdk::Marker>>,
    center_button: RefCell<Option<web_sys::Element>>,
    on_cluster_click: RefCell<Option<Rc<dyn Fn()>>>,
}

impl GoogleMapAdapter {
    /// `popup_template_id` names the element whose first `div` child is
    /// cloned into the info popup.
    pub fn new(popup_template_id: impl Into<String>) -> Self {
        Self {
            popup_template_id: popup_template_id.into(),
            ..Self::default()
        }
    }

    fn map_value(&self) -> JsValue {
        self.map
            .borrow()
            .as_ref()
            .map(|m| JsValue::from(m.clone()))
            .unwrap_or(JsValue::NULL)
    }

    fn popup_node(&self) -> Option<web_sys::Node> {
        let template = document()
            .ok()?
            .get_element_by_id(&self.popup_template_id)?
            .query_selector("div")
            .ok()??;
        template.clone_node_with_deep(true).ok()
    }

    fn center_button(&self) -> Option<web_sys::Element> {
        let document = document().ok()?;
        if let Some(existing) = document.get_element_by_id(CENTER_BUTTON_ID) {
            existing.remove();
            return Some(existing);
        }
        let button = document.create_element("button").ok()?;
        button.set_id(CENTER_BUTTON_ID);
        let _ = button.set_attribute("type", "button");
        let _ = button.set_attribute("aria-label", "Center on my location");
        Some(button)
    }
}

impl MapAdapter for GoogleMapAdapter {
    type Marker = sdk::Marker;

    fn init(&self, options: &MapOptions, on_cluster_click: Rc<dyn Fn()>) -> Result<(), MapInitError> {
        if !sdk_available() {
            return Err(MapInitError::SdkUnavailable);
        }
        let container = document()?
            .get_element_by_id(&options.container_id)
            .ok_or_else(|| MapInitError::MissingContainer(options.container_id.clone()))?;

        let map_options = object(&[
            ("zoom", JsValue::from(options.zoom)),
            ("center", lat_lng(options.center)),
            ("streetViewControl", JsValue::from(options.street_view)),
        ]);
        let map = sdk::Map::new(&container, &map_options)
            .map_err(|e| MapInitError::Js(e.as_string().unwrap_or_else(|| format!("{e:?}"))))?;

        *self.popup.borrow_mut() = Some(sdk::InfoWindow::new(&Object::new().into()));
        *self.map.borrow_mut() = Some(map);
        *self.on_cluster_click.borrow_mut() = Some(on_cluster_click);
        log::debug!("map created in #{}", options.container_id);
        Ok(())
    }

    fn create_marker(&self, spec: &MarkerSpec, on_click: Rc<dyn Fn()>) -> sdk::Marker {
        let marker = sdk::Marker::new(&object(&[
            ("map", self.map_value()),
            ("position", lat_lng(spec.position)),
            ("title", JsValue::from_str(&spec.title)),
            ("icon", JsValue::from_str(&spec.icon_url)),
        ]));
        let handler = Closure::<dyn FnMut()>::new(move || on_click());
        marker.add_listener("click", handler.as_ref().unchecked_ref());
        handler.forget();
        self.markers.borrow_mut().push(marker.clone());
        marker
    }

    fn cluster(&self, markers: &[sdk::Marker]) {
        let before_zoom = self.on_cluster_click.borrow().clone();
        let handler =
            Closure::<dyn FnMut(JsValue, JsValue, JsValue)>::new(move |event, cluster, map| {
                if let Some(before_zoom) = &before_zoom {
                    before_zoom();
                }
                sdk::default_on_cluster_click(&event, &cluster, &map);
            });
        let batch: Array = markers.iter().collect();
        let clusterer = sdk::MarkerClusterer::new(&object(&[
            ("map", self.map_value()),
            ("markers", batch.into()),
            ("onClusterClick", handler.as_ref().clone()),
        ]));
        handler.forget();
        *self.clusterer.borrow_mut() = Some(clusterer);
    }

    fn set_visible_markers(&self, markers: &[sdk::Marker]) {
        for marker in self.markers.borrow().iter() {
            marker.set_map(&JsValue::NULL);
        }
        let map = self.map_value();
        let batch = Array::new();
        for marker in markers {
            marker.set_map(&map);
            batch.push(marker.as_ref());
        }
        if let Some(clusterer) = self.clusterer.borrow().as_ref() {
            clusterer.clear_markers(true);
            clusterer.add_markers(&batch);
        }
    }

    fn pan_to(&self, position: Position) {
        if let Some(map) = self.map.borrow().as_ref() {
            map.pan_to(&lat_lng(position));
        }
    }

    fn set_center(&self, position: Position) {
        if let Some(map) = self.map.borrow().as_ref() {
            map.set_center(&lat_lng(position));
        }
    }

    fn open_popup(&self, anchor: &sdk::Marker, content: &PopupContent) {
        let (Some(map), Some(popup)) = (self.map.borrow().clone(), self.popup.borrow().clone()) else {
            return;
        };
        let body = self
            .popup_node()
            .map(JsValue::from)
            .unwrap_or_else(|| JsValue::from_str(&content.label));
        popup.set_options(&object(&[
            ("ariaLabel", JsValue::from_str(&content.label)),
            ("content", body),
        ]));
        popup.open(&object(&[
            ("anchor", JsValue::from(anchor.clone())),
            ("shouldFocus", JsValue::FALSE),
            ("map", JsValue::from(map)),
        ]));
    }

    fn close_popup(&self) {
        if let Some(popup) = self.popup.borrow().as_ref() {
            popup.close();
        }
    }

    fn add_center_control(&self, on_click: Rc<dyn Fn()>) {
        let Some(map) = self.map.borrow().clone() else {
            return;
        };
        let Some(button) = self.center_button() else {
            log::warn!("could not create the center control");
            return;
        };
        button.set_class_name(CenterControlState::Idle.class_name());
        EventListener::new(&button, "click", move |_| on_click()).forget();

        let global: JsValue = js_sys::global().into();
        let slot = js_path(&global, &["google", "maps", "ControlPosition", CONTROL_SLOT])
            .and_then(|p| p.as_f64())
            .map(|index| map.controls().get(index as u32));
        let push = slot.as_ref().and_then(|slot| {
            Reflect::get(slot, &JsValue::from_str("push"))
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok())
        });
        match (slot, push) {
            (Some(slot), Some(push)) => {
                if let Err(e) = push.call1(&slot, &button) {
                    log::warn!("could not place the center control: {e:?}");
                }
            }
            _ => log::warn!("map has no {CONTROL_SLOT} control slot"),
        }
        *self.center_button.borrow_mut() = Some(button);
    }

    fn set_center_control_state(&self, state: CenterControlState) {
        if let Some(button) = self.center_button.borrow().as_ref() {
            button.set_class_name(state.class_name());
        }
    }
}
