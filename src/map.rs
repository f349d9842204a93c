//! Map adapter seam and the controller driving it from the view-state.
//!
//! [`MapAdapter`] is the only thing that knows about a mapping SDK. The
//! [`MapController`] waits for the dataset, builds one marker per place and
//! then follows `visible_places` and `selected_place`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::{AppConfig, MapOptions, MarkerIcons};
use crate::error::MapInitError;
use crate::geolocation::{CenterControl, CenterControlState, Geolocator};
use crate::model::{Place, PlaceId, Position};
use crate::view_state::ViewState;

/// Marker styling by certification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    Certified,
    Standard,
}

impl MarkerIcon {
    pub fn for_place(place: &Place) -> Self {
        if place.certified {
            MarkerIcon::Certified
        } else {
            MarkerIcon::Standard
        }
    }

    pub fn url(self, icons: &MarkerIcons) -> &str {
        match self {
            MarkerIcon::Certified => &icons.certified,
            MarkerIcon::Standard => &icons.standard,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub place: PlaceId,
    pub title: String,
    pub position: Position,
    pub icon: MarkerIcon,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub place: PlaceId,
    /// Accessible label of the popup.
    pub label: String,
}

/// Deferred execution, e.g. to the next tick after layout.
pub trait Scheduler {
    fn defer(&self, task: Box<dyn FnOnce()>);
}

/// Operations the controller needs from a mapping SDK.
pub trait MapAdapter {
    type Marker: Clone + 'static;

    /// Create the map widget. `on_cluster_click` runs before the SDK's own
    /// cluster zoom.
    fn init(&self, options: &MapOptions, on_cluster_click: Rc<dyn Fn()>)
    -> Result<(), MapInitError>;

    fn create_marker(&self, spec: &MarkerSpec, on_click: Rc<dyn Fn()>) -> Self::Marker;

    /// Create the clustering overlay seeded with `markers`.
    fn cluster(&self, markers: &[Self::Marker]);

    /// Detach every marker, then show and cluster exactly `markers`.
    fn set_visible_markers(&self, markers: &[Self::Marker]);

    fn pan_to(&self, position: Position);

    fn set_center(&self, position: Position);

    /// Open the info popup on `anchor` without taking keyboard focus.
    fn open_popup(&self, anchor: &Self::Marker, content: &PopupContent);

    fn close_popup(&self);

    fn add_center_control(&self, on_click: Rc<dyn Fn()>);

    fn set_center_control_state(&self, state: CenterControlState);
}

pub struct MapController<A: MapAdapter> {
    adapter: Rc<A>,
    view: Weak<ViewState>,
    options: MapOptions,
    icons: MarkerIcons,
    geolocator: Option<Rc<dyn Geolocator>>,
    scheduler: Rc<dyn Scheduler>,
    markers: RefCell<Vec<A::Marker>>,
    center_control: CenterControl,
}

impl<A: MapAdapter + 'static> MapController<A> {
    /// Wire the controller to `view`. The map is built once `loaded` is
    /// raised (immediately if it already is).
    pub fn attach(
        view: &Rc<ViewState>,
        adapter: Rc<A>,
        config: &AppConfig,
        geolocator: Option<Rc<dyn Geolocator>>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Rc<Self> {
        let controller = Rc::new(Self {
            adapter,
            view: Rc::downgrade(view),
            options: config.map.clone(),
            icons: config.icons.clone(),
            geolocator,
            scheduler,
            markers: RefCell::new(Vec::new()),
            center_control: CenterControl::new(),
        });
        let starter = Rc::clone(&controller);
        view.loaded.on_raise(move || starter.start());
        controller
    }

    pub fn marker_count(&self) -> usize {
        self.markers.borrow().len()
    }

    pub fn center_control_state(&self) -> CenterControlState {
        self.center_control.state()
    }

    fn start(self: &Rc<Self>) {
        let Some(view) = self.view.upgrade() else {
            return;
        };

        let close = {
            let adapter = Rc::clone(&self.adapter);
            Rc::new(move || adapter.close_popup()) as Rc<dyn Fn()>
        };
        if let Err(e) = self.adapter.init(&self.options, close) {
            log::error!("map unavailable, showing list only: {e}");
            view.map_error.set(Some(e.to_string()));
            return;
        }
        view.map_loaded.raise();

        if self.geolocator.is_some() {
            let this = Rc::clone(self);
            self.adapter
                .add_center_control(Rc::new(move || this.center_on_user()));
        }

        self.create_markers(&view);
        self.adapter.cluster(&self.markers.borrow());

        let this = Rc::clone(self);
        view.visible_places
            .subscribe_and_update(move |ids| this.show_places(ids));

        let this = Rc::clone(self);
        view.selected_place
            .subscribe_and_update(move |selected| this.follow_selection(*selected));
    }

    fn create_markers(&self, view: &Rc<ViewState>) {
        let Some(data) = view.data() else {
            return;
        };
        let markers = data
            .place_ids()
            .zip(&data.places)
            .map(|(id, place)| {
                let icon = MarkerIcon::for_place(place);
                let spec = MarkerSpec {
                    place: id,
                    title: place.name.clone(),
                    position: place.position,
                    icon,
                    icon_url: icon.url(&self.icons).to_string(),
                };
                let view = Rc::downgrade(view);
                let on_click = Rc::new(move || {
                    if let Some(view) = view.upgrade() {
                        view.select_place(Some(id));
                    }
                });
                self.adapter.create_marker(&spec, on_click)
            })
            .collect();
        *self.markers.borrow_mut() = markers;
    }

    fn show_places(&self, ids: &[PlaceId]) {
        self.adapter.close_popup();
        let markers = self.markers.borrow();
        let visible: Vec<A::Marker> = ids
            .iter()
            .filter_map(|id| markers.get(id.0).cloned())
            .collect();
        self.adapter.set_visible_markers(&visible);
    }

    fn follow_selection(self: &Rc<Self>, selected: Option<PlaceId>) {
        let Some(id) = selected else {
            self.adapter.close_popup();
            return;
        };
        let Some(view) = self.view.upgrade() else {
            return;
        };
        let Some(place) = view.place(id) else {
            log::warn!("selected place {} does not exist", id.0);
            return;
        };
        self.adapter.pan_to(place.position);

        let this = Rc::clone(self);
        let content = PopupContent {
            place: id,
            label: place.name,
        };
        self.scheduler.defer(Box::new(move || {
            let still_shown = this.view.upgrade().is_some_and(|v| {
                v.selected_place.get() == Some(id)
                    && v.visible_places.with(|ids| ids.contains(&id))
            });
            if !still_shown {
                return;
            }
            let marker = this.markers.borrow().get(id.0).cloned();
            if let Some(marker) = marker {
                this.adapter.open_popup(&marker, &content);
            }
        }));
    }

    fn center_on_user(self: &Rc<Self>) {
        let Some(geolocator) = &self.geolocator else {
            return;
        };
        if !self.center_control.begin() {
            return;
        }
        self.adapter
            .set_center_control_state(CenterControlState::Pending);

        let this = Rc::clone(self);
        geolocator.current_position(Box::new(move |result| {
            let position = this.center_control.finish(result);
            this.adapter.set_center_control_state(CenterControlState::Idle);
            if let Some(position) = position {
                this.adapter.set_center(position);
            }
        }));
    }
}
