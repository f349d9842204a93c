//! Main application component.

use std::rc::Rc;

use placemap::{
    AppConfig, Flag, Geolocator, InstallPrompt, KeyValueStore, MapController, MapInitError,
    Observable, PlaceId, ResilientStore, ViewState,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::browser::{
    self, BrowserGeolocator, BrowserViewport, LocalStorageStore, TimeoutScheduler,
};
use crate::components::{
    FilterBar, InstallToast, LanguagePicker, PlaceList, PlaceRow, PopupTemplate, StatusBanner,
};
use crate::fetch::fetch_dataset;
use crate::gmaps::GoogleMapAdapter;
use crate::labels::Labels;

const POPUP_TEMPLATE_ID: &str = "popup";

/// Everything the page shares for its whole lifetime.
pub struct AppContext {
    pub config: AppConfig,
    pub view: Rc<ViewState>,
    pub install: Rc<InstallPrompt>,
    viewport: Rc<BrowserViewport>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let store: Rc<dyn KeyValueStore> = match LocalStorageStore::open() {
            Ok(storage) => Rc::new(ResilientStore::new(storage)),
            Err(e) => Rc::new(ResilientStore::<LocalStorageStore>::unavailable(&e)),
        };
        let view = Rc::new(ViewState::new(&config, store));
        let viewport = Rc::new(BrowserViewport::new(config.map.container_id.clone()));
        Self {
            config,
            view,
            install: Rc::new(InstallPrompt::new()),
            viewport,
        }
    }

    /// Kick off the dataset fetch, the map and the install listener.
    fn start(&self) {
        let view = Rc::clone(&self.view);
        let url = self.config.dataset_url.clone();
        spawn_local(async move {
            view.finish_load(fetch_dataset(&url).await);
        });

        let view = Rc::clone(&self.view);
        let failed = Rc::clone(&self.view);
        let config = self.config.clone();
        browser::when_maps_ready(
            move || {
                let adapter = Rc::new(GoogleMapAdapter::new(POPUP_TEMPLATE_ID));
                let geolocator =
                    BrowserGeolocator::detect().map(|g| Rc::new(g) as Rc<dyn Geolocator>);
                let scheduler = Rc::new(TimeoutScheduler);
                MapController::attach(&view, adapter, &config, geolocator, scheduler);
            },
            move || {
                let error = MapInitError::SdkUnavailable;
                log::error!("map unavailable, showing list only: {error}");
                failed.map_error.set(Some(error.to_string()));
            },
        );

        browser::listen_install_prompt(Rc::clone(&self.install));
    }

    /// Re-render on every cell the page displays. The returned closure
    /// drops the subscriptions.
    fn watch(&self, rerender: Rc<dyn Fn()>) -> Box<dyn FnOnce()> {
        let view = &self.view;
        let mut cancels = vec![
            watch_cell(&view.language, &rerender),
            watch_cell(&view.dataset, &rerender),
            watch_cell(&view.load_error, &rerender),
            watch_cell(&view.map_error, &rerender),
            watch_cell(&view.filters.category, &rerender),
            watch_cell(&view.filters.district, &rerender),
            watch_cell(&view.filters.certified, &rerender),
            watch_cell(&view.category_values, &rerender),
            watch_cell(&view.district_values, &rerender),
            watch_cell(&view.visible_places, &rerender),
            watch_cell(&view.selected_place, &rerender),
            watch_cell(&self.install.toast_visible, &rerender),
        ];
        cancels.push(watch_flag(&view.loaded, &rerender));
        cancels.push(watch_flag(&view.map_loaded, &rerender));
        Box::new(move || cancels.into_iter().for_each(|cancel| cancel()))
    }

    fn rows(&self, ids: &[PlaceId]) -> Vec<PlaceRow> {
        let view = &self.view;
        ids.iter()
            .filter_map(|&id| {
                let place = view.place(id)?;
                let district = view
                    .district_name(&place.district)
                    .unwrap_or_else(|| place.district.clone());
                let categories = place
                    .categories
                    .iter()
                    .map(|c| view.category_name(c).unwrap_or_else(|| c.clone()))
                    .collect();
                Some(PlaceRow {
                    id,
                    name: place.name,
                    district,
                    categories,
                    certified: place.certified,
                })
            })
            .collect()
    }
}

fn watch_cell<T: Clone + PartialEq + 'static>(
    cell: &Observable<T>,
    rerender: &Rc<dyn Fn()>,
) -> Box<dyn FnOnce()> {
    let rerender = Rc::clone(rerender);
    let id = cell.subscribe(move |_| rerender());
    let cell = cell.clone();
    Box::new(move || {
        cell.unsubscribe(id);
    })
}

fn watch_flag(flag: &Flag, rerender: &Rc<dyn Fn()>) -> Box<dyn FnOnce()> {
    let rerender = Rc::clone(rerender);
    let id = flag.subscribe(move |_| rerender());
    let flag = flag.clone();
    Box::new(move || {
        flag.unsubscribe(id);
    })
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: AppConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let ctx = {
        let config = props.config.clone();
        use_memo((), move |_| AppContext::new(config))
    };
    let trigger = use_force_update();

    {
        let ctx = Rc::clone(&ctx);
        let trigger = trigger.clone();
        use_effect_with((), move |_| {
            let rerender: Rc<dyn Fn()> = Rc::new(move || trigger.force_update());
            let unwatch = ctx.watch(rerender);
            ctx.start();
            unwatch
        });
    }

    let view = &ctx.view;
    let labels = Labels::for_language(&view.language.get());

    let on_category = {
        let view = Rc::clone(view);
        Callback::from(move |id: Option<String>| view.filters.category.set(id))
    };
    let on_district = {
        let view = Rc::clone(view);
        Callback::from(move |id: Option<String>| view.filters.district.set(id))
    };
    let on_certified = {
        let view = Rc::clone(view);
        Callback::from(move |only: bool| view.filters.certified.set(only))
    };
    let on_clear = {
        let view = Rc::clone(view);
        Callback::from(move |_: ()| view.filters.clear())
    };
    let on_language = {
        let view = Rc::clone(view);
        Callback::from(move |lang: String| view.language.set(lang))
    };
    let on_goto = {
        let view = Rc::clone(view);
        let viewport = Rc::clone(&ctx.viewport);
        Callback::from(move |id: PlaceId| view.goto_place(id, &*viewport))
    };
    let on_install = {
        let install = Rc::clone(&ctx.install);
        Callback::from(move |_: ()| {
            install.install();
        })
    };
    let on_dismiss = {
        let install = Rc::clone(&ctx.install);
        Callback::from(move |_: ()| install.dismiss())
    };

    let map_error = view.map_error.get();
    let selected = view.selected_place.get();
    let rows = ctx.rows(&view.visible_places.get());
    let popup_row = selected.and_then(|id| ctx.rows(&[id]).pop());
    let loading = !view.loaded.is_raised() && view.load_error.get().is_none();

    html! {
        <div class="app">
            <header class="app-header">
                <h1>{ labels.title }</h1>
                <LanguagePicker labels={labels} current={view.language.get()} on_change={on_language} />
            </header>

            <FilterBar
                labels={labels}
                categories={view.category_values.get()}
                districts={view.district_values.get()}
                selection={view.filter_selection()}
                {on_category}
                {on_district}
                {on_certified}
                {on_clear}
            />

            <StatusBanner
                labels={labels}
                {loading}
                load_error={view.load_error.get()}
                map_error={map_error.clone()}
            />

            <main class="content">
                <div
                    id={ctx.config.map.container_id.clone()}
                    class={classes!("map", map_error.is_some().then_some("hidden"))}
                />
                if view.loaded.is_raised() {
                    <PlaceList
                        labels={labels}
                        {rows}
                        {selected}
                        show_map_link={view.map_loaded.is_raised()}
                        {on_goto}
                    />
                }
            </main>

            <PopupTemplate id={POPUP_TEMPLATE_ID} labels={labels} row={popup_row} />

            <InstallToast
                labels={labels}
                visible={ctx.install.toast_visible.get()}
                {on_install}
                {on_dismiss}
            />

            <footer class="app-footer">
                { format!("{} @ {}", env!("BUILD_COMMIT"), env!("BUILD_TIMESTAMP")) }
            </footer>
        </div>
    }
}
