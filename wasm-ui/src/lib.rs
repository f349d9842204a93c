//! Web UI for placemap
//!
//! A Yew front end that lists the places of the dataset next to a clustered
//! Google map, backed by the `placemap` view-state.

mod app;
pub mod browser;
mod components;
mod fetch;
pub mod gmaps;
mod labels;

/// Entry point for the WASM application.
#[cfg_attr(not(test), wasm_bindgen::prelude::wasm_bindgen(start))]
pub fn run_app() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

    let config = browser::read_config();
    browser::register_service_worker(&config.service_worker);

    yew::Renderer::<app::App>::with_props(app::AppProps { config }).render();
}
