//! CLI tool to validate a places dataset and list what a filter selection shows.
//!
//! Usage:
//!   places-check <data.json>
//!   places-check <data.json> --district A --certified
//!   places-check <data.json> --state filters.json --category food
//!
//! With `--state`, selections are restored from and saved to a JSON file the
//! same way the web app uses browser storage.

use clap::Parser;
use placemap::{
    AppConfig, DataLoadError, Dataset, FileStore, KeyValueStore, MemoryStore, ResilientStore,
    ViewState,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

/// Validate a dataset document and print the places visible under the given filters.
#[derive(Parser)]
#[command(name = "places-check")]
struct Cli {
    /// Dataset document (JSON)
    dataset: PathBuf,

    /// Display language for category names
    #[arg(long, default_value = "pt")]
    lang: String,

    /// Language used when a name has no entry for --lang
    #[arg(long, default_value = "pt")]
    fallback_lang: String,

    /// Only places in this category
    #[arg(long)]
    category: Option<String>,

    /// Only places in this district
    #[arg(long)]
    district: Option<String>,

    /// Only certified places
    #[arg(long)]
    certified: bool,

    /// Reset all stored selections before applying the flags above
    #[arg(long)]
    clear: bool,

    /// Restore and persist selections in this file
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Print the visible places as JSON
    #[arg(long)]
    json: bool,

    /// Log progress on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct VisiblePlace {
    name: String,
    district: String,
    categories: Vec<String>,
    certified: bool,
    lat: f64,
    lng: f64,
}

fn open_store(path: Option<&Path>) -> Rc<dyn KeyValueStore> {
    let Some(path) = path else {
        return Rc::new(MemoryStore::new());
    };
    match FileStore::open(path) {
        Ok(store) => Rc::new(ResilientStore::new(store)),
        Err(e) => Rc::new(ResilientStore::<FileStore>::unavailable(&e)),
    }
}

fn load(path: &Path) -> Result<Dataset, DataLoadError> {
    let text = fs::read_to_string(path)?;
    Dataset::from_json(&text)
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = AppConfig {
        language: cli.lang.clone(),
        fallback_language: cli.fallback_lang.clone(),
        ..AppConfig::default()
    };
    let state = ViewState::new(&config, open_store(cli.state.as_deref()));

    state.finish_load(load(&cli.dataset));
    if let Some(error) = state.load_error.get() {
        eprintln!("Error loading '{}': {error}", cli.dataset.display());
        process::exit(1);
    }

    if cli.clear {
        state.filters.clear();
    }
    if let Some(category) = &cli.category {
        if state.category_name(category).is_none() {
            eprintln!("Unknown category '{category}'");
            process::exit(2);
        }
        state.filters.category.set(Some(category.clone()));
    }
    if let Some(district) = &cli.district {
        if state.district_name(district).is_none() {
            eprintln!("Unknown district '{district}'");
            process::exit(2);
        }
        state.filters.district.set(Some(district.clone()));
    }
    if cli.certified {
        state.filters.certified.set(true);
    }

    let visible: Vec<VisiblePlace> = state
        .visible_places
        .get()
        .into_iter()
        .filter_map(|id| state.place(id))
        .map(|place| VisiblePlace {
            district: state
                .district_name(&place.district)
                .unwrap_or_else(|| place.district.clone()),
            categories: place
                .categories
                .iter()
                .map(|c| state.category_name(c).unwrap_or_else(|| c.clone()))
                .collect(),
            certified: place.certified,
            lat: place.position.lat,
            lng: place.position.lng,
            name: place.name,
        })
        .collect();

    if cli.json {
        match serde_json::to_string_pretty(&visible) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error encoding output: {e}");
                process::exit(1);
            }
        }
    } else {
        for place in &visible {
            let mark = if place.certified { '*' } else { ' ' };
            println!(
                "{mark} {} | {} | {}",
                place.name,
                place.district,
                place.categories.join(", ")
            );
        }
    }

    if cli.verbose {
        let selection = state.filter_selection();
        eprintln!(
            "Filters:  category={} district={} certified={}",
            selection.category.as_deref().unwrap_or("-"),
            selection.district.as_deref().unwrap_or("-"),
            selection.certified_only
        );
        eprintln!(
            "Places:   {} total -> {} visible",
            state.places().len(),
            visible.len()
        );
    }
}
