//! Dataset download.

use gloo_net::http::Request;
use placemap::{DataLoadError, Dataset};
use web_sys::RequestCache;

/// Fetch and prepare the dataset, preferring the HTTP cache over the network.
pub async fn fetch_dataset(url: &str) -> Result<Dataset, DataLoadError> {
    log::debug!("fetching {url}");
    let response = Request::get(url)
        .cache(RequestCache::ForceCache)
        .send()
        .await
        .map_err(|e| DataLoadError::Fetch(e.to_string()))?;
    if !response.ok() {
        return Err(DataLoadError::Status(response.status()));
    }
    let body = response
        .text()
        .await
        .map_err(|e| DataLoadError::Fetch(e.to_string()))?;
    Dataset::from_json(&body)
}
