use techmap_shared::{DataLoadFailure, Entity, parse_entities};

use crate::app::Dispatcher;
use crate::controller::Msg;

/// GET the organization list. Any transport, status or decode problem becomes
/// a [`DataLoadFailure`]; nothing is retried.
pub async fn fetch_entities(url: &str) -> Result<Vec<Entity>, DataLoadFailure> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| DataLoadFailure::Transport(e.to_string()))?;
    if !resp.ok() {
        return Err(DataLoadFailure::Status(resp.status()));
    }
    let body = resp
        .text()
        .await
        .map_err(|e| DataLoadFailure::Transport(e.to_string()))?;
    parse_entities(&body).map_err(|e| DataLoadFailure::Parse(e.to_string()))
}

/// Fetch once and hand the outcome to the dispatcher.
pub fn load_dataset(url: String, dispatcher: Dispatcher) {
    wasm_bindgen_futures::spawn_local(async move {
        match fetch_entities(&url).await {
            Ok(entities) => {
                web_sys::console::info_1(
                    &format!("loaded {} organizations from {url}", entities.len()).into(),
                );
                dispatcher.send(Msg::Loaded(entities));
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("loading {url} failed: {e}").into());
                dispatcher.send(Msg::LoadFailed(e));
            }
        }
    });
}
