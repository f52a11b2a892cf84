use js_sys::Reflect;
use techmap_shared::MapConfig;
use wasm_bindgen::JsValue;

/// Name of the optional page global holding map settings.
const CONFIG_GLOBAL: &str = "TECHMAP_CONFIG";
const SELECTED_PARAM: &str = "company_id";

/// Settings from the page global, with `?company_id=` from the URL taking
/// precedence for the preselected organization.
pub fn read_map_config() -> MapConfig {
    let Some(window) = web_sys::window() else {
        return MapConfig::default();
    };
    let config = Reflect::get(window.as_ref(), &JsValue::from_str(CONFIG_GLOBAL))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
        .and_then(|value| match serde_wasm_bindgen::from_value::<MapConfig>(value) {
            Ok(config) => Some(config),
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("ignoring malformed {CONFIG_GLOBAL}: {e}").into(),
                );
                None
            }
        })
        .unwrap_or_default();

    let selected = window
        .location()
        .search()
        .ok()
        .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok())
        .and_then(|params| params.get(SELECTED_PARAM));
    config.with_selected_override(selected.as_deref())
}
