use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::{EntityId, LatLng};

pub const DEFAULT_API_URL: &str = "/techmap/api/companies";
/// Tirana city centre.
pub const DEFAULT_MAP_CENTER: LatLng = LatLng::new(41.3275, 19.8187);
pub const DEFAULT_MAP_ZOOM: f64 = 13.0;
/// Zoom used when centering on a single organization.
pub const FOCUS_ZOOM: f64 = 16.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Page-supplied map configuration. Field names follow the page global
/// (`apiUrl`, `mapCenter`, `mapZoom`, `selectedCompanyId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireConfig")]
pub struct MapConfig {
    pub api_url: String,
    /// `[lat, lng]`
    pub map_center: [f64; 2],
    pub map_zoom: f64,
    pub selected_company_id: Option<EntityId>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            map_center: [DEFAULT_MAP_CENTER.lat, DEFAULT_MAP_CENTER.lng],
            map_zoom: DEFAULT_MAP_ZOOM,
            selected_company_id: None,
        }
    }
}

/// Page global as written by the host page. A field of the wrong type is
/// dropped on its own and takes its default.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConfig {
    #[serde(default, deserialize_with = "lenient")]
    api_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    map_center: Option<[f64; 2]>,
    #[serde(default, deserialize_with = "lenient")]
    map_zoom: Option<f64>,
    #[serde(default, deserialize_with = "lenient_id")]
    selected_company_id: Option<EntityId>,
}

impl From<WireConfig> for MapConfig {
    fn from(wire: WireConfig) -> Self {
        let defaults = Self::default();
        Self {
            api_url: wire
                .api_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.api_url),
            map_center: wire.map_center.unwrap_or(defaults.map_center),
            map_zoom: wire.map_zoom.unwrap_or(defaults.map_zoom),
            selected_company_id: wire.selected_company_id,
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Positive integer ids, given either as a number or a numeric string.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f < 9_007_199_254_740_992.0)
                .map(|f| f as u64)
        }),
        serde_json::Value::String(s) => s.trim().parse::<EntityId>().ok(),
        _ => None,
    };
    Ok(id.filter(|id| *id > 0))
}

impl MapConfig {
    pub fn center(&self) -> LatLng {
        LatLng::from_parts(Some(self.map_center[0]), Some(self.map_center[1]))
            .unwrap_or(DEFAULT_MAP_CENTER)
    }

    pub fn zoom(&self) -> f64 {
        if self.map_zoom.is_finite() {
            self.map_zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            DEFAULT_MAP_ZOOM
        }
    }

    /// Apply a `company_id` value taken from the page URL. Unparseable or zero
    /// values leave the configured selection untouched.
    pub fn with_selected_override(mut self, raw: Option<&str>) -> Self {
        if let Some(id) = raw
            .and_then(|value| value.trim().parse::<EntityId>().ok())
            .filter(|id| *id > 0)
        {
            self.selected_company_id = Some(id);
        }
        self
    }
}
