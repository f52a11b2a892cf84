#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::viewport::{TILE_SIZE, Viewport};

const TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const MAX_TILE_ZOOM: u32 = 19;
/// Loaded images beyond this count are pruned to the ones still on screen.
const MAX_CACHED_TILES: usize = 256;
const ONLOAD_HANDLE_KEY: &str = "__techmapTileOnload";
const ONERROR_HANDLE_KEY: &str = "__techmapTileOnerror";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoords {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl TileCoords {
    pub fn url(&self) -> String {
        TILE_URL_TEMPLATE
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

/// A tile and where to draw it, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub coords: TileCoords,
    pub sx: f64,
    pub sy: f64,
    pub size: f64,
}

/// Tiles covering the viewport at the nearest integer zoom, scaled to the
/// fractional zoom. Columns outside the world are skipped, not wrapped.
pub fn visible_tiles(vp: &Viewport) -> Vec<TilePlacement> {
    if vp.width <= 0.0 || vp.height <= 0.0 {
        return Vec::new();
    }
    let z = (vp.zoom.round().max(0.0) as u32).min(MAX_TILE_ZOOM);
    let scale = 2f64.powf(vp.zoom - z as f64);
    let size = TILE_SIZE * scale;
    let tiles_per_axis = 1u32 << z;

    let (ox, oy) = vp.origin_px();
    // Origin converted to tile-zoom pixels.
    let left = ox / scale;
    let top = oy / scale;
    let right = left + vp.width / scale;
    let bottom = top + vp.height / scale;

    let max_index = tiles_per_axis as f64 - 1.0;
    let x0 = (left / TILE_SIZE).floor().clamp(0.0, max_index) as u32;
    let x1 = (right / TILE_SIZE).floor().clamp(0.0, max_index) as u32;
    let y0 = (top / TILE_SIZE).floor().clamp(0.0, max_index) as u32;
    let y1 = (bottom / TILE_SIZE).floor().clamp(0.0, max_index) as u32;

    let mut out = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
    for y in y0..=y1 {
        for x in x0..=x1 {
            out.push(TilePlacement {
                coords: TileCoords { x, y, z },
                sx: (x as f64 * TILE_SIZE - left) * scale,
                sy: (y as f64 * TILE_SIZE - top) * scale,
                size,
            });
        }
    }
    out
}

enum TileSlot {
    Loading,
    Ready(HtmlImageElement),
    Failed,
}

/// Raster tile images keyed by tile coordinates.
#[derive(Default)]
pub struct TileCache {
    slots: HashMap<TileCoords, TileSlot>,
}

impl TileCache {
    pub fn ready(&self, coords: &TileCoords) -> Option<&HtmlImageElement> {
        match self.slots.get(coords) {
            Some(TileSlot::Ready(img)) => Some(img),
            _ => None,
        }
    }

    /// Nearest loaded ancestor tile, with the source rectangle inside it that
    /// covers `coords`. Used as a placeholder while the exact tile loads.
    pub fn ready_ancestor(
        &self,
        coords: &TileCoords,
        max_levels: u32,
    ) -> Option<(&HtmlImageElement, f64, f64, f64)> {
        for level in 1..=max_levels.min(coords.z) {
            let parent = TileCoords {
                x: coords.x >> level,
                y: coords.y >> level,
                z: coords.z - level,
            };
            if let Some(img) = self.ready(&parent) {
                let span = TILE_SIZE / f64::from(1u32 << level);
                let sx = f64::from(coords.x - (parent.x << level)) * span;
                let sy = f64::from(coords.y - (parent.y << level)) * span;
                return Some((img, sx, sy, span));
            }
        }
        None
    }
}

/// Start loading any visible tile not already cached. `on_ready` fires after
/// each successful load so the caller can schedule a redraw.
pub fn request_tiles(
    cache: &Rc<RefCell<TileCache>>,
    placements: &[TilePlacement],
    on_ready: Rc<dyn Fn()>,
) {
    let mut pending = Vec::new();
    {
        let mut cache_mut = cache.borrow_mut();
        if cache_mut.slots.len() > MAX_CACHED_TILES {
            let keep: HashSet<TileCoords> = placements.iter().map(|p| p.coords).collect();
            cache_mut
                .slots
                .retain(|coords, slot| keep.contains(coords) || matches!(slot, TileSlot::Loading));
        }
        for placement in placements {
            if !cache_mut.slots.contains_key(&placement.coords) {
                cache_mut.slots.insert(placement.coords, TileSlot::Loading);
                pending.push(placement.coords);
            }
        }
    }
    for coords in pending {
        load_tile(cache.clone(), coords, on_ready.clone());
    }
}

fn load_tile(cache: Rc<RefCell<TileCache>>, coords: TileCoords, on_ready: Rc<dyn Fn()>) {
    let img = match HtmlImageElement::new() {
        Ok(img) => img,
        Err(_) => {
            cache.borrow_mut().slots.insert(coords, TileSlot::Failed);
            return;
        }
    };

    let img_for_load = img.clone();
    let cache_load = cache.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);
        cache_load
            .borrow_mut()
            .slots
            .insert(coords, TileSlot::Ready(img_for_load.clone()));
        on_ready();
    });

    let img_for_error = img.clone();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        web_sys::console::warn_1(
            &format!("tile {}/{}/{} failed to load", coords.z, coords.x, coords.y).into(),
        );
        cache.borrow_mut().slots.insert(coords, TileSlot::Failed);
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONLOAD_HANDLE_KEY),
        &onload_js,
    );
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONERROR_HANDLE_KEY),
        &onerror_js,
    );
    img.set_src(&coords.url());
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}

#[cfg(test)]
mod tests {
    use super::*;
    use techmap_shared::LatLng;

    #[test]
    fn url_follows_osm_template() {
        let coords = TileCoords { x: 4, y: 7, z: 3 };
        assert_eq!(coords.url(), "https://tile.openstreetmap.org/3/4/7.png");
    }

    #[test]
    fn whole_world_at_zoom_two_is_four_by_four() {
        let mut vp = Viewport::new(LatLng::new(0.0, 0.0), 2.0);
        vp.resize(1024.0, 1024.0);
        let tiles = visible_tiles(&vp);
        assert_eq!(tiles.len(), 16);
        assert!(tiles.iter().all(|t| t.coords.z == 2 && t.size == TILE_SIZE));
        assert_eq!(tiles[0].sx, 0.0);
        assert_eq!(tiles[0].sy, 0.0);
    }

    #[test]
    fn tiles_cover_the_viewport() {
        let mut vp = Viewport::new(LatLng::new(41.3275, 19.8187), 13.0);
        vp.resize(800.0, 600.0);
        let tiles = visible_tiles(&vp);
        let min_x = tiles.iter().map(|t| t.sx).fold(f64::MAX, f64::min);
        let min_y = tiles.iter().map(|t| t.sy).fold(f64::MAX, f64::min);
        let max_x = tiles.iter().map(|t| t.sx + t.size).fold(f64::MIN, f64::max);
        let max_y = tiles.iter().map(|t| t.sy + t.size).fold(f64::MIN, f64::max);
        assert!(min_x <= 0.0 && min_y <= 0.0);
        assert!(max_x >= 800.0 && max_y >= 600.0);
    }

    #[test]
    fn fractional_zoom_scales_tiles() {
        let mut vp = Viewport::new(LatLng::new(41.3275, 19.8187), 12.4);
        vp.resize(800.0, 600.0);
        let tiles = visible_tiles(&vp);
        assert!(!tiles.is_empty());
        let expected = TILE_SIZE * 2f64.powf(12.4 - 12.0);
        assert!(tiles.iter().all(|t| t.coords.z == 12 && (t.size - expected).abs() < 1e-9));
    }

    #[test]
    fn unsized_viewport_has_no_tiles() {
        let vp = Viewport::new(LatLng::new(41.3275, 19.8187), 13.0);
        assert!(visible_tiles(&vp).is_empty());
    }
}
