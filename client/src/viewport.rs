use std::f64::consts::PI;

use techmap_shared::LatLng;
use techmap_shared::config::{MAX_ZOOM, MIN_ZOOM};

/// Edge length of one slippy-map tile in CSS pixels.
pub const TILE_SIZE: f64 = 256.0;
/// Web Mercator is undefined past this latitude.
const MAX_LATITUDE: f64 = 85.051_128_78;
const ZOOM_SENSITIVITY: f64 = 0.002;

/// Project a position to Web Mercator pixel space at `zoom`.
pub fn world_px(pos: LatLng, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat_rad = pos.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (pos.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * scale;
    (x, y)
}

/// Inverse of [`world_px`].
pub fn world_to_latlng(x: f64, y: f64, zoom: f64) -> LatLng {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lng = x / scale * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / scale;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Center/zoom of the visible map plus the size of the surface it is drawn on.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width: 0.0,
            height: 0.0,
        }
    }

    /// Returns `true` when the size actually changed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn to_screen(&self, pos: LatLng) -> (f64, f64) {
        let (cx, cy) = world_px(self.center, self.zoom);
        let (px, py) = world_px(pos, self.zoom);
        (px - cx + self.width / 2.0, py - cy + self.height / 2.0)
    }

    pub fn to_latlng(&self, sx: f64, sy: f64) -> LatLng {
        let (cx, cy) = world_px(self.center, self.zoom);
        world_to_latlng(
            cx + sx - self.width / 2.0,
            cy + sy - self.height / 2.0,
            self.zoom,
        )
    }

    /// World pixel of the top-left screen corner.
    pub fn origin_px(&self) -> (f64, f64) {
        let (cx, cy) = world_px(self.center, self.zoom);
        (cx - self.width / 2.0, cy - self.height / 2.0)
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Pan by a screen-space drag delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center = self.to_latlng(self.width / 2.0 - dx, self.height / 2.0 - dy);
    }

    /// Zoom toward a focus point (screen coordinates), keeping it fixed.
    pub fn zoom_at(&mut self, delta: f64, sx: f64, sy: f64) {
        let new_zoom = (self.zoom - delta * ZOOM_SENSITIVITY).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == self.zoom {
            return;
        }
        let anchor = self.to_latlng(sx, sy);
        self.zoom = new_zoom;
        let (ax, ay) = world_px(anchor, new_zoom);
        self.center = world_to_latlng(
            ax - (sx - self.width / 2.0),
            ay - (sy - self.height / 2.0),
            new_zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIRANA: LatLng = LatLng::new(41.3275, 19.8187);

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    fn sized(center: LatLng, zoom: f64) -> Viewport {
        let mut vp = Viewport::new(center, zoom);
        vp.resize(800.0, 600.0);
        vp
    }

    #[test]
    fn world_projection_round_trips() {
        for zoom in [2.0, 8.0, 13.5, 19.0] {
            let (x, y) = world_px(TIRANA, zoom);
            let back = world_to_latlng(x, y, zoom);
            assert_close(back.lat, TIRANA.lat, 1e-9);
            assert_close(back.lng, TIRANA.lng, 1e-9);
        }
    }

    #[test]
    fn null_island_maps_to_world_center() {
        let (x, y) = world_px(LatLng::new(0.0, 0.0), 0.0);
        assert_close(x, TILE_SIZE / 2.0, 1e-9);
        assert_close(y, TILE_SIZE / 2.0, 1e-9);
    }

    #[test]
    fn center_projects_to_screen_middle() {
        let vp = sized(TIRANA, 13.0);
        let (sx, sy) = vp.to_screen(TIRANA);
        assert_close(sx, 400.0, 1e-6);
        assert_close(sy, 300.0, 1e-6);
    }

    #[test]
    fn screen_latlng_round_trip() {
        let vp = sized(TIRANA, 12.0);
        let pos = vp.to_latlng(123.0, 456.0);
        let (sx, sy) = vp.to_screen(pos);
        assert_close(sx, 123.0, 1e-6);
        assert_close(sy, 456.0, 1e-6);
    }

    #[test]
    fn pan_moves_content_with_the_drag() {
        let mut vp = sized(TIRANA, 13.0);
        vp.pan(50.0, -20.0);
        let (sx, sy) = vp.to_screen(TIRANA);
        assert_close(sx, 450.0, 1e-6);
        assert_close(sy, 280.0, 1e-6);
    }

    #[test]
    fn zoom_at_keeps_focus_point_fixed() {
        let mut vp = sized(TIRANA, 10.0);
        let focus = vp.to_latlng(200.0, 150.0);
        vp.zoom_at(-500.0, 200.0, 150.0);
        assert_close(vp.zoom, 11.0, 1e-9);
        let (sx, sy) = vp.to_screen(focus);
        assert_close(sx, 200.0, 1e-6);
        assert_close(sy, 150.0, 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = sized(TIRANA, 18.5);
        vp.zoom_at(-10_000.0, 400.0, 300.0);
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.set_view(TIRANA, -3.0);
        assert_eq!(vp.zoom, MIN_ZOOM);
    }

    #[test]
    fn resize_reports_changes_only() {
        let mut vp = Viewport::new(TIRANA, 13.0);
        assert!(vp.resize(800.0, 600.0));
        assert!(!vp.resize(800.0, 600.0));
    }
}
