use techmap_shared::{Entity, EntityId, LatLng, category_color, popup_html};

use crate::viewport::Viewport;

/// Distance from the pin tip up to the center of its round head.
pub const PIN_HEAD_OFFSET: f64 = 18.0;
pub const PIN_HEAD_RADIUS: f64 = 8.0;
/// Clicks this close to the head center (CSS px) count as hits.
const HIT_RADIUS: f64 = PIN_HEAD_RADIUS + 4.0;

/// One map pin. The popup body is built once per render, already escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub entity_id: EntityId,
    pub position: LatLng,
    pub color: (u8, u8, u8),
    pub popup_html: String,
}

impl Marker {
    fn of(entity: &Entity) -> Option<Self> {
        let position = entity.position?;
        Some(Self {
            entity_id: entity.id,
            position,
            color: category_color(&entity.category),
            popup_html: popup_html(entity),
        })
    }
}

/// The set of pins currently on the map.
///
/// Every `render` clears the previous set first, so no marker from an earlier
/// projection survives into the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    generation: u64,
}

impl MarkerLayer {
    pub fn render(&mut self, visible: &[Entity]) {
        self.clear();
        self.markers.extend(visible.iter().filter_map(Marker::of));
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: EntityId) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.entity_id == id)
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.markers.iter().map(|marker| marker.entity_id).collect()
    }

    /// Pin under a screen point. Later pins are drawn on top, so they win ties.
    pub fn hit_test(&self, vp: &Viewport, sx: f64, sy: f64) -> Option<EntityId> {
        let mut best: Option<(EntityId, f64)> = None;
        for marker in &self.markers {
            let (px, py) = vp.to_screen(marker.position);
            let dx = sx - px;
            let dy = sy - (py - PIN_HEAD_OFFSET);
            let dist_sq = dx * dx + dy * dy;
            if dist_sq > HIT_RADIUS * HIT_RADIUS {
                continue;
            }
            if best.is_none_or(|(_, d)| dist_sq <= d) {
                best = Some((marker.entity_id, dist_sq));
            }
        }
        best.map(|(id, _)| id)
    }
}
