//! Entity builders for tests in this crate and its dependents.

use crate::entity::{Entity, LatLng};

/// Located entity; latitude steps with `id` so positions never collide.
pub fn entity(id: u64, name: &str, category: &str, city: Option<&str>) -> Entity {
    Entity {
        id,
        name: name.to_string(),
        category: category.to_string(),
        city: city.map(str::to_string),
        position: Some(LatLng::new(41.3 + id as f64 * 0.01, 19.8)),
        website: None,
        email: None,
        phone: None,
        nipt: None,
        legal_form: None,
        activity_description: None,
        is_tech: true,
    }
}

pub fn without_position(mut entity: Entity) -> Entity {
    entity.position = None;
    entity
}

pub fn tirana_and_durres() -> Vec<Entity> {
    vec![
        entity(1, "Alpha Code", "Software House", Some("Tirana")),
        entity(2, "Beta Studio", "Digital Agency", Some("Durrës")),
    ]
}
