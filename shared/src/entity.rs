use serde::{Deserialize, Deserializer, Serialize};

pub type EntityId = u64;

/// Category used when the dataset leaves it blank.
pub const DEFAULT_CATEGORY: &str = "other";

/// Geographic position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components must be finite and non-zero. The dataset encodes
    /// "not geocoded" as `0.0`, so a literal zero is treated as absent.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        let (lat, lng) = (lat?, lng?);
        if !lat.is_finite() || !lng.is_finite() || lat == 0.0 || lng == 0.0 {
            return None;
        }
        Some(Self { lat, lng })
    }
}

/// One organization record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireEntity")]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub category: String,
    pub city: Option<String>,
    #[serde(flatten)]
    pub position: Option<LatLng>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Business registration code (NIPT).
    pub nipt: Option<String>,
    pub legal_form: Option<String>,
    pub activity_description: Option<String>,
    pub is_tech: bool,
}

impl Entity {
    pub fn has_coordinates(&self) -> bool {
        self.position.is_some()
    }
}

/// Wire shape accepted from the dataset endpoint. Blank strings and zero
/// coordinates are normalized away in the `From` conversion.
#[derive(Deserialize)]
struct WireEntity {
    id: EntityId,
    #[serde(default, deserialize_with = "blank_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    city: Option<String>,
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    lng: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    website: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    nipt: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    legal_form: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    activity_description: Option<String>,
    #[serde(default)]
    is_tech: bool,
}

impl From<WireEntity> for Entity {
    fn from(wire: WireEntity) -> Self {
        Self {
            id: wire.id,
            name: wire.name.unwrap_or_default(),
            category: wire
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            city: wire.city,
            position: LatLng::from_parts(wire.lat, wire.lng),
            website: wire.website,
            email: wire.email,
            phone: wire.phone,
            nipt: wire.nipt,
            legal_form: wire.legal_form,
            activity_description: wire.activity_description,
            is_tech: wire.is_tech,
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

/// Decode a JSON array of entities as served by the dataset endpoint.
pub fn parse_entities(json: &str) -> Result<Vec<Entity>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_endpoint_row_with_blank_fields() {
        let payload = json!([{
            "id": 7,
            "name": "Lorem Software",
            "lat": 41.3275,
            "lng": 19.8187,
            "city": "",
            "website": "https://lorem.al",
            "email": "",
            "phone": "",
            "category": "Software House",
            "nipt": "L12345678A",
            "is_tech": true,
            "activity_description": ""
        }]);

        let entities: Vec<Entity> = serde_json::from_value(payload).expect("decode");
        assert_eq!(entities.len(), 1);
        let entity = &entities[0];
        assert_eq!(entity.id, 7);
        assert_eq!(entity.city, None);
        assert_eq!(entity.email, None);
        assert_eq!(entity.website.as_deref(), Some("https://lorem.al"));
        assert_eq!(entity.nipt.as_deref(), Some("L12345678A"));
        assert_eq!(entity.position, Some(LatLng::new(41.3275, 19.8187)));
        assert!(entity.is_tech);
    }

    #[test]
    fn zero_coordinates_mean_not_geocoded() {
        let entities = parse_entities(r#"[{"id":1,"name":"A","category":"x","lat":0,"lng":0}]"#)
            .expect("decode");
        assert!(!entities[0].has_coordinates());
    }

    #[test]
    fn half_present_coordinates_are_dropped() {
        let entities =
            parse_entities(r#"[{"id":1,"name":"A","category":"x","lat":41.1}]"#).expect("decode");
        assert_eq!(entities[0].position, None);
    }

    #[test]
    fn null_fields_and_missing_category_use_defaults() {
        let entities = parse_entities(
            r#"[{"id":3,"name":"B","category":null,"city":null,"lat":null,"lng":null}]"#,
        )
        .expect("decode");
        assert_eq!(entities[0].category, DEFAULT_CATEGORY);
        assert_eq!(entities[0].city, None);
        assert!(!entities[0].has_coordinates());
    }

    #[test]
    fn accepts_latitude_longitude_aliases() {
        let entities = parse_entities(
            r#"[{"id":4,"name":"C","category":"x","latitude":41.0,"longitude":19.5}]"#,
        )
        .expect("decode");
        assert_eq!(entities[0].position, Some(LatLng::new(41.0, 19.5)));
    }

    #[test]
    fn rejects_non_array_payload() {
        assert!(parse_entities(r#"{"error":"nope"}"#).is_err());
    }
}
