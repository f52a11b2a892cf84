use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use techmap_shared::{Entity, EntityId};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("duplicate organization id {0}")]
    DuplicateId(EntityId),
    #[error("failed to encode dataset: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One row of the data file. Rows marked inactive are dropped on load.
#[derive(Debug, Deserialize)]
pub struct CompanyRecord {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Pre-serialized JSON body plus its validator.
#[derive(Debug, Clone)]
pub struct Payload {
    pub body: Bytes,
    pub etag: String,
}

impl Payload {
    pub fn encode<'a>(
        entities: impl IntoIterator<Item = &'a Entity>,
    ) -> Result<Self, serde_json::Error> {
        let entities: Vec<&Entity> = entities.into_iter().collect();
        let body = Bytes::from(serde_json::to_vec(&entities)?);
        let etag = format!("\"{:08x}\"", crc32fast::hash(&body));
        Ok(Self { body, etag })
    }
}

/// Active organizations, immutable after startup. The two unfiltered
/// responses are serialized once.
#[derive(Debug)]
pub struct Dataset {
    entities: Vec<Entity>,
    all: Payload,
    located: Payload,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<CompanyRecord> =
            serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<CompanyRecord>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut entities = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.entity.id) {
                return Err(DatasetError::DuplicateId(record.entity.id));
            }
            if record.active {
                entities.push(record.entity);
            }
        }

        let all = Payload::encode(&entities)?;
        let located = Payload::encode(entities.iter().filter(|e| e.has_coordinates()))?;
        Ok(Self {
            entities,
            all,
            located,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn with_coordinates(&self) -> usize {
        self.entities.iter().filter(|e| e.has_coordinates()).count()
    }

    /// Every active organization, located or not.
    pub fn all(&self) -> &Payload {
        &self.all
    }

    /// Active organizations that can be placed on the map.
    pub fn located(&self) -> &Payload {
        &self.located
    }

    /// `located()` restricted to cities containing `city`, case-insensitively.
    pub fn located_in_city(&self, city: &str) -> Result<Payload, serde_json::Error> {
        let needle = city.trim().to_lowercase();
        Payload::encode(self.entities.iter().filter(|e| {
            e.has_coordinates()
                && e
                    .city
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
        }))
    }
}


#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::fixtures::{dataset, records};
    use super::*;

    fn ids(payload: &Payload) -> Vec<u64> {
        let entities: Vec<Entity> =
            serde_json::from_slice(&payload.body).expect("payload decodes as entities");
        entities.into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn inactive_rows_are_dropped() {
        let dataset = dataset();
        assert_eq!(dataset.len(), 3);
        assert_eq!(ids(dataset.all()), vec![1, 2, 3]);
    }

    #[test]
    fn located_excludes_missing_coordinates() {
        let dataset = dataset();
        assert_eq!(dataset.with_coordinates(), 2);
        assert_eq!(ids(dataset.located()), vec![1, 2]);
    }

    #[test]
    fn city_filter_is_case_insensitive_substring() {
        let dataset = dataset();
        let payload = dataset.located_in_city("TIRA").expect("encode");
        assert_eq!(ids(&payload), vec![1]);
        let payload = dataset.located_in_city("shkod").expect("encode");
        assert!(ids(&payload).is_empty());
    }

    #[test]
    fn blank_category_is_served_as_other() {
        let dataset = dataset();
        let entities: Vec<Entity> = serde_json::from_slice(&dataset.all().body).expect("decode");
        assert_eq!(entities[2].category, "other");
    }

    #[test]
    fn etag_tracks_body() {
        let dataset = dataset();
        assert_ne!(dataset.all().etag, dataset.located().etag);
        let again = Payload::encode(dataset.entities.iter().filter(|e| e.has_coordinates()))
            .expect("encode");
        assert_eq!(again.etag, dataset.located().etag);
        assert!(again.etag.starts_with('"') && again.etag.ends_with('"'));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut rows = records();
        let mut dup = records();
        rows.push(dup.remove(0));
        assert!(matches!(
            Dataset::from_records(rows),
            Err(DatasetError::DuplicateId(1))
        ));
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let missing = std::env::temp_dir().join("techmap-missing-dataset.json");
        let err = Dataset::load(&missing).expect_err("missing file");
        assert!(matches!(err, DatasetError::Read { .. }));
        assert!(err.to_string().contains("techmap-missing-dataset.json"));

        let bad = std::env::temp_dir().join(format!("techmap-bad-{}.json", std::process::id()));
        std::fs::File::create(&bad)
            .and_then(|mut f| f.write_all(b"{\"not\": \"an array\"}"))
            .expect("write temp file");
        let err = Dataset::load(&bad).expect_err("bad json");
        assert!(matches!(err, DatasetError::Parse { .. }));
        let _ = std::fs::remove_file(&bad);
    }
}
