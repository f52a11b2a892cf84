use crate::entity::{Entity, EntityId};
use crate::projection::{SearchKey, ViewState};

/// Authoritative in-memory entity list. `load` is the only mutation path.
#[derive(Debug, Default)]
pub struct DataStore {
    entities: Vec<Entity>,
    keys: Vec<SearchKey>,
    generation: u64,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full set and rebuild the search-key cache.
    pub fn load(&mut self, entities: Vec<Entity>) {
        self.keys = entities.iter().map(SearchKey::of).collect();
        self.entities = entities;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn all(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Bumped on every `load`; zero until the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Same result as [`crate::project_view`] over `all()`, using cached keys.
    pub fn project(&self, view: &ViewState) -> Vec<Entity> {
        let query = view.normalized_query();
        self.entities
            .iter()
            .zip(&self.keys)
            .filter(|(_, key)| key.accepts(view.filter, &query))
            .map(|(entity, _)| entity.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::DataStore;
    use crate::filter::CategoryFilter;
    use crate::fixtures::{entity, tirana_and_durres};
    use crate::projection::{ViewState, project_view};

    #[test]
    fn empty_store_projects_nothing() {
        let store = DataStore::new();
        assert!(store.is_empty());
        assert_eq!(store.generation(), 0);
        assert!(store.project(&ViewState::default()).is_empty());
    }

    #[test]
    fn load_replaces_entities_and_bumps_generation() {
        let mut store = DataStore::new();
        store.load(tirana_and_durres());
        assert_eq!(store.len(), 2);
        assert_eq!(store.generation(), 1);

        store.load(vec![entity(9, "Solo", "software", None)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.generation(), 2);
        assert!(store.get(1).is_none());
        assert_eq!(store.get(9).map(|e| e.name.as_str()), Some("Solo"));
    }

    #[test]
    fn reload_resets_cached_search_keys() {
        let mut store = DataStore::new();
        store.load(tirana_and_durres());
        let view = ViewState {
            query: "tira".into(),
            ..ViewState::default()
        };
        assert_eq!(store.project(&view).len(), 1);

        store.load(vec![entity(3, "Other", "software", Some("Shkodër"))]);
        assert!(store.project(&view).is_empty());
    }

    #[test]
    fn cached_projection_matches_pure_projection() {
        let mut store = DataStore::new();
        store.load(vec![
            entity(1, "Alpha Code", "Software House", Some("Tirana")),
            entity(2, "Beta Studio", "Digital Agency", Some("Durrës")),
            entity(3, "Gamma", "IT Services", None),
            entity(4, "Delta Software", "software", Some("Tiranë")),
        ]);
        for filter in CategoryFilter::ALL {
            for query in ["", "ti", "SOFT", "gam", "x"] {
                let view = ViewState {
                    filter,
                    query: query.to_string(),
                    focused: None,
                };
                assert_eq!(store.project(&view), project_view(store.all(), &view));
            }
        }
    }
}
