use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::filter::CategoryFilter;

/// Current filter, search query and focused entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub filter: CategoryFilter,
    pub query: String,
    pub focused: Option<EntityId>,
}

impl ViewState {
    /// Lower-cased, trimmed query. Empty means "no restriction".
    pub fn normalized_query(&self) -> String {
        normalize_query(&self.query)
    }
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Lower-cased text an entity can be matched on.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchKey {
    pub name: String,
    pub category: String,
    pub city: Option<String>,
}

impl SearchKey {
    pub fn of(entity: &Entity) -> Self {
        Self {
            name: entity.name.to_lowercase(),
            category: entity.category.to_lowercase(),
            city: entity.city.as_ref().map(|c| c.to_lowercase()),
        }
    }

    /// `query` must already be normalized.
    pub fn accepts(&self, filter: CategoryFilter, query: &str) -> bool {
        if !filter.matches_lowercase(&self.category) {
            return false;
        }
        if query.is_empty() {
            return true;
        }
        self.name.contains(query)
            || self.category.contains(query)
            || self.city.as_deref().is_some_and(|city| city.contains(query))
    }
}

/// Visible subset for `(filter, query)`, in input order.
pub fn project(entities: &[Entity], filter: CategoryFilter, query: &str) -> Vec<Entity> {
    let query = normalize_query(query);
    entities
        .iter()
        .filter(|entity| SearchKey::of(entity).accepts(filter, &query))
        .cloned()
        .collect()
}

pub fn project_view(entities: &[Entity], view: &ViewState) -> Vec<Entity> {
    project(entities, view.filter, &view.query)
}
