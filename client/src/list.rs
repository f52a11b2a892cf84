use techmap_shared::{Entity, EntityId, category_color, labels};

#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub entity_id: EntityId,
    pub name: String,
    pub category: String,
    pub city: Option<String>,
    pub badge_color: (u8, u8, u8),
    /// Rows without coordinates are listed but clicking them does nothing.
    pub focusable: bool,
}

impl ListRow {
    fn of(entity: &Entity) -> Self {
        Self {
            entity_id: entity.id,
            name: entity.name.clone(),
            category: entity.category.clone(),
            city: entity.city.clone(),
            badge_color: category_color(&entity.category),
            focusable: entity.has_coordinates(),
        }
    }
}

/// Sidebar content: the visible subset in projection order, or the
/// "no results" placeholder when it is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListModel {
    rows: Vec<ListRow>,
    generation: u64,
}

impl ListModel {
    /// Rebuild from scratch. Rows are plain text; the view layer never
    /// interprets them as markup.
    pub fn render(&mut self, visible: &[Entity]) {
        self.rows.clear();
        self.rows.extend(visible.iter().map(ListRow::of));
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.rows.iter().map(|row| row.entity_id).collect()
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(labels::NO_RESULTS)
    }
}
