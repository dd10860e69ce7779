use std::collections::HashSet;

use crate::omdb::MovieSummary;

/// Favorites in insertion order with an id index. Both halves are private
/// and only change together, so the index always holds exactly the ids of
/// the listed items.
#[derive(Debug, Clone, Default)]
pub struct FavoriteSet {
    items: Vec<MovieSummary>,
    ids: HashSet<String>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later duplicates of an id are dropped.
    pub fn from_items(items: Vec<MovieSummary>) -> Self {
        let mut set = Self::new();
        for item in items {
            if !set.contains(&item.id) {
                set.ids.insert(item.id.clone());
                set.items.push(item);
            }
        }
        set
    }

    /// Removes `item` if its id is present, appends it otherwise. Returns
    /// whether the id is a favorite afterwards.
    pub fn toggle(&mut self, item: MovieSummary) -> bool {
        if self.ids.remove(&item.id) {
            self.items.retain(|m| m.id != item.id);
            false
        } else {
            self.ids.insert(item.id.clone());
            self.items.push(item);
            true
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
