use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info};

use super::set::FavoriteSet;
use crate::db::KeyValueRepo;
use crate::omdb::MovieSummary;

/// Storage key holding the JSON array of favorites.
pub const FAVORITES_KEY: &str = "movie-favorites";

/// The user's favorites, written through to a [`KeyValueRepo`] on every
/// change once the stored state has been loaded.
///
/// A fresh store is not ready: mutations before [`FavoritesStore::hydrate`]
/// stay in memory only, so they can never overwrite favorites that have not
/// been read yet. Storage failures are logged and otherwise ignored; memory
/// stays authoritative.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueRepo>,
    set: FavoriteSet,
    ready: bool,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn KeyValueRepo>) -> Self {
        Self {
            storage,
            set: FavoriteSet::new(),
            ready: false,
        }
    }

    pub async fn load(storage: Arc<dyn KeyValueRepo>) -> Self {
        let mut store = Self::new(storage);
        store.hydrate().await;
        store
    }

    /// Replaces the in-memory set with the stored one. A missing or
    /// unreadable entry yields an empty set. Always leaves the store ready.
    pub async fn hydrate(&mut self) {
        self.set = match self.storage.get_item(FAVORITES_KEY).await {
            Ok(Some(stored)) => match serde_json::from_str::<Vec<MovieSummary>>(&stored) {
                Ok(items) => FavoriteSet::from_items(items),
                Err(e) => {
                    error!("Error loading favorites from storage: {}", e);
                    FavoriteSet::new()
                }
            },
            Ok(None) => FavoriteSet::new(),
            Err(e) => {
                error!("Error loading favorites from storage: {}", e);
                FavoriteSet::new()
            }
        };
        self.ready = true;
        info!("Loaded {} favorites", self.set.len());
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub async fn toggle(&mut self, item: MovieSummary) -> bool {
        let favorite = self.set.toggle(item);
        self.persist().await;
        favorite
    }

    pub async fn clear(&mut self) {
        self.set.clear();
        self.persist().await;
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    pub fn favorites(&self) -> &[MovieSummary] {
        self.set.items()
    }

    pub fn favorite_ids(&self) -> &HashSet<String> {
        self.set.ids()
    }

    async fn persist(&self) {
        if !self.ready {
            return;
        }
        let json = match serde_json::to_string(self.set.items()) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing favorites: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(FAVORITES_KEY, &json).await {
            error!("Error saving favorites to storage: {}", e);
        }
    }
}
