pub mod set;
pub mod store;

pub use set::FavoriteSet;
pub use store::{FavoritesStore, FAVORITES_KEY};
