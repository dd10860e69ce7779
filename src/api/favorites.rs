use axum::{
    extract::{Path, State},
    Json,
};

use super::error::ApiError;
use super::types::*;
use crate::omdb::MovieSummary;
use crate::server::AppState;

pub async fn list_favorites(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let store = state.favorites.read().await;
    Json(FavoritesResponse {
        favorites: store.favorites().to_vec(),
        ready: store.is_ready(),
    })
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Json(movie): Json<MovieSummary>,
) -> Result<Json<ToggleFavoriteResponse>, ApiError> {
    if movie.id.trim().is_empty() {
        return Err(ApiError::BadRequest("Movie id is required"));
    }

    let id = movie.id.clone();
    let mut store = state.favorites.write().await;
    let is_favorite = store.toggle(movie).await;

    Ok(Json(ToggleFavoriteResponse {
        id,
        is_favorite,
        favorites: store.favorites().to_vec(),
    }))
}

pub async fn clear_favorites(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let mut store = state.favorites.write().await;
    store.clear().await;
    Json(FavoritesResponse {
        favorites: Vec::new(),
        ready: store.is_ready(),
    })
}

pub async fn favorite_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<FavoriteStatus> {
    let store = state.favorites.read().await;
    let is_favorite = store.is_favorite(&id);
    Json(FavoriteStatus { id, is_favorite })
}
