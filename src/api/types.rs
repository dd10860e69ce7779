use serde::{Deserialize, Serialize};

use crate::omdb::{MovieDetail, MovieSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviesResponse {
    pub movies: Vec<MovieSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMoviesResponse {
    pub movies: Vec<MovieSummary>,
    pub sequence: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieResponse {
    pub movie: MovieDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<MovieSummary>,
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteResponse {
    pub id: String,
    pub is_favorite: bool,
    pub favorites: Vec<MovieSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatus {
    pub id: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub has_api_key: bool,
}
