use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{error, warn};

use super::error::ApiError;
use super::types::*;
use crate::movies::DEFAULT_COUNT;
use crate::omdb::OmdbError;
use crate::server::AppState;
use crate::util::{parse_count, QueryParams};

/// GET /api/movies/generate?count=N
pub async fn generate_movies(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<MoviesResponse>, ApiError> {
    let count = parse_count(params.get("count"), DEFAULT_COUNT);
    let ticket = state.latest.begin();

    let fetcher = state.fetcher.clone();
    let options = state.generate_options();
    let movies = tokio::spawn(async move { fetcher.fetch_batch(count, &options).await })
        .await
        .map_err(|e| {
            error!("Error fetching movies: {}", e);
            ApiError::Internal("Failed to fetch movies")
        })?;

    state.latest.complete(ticket, movies.clone()).await;

    Ok(Json(MoviesResponse { movies }))
}

/// GET /api/movies/current - newest completed batch.
pub async fn current_movies(State(state): State<AppState>) -> Json<CurrentMoviesResponse> {
    let snapshot = state.latest.current().await;
    Json(CurrentMoviesResponse {
        movies: (*snapshot.movies).clone(),
        sequence: snapshot.sequence,
    })
}

/// GET /api/movies/:id
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieResponse>, ApiError> {
    match state.fetcher.oracle().lookup(&id).await {
        Ok(Some(movie)) => Ok(Json(MovieResponse { movie })),
        Ok(None) | Err(OmdbError::NoResults(_)) => Err(ApiError::NotFound("Movie not found")),
        Err(OmdbError::MissingApiKey) => {
            warn!("Movie lookup for {} without an OMDb API key", id);
            Err(ApiError::NotFound("Movie not found"))
        }
        Err(e) => {
            error!("Error fetching movie {}: {}", id, e);
            Err(ApiError::Internal("Failed to fetch movie"))
        }
    }
}
