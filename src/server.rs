use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::favorites::FavoritesStore;
use crate::movies::{BatchFetcher, FetchOptions, LatestBatch, SEARCH_TERMS};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<BatchFetcher>,
    pub latest: Arc<LatestBatch>,
    pub favorites: Arc<RwLock<FavoritesStore>>,
}

impl AppState {
    pub fn new(config: Config, fetcher: BatchFetcher, favorites: FavoritesStore) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            latest: Arc::new(LatestBatch::new()),
            favorites: Arc::new(RwLock::new(favorites)),
        }
    }

    /// Options for on-demand batches.
    pub fn generate_options(&self) -> FetchOptions {
        let omdb = &self.config.omdb;
        FetchOptions {
            pages: omdb.pages,
            pause: omdb.pause(),
            max_terms: omdb.max_terms.unwrap_or(SEARCH_TERMS.len()),
        }
    }

    /// Options for the batch fetched while starting up.
    pub fn startup_options(&self) -> FetchOptions {
        FetchOptions {
            pages: self.config.omdb.startup_pages,
            ..self.generate_options()
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/movies/generate",
            get(crate::api::generate_movies),
        )
        .route("/api/movies/current", get(crate::api::current_movies))
        .route("/api/movies/:id", get(crate::api::get_movie))
        .route(
            "/api/favorites",
            get(crate::api::list_favorites).delete(crate::api::clear_favorites),
        )
        .route("/api/favorites/toggle", post(crate::api::toggle_favorite))
        .route("/api/favorites/:id", get(crate::api::favorite_status));

    let mut router = Router::new()
        .route("/health", get(crate::api::health))
        .merge(api_routes);

    if let Some(ref appdir) = state.config.appdir {
        router = router.fallback_service(ServeDir::new(appdir));
    }

    router
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
