pub mod api;
pub mod config;
pub mod db;
pub mod favorites;
pub mod middleware;
pub mod movies;
pub mod omdb;
pub mod server;
pub mod util;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),
    #[error("OMDb client error: {0}")]
    Omdb(#[from] omdb::OmdbError),
    #[error("Server error: {0}")]
    Server(String),
}

/// Fetches the first batch in the background so startup does not wait on
/// the catalog.
pub fn spawn_startup_batch(state: &server::AppState) {
    let ticket = state.latest.begin();
    let fetcher = state.fetcher.clone();
    let latest = state.latest.clone();
    let options = state.startup_options();
    tokio::spawn(async move {
        let movies = fetcher.fetch_batch(movies::DEFAULT_COUNT, &options).await;
        let count = movies.len();
        if latest.complete(ticket, movies).await {
            info!("Initial batch ready with {} movies", count);
        }
    });
}

pub async fn run(config_path: &str, debug_logs: bool) -> Result<(), ServerError> {
    let config = config::Config::load(config_path)?;

    info!("Using config file: {}", config_path);
    if debug_logs {
        info!("Debug logging enabled");
    }

    let db_url = config.get_database_url();
    info!("Opening database at {}", db_url);
    let db: Arc<dyn db::KeyValueRepo> = Arc::new(db::SqliteRepository::new(&db_url).await?);

    let api_key = config.api_key();
    if api_key.is_some() {
        info!("OMDb API key: configured");
    } else {
        warn!("OMDb API key: NOT CONFIGURED, set omdb.apikey or OMDBKEY");
    }
    let client = omdb::OmdbClient::new(
        config.omdb.baseurl.clone(),
        api_key,
        config.omdb.timeout(),
    )?;
    let fetcher = movies::BatchFetcher::new(Arc::new(client));

    let favorites = favorites::FavoritesStore::load(db).await;

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let tls = match (&config.listen.tlscert, &config.listen.tlskey) {
        (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
        _ => None,
    };

    let state = server::AppState::new(config, fetcher, favorites);
    spawn_startup_batch(&state);
    let app = server::build_router(state);

    if let Some((cert_path, key_path)) = tls {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}
