use axum::{extract::State, Json};

use super::types::HealthResponse;
use crate::server::AppState;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        has_api_key: state.fetcher.has_credential(),
    })
}
