use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use chatrelay_relay::BackendStatus;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Always answers 200 while the process is up; `status` is `degraded` when
/// the store or the generation backend cannot be reached.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (store_up, backend) = tokio::join!(
        state.listing.store_reachable(),
        state.relay.guard().status(),
    );

    let mut services = HashMap::new();
    services.insert(
        "store".to_string(),
        if store_up { "connected" } else { "disconnected" }.to_string(),
    );
    services.insert(
        "generation".to_string(),
        match backend {
            BackendStatus::Available => "available",
            BackendStatus::Unavailable => "unavailable",
        }
        .to_string(),
    );

    let healthy = store_up && backend == BackendStatus::Available;

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
