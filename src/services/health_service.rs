use tracing::warn;

use crate::{dto::health::HealthResponse, state::AppState};

/// Report `degraded` when the game store does not answer.
pub async fn health_status(state: &AppState) -> HealthResponse {
    match state.games().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}
