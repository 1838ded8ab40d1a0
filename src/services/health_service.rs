use tracing::warn;

use crate::{dto::health::HealthResponse, state::AppState};

/// Ping the store and report whether requests are currently served.
pub async fn health_status(state: &AppState) -> HealthResponse {
    let reachable = match state.store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                false
            }
        },
        None => {
            warn!("no storage installed (degraded mode)");
            false
        }
    };

    HealthResponse::new(state.is_degraded(), reachable)
}
