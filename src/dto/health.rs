use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" or "degraded".
    pub status: &'static str,
    /// Whether the last storage ping succeeded.
    pub storage_reachable: bool,
}

impl HealthResponse {
    pub fn new(degraded: bool, storage_reachable: bool) -> Self {
        Self {
            status: if degraded { "degraded" } else { "ok" },
            storage_reachable,
        }
    }
}
