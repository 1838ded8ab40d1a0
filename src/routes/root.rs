use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::root::ApiRoot, state::SharedState};

#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses((status = 200, description = "Links to every collection", body = ApiRoot))
)]
/// Entry point listing the browsable collections.
pub async fn api_root(State(state): State<SharedState>) -> Json<ApiRoot> {
    Json(ApiRoot::new(&state.config().site_domain))
}

pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(api_root))
}
