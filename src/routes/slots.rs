use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    routing::post,
};

use crate::{
    dto::assignment::{ApplyResponse, ReleaseResponse, SlotRequest},
    error::AppError,
    routes::auth::require_token,
    services::{auth_service::Caller, release},
    state::{
        SharedState,
        slots::{AssignOutcome, ReleaseOutcome},
    },
};

/// Goalie apply and release endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/apply/", post(apply))
        .route("/release/", post(release_goalie))
        .route_layer(middleware::from_fn_with_state(state, require_token))
}

/// Put a goalie on a game, first come first served.
#[utoipa::path(
    post,
    path = "/apply/",
    tag = "slots",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    request_body = SlotRequest,
    responses(
        (status = 202, description = "Goalie assigned to a slot", body = ApplyResponse),
        (status = 200, description = "Goalie queued while the game is fresh", body = ApplyResponse),
        (status = 410, description = "Game already filled", body = ApplyResponse),
        (status = 400, description = "Missing or malformed field"),
        (status = 404, description = "Unknown game or goalie"),
        (status = 409, description = "Game changed concurrently")
    )
)]
pub async fn apply(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<SlotRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    tracing::debug!(caller = %caller.id, "apply requested");
    let Json(payload) = payload?;
    let outcome = state.assignment().apply(&state, payload).await?;
    let status = match outcome {
        AssignOutcome::Assigned(_) => StatusCode::ACCEPTED,
        AssignOutcome::Queued => StatusCode::OK,
        AssignOutcome::Full => StatusCode::GONE,
    };
    Ok((status, Json(outcome.into())))
}

/// Take a goalie off a game.
#[utoipa::path(
    post,
    path = "/release/",
    tag = "slots",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    request_body = SlotRequest,
    responses(
        (status = 202, description = "Goalie removed", body = ReleaseResponse),
        (status = 400, description = "Goalie not assigned, or missing field", body = ReleaseResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn release_goalie(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<SlotRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReleaseResponse>), AppError> {
    tracing::debug!(caller = %caller.id, "release requested");
    let Json(payload) = payload?;
    let outcome = release::release(&state, payload).await?;
    let status = match outcome {
        ReleaseOutcome::Released(_) => StatusCode::ACCEPTED,
        ReleaseOutcome::NotAssigned => StatusCode::BAD_REQUEST,
    };
    Ok((status, Json(outcome.into())))
}
