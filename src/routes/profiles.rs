use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::profile::{ProfileSummary, UpdateProfileRequest},
    error::AppError,
    routes::auth::require_token,
    services::{auth_service::Caller, profile_service},
    state::SharedState,
};

pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/profile/", get(list_profiles))
        .route("/profile/{id}/", get(get_profile).patch(update_profile))
        .route_layer(middleware::from_fn_with_state(state, require_token))
}

#[utoipa::path(
    get,
    path = "/profile/",
    tag = "profiles",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    responses((status = 200, description = "All profiles", body = [ProfileSummary]))
)]
pub async fn list_profiles(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ProfileSummary>>, AppError> {
    Ok(Json(profile_service::list_profiles(&state).await?))
}

#[utoipa::path(
    get,
    path = "/profile/{id}/",
    tag = "profiles",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the user")
    ),
    responses(
        (status = 200, description = "Profile", body = ProfileSummary),
        (status = 404, description = "Unknown profile")
    )
)]
pub async fn get_profile(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileSummary>, AppError> {
    Ok(Json(profile_service::get_profile(&state, id).await?))
}

/// Update goalie preferences of the caller.
#[utoipa::path(
    patch,
    path = "/profile/{id}/",
    tag = "profiles",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the user")
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileSummary),
        (status = 403, description = "Not the caller's profile")
    )
)]
pub async fn update_profile(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateProfileRequest>>,
) -> Result<Json<ProfileSummary>, AppError> {
    Ok(Json(
        profile_service::update_profile(&state, &caller, id, payload).await?,
    ))
}
