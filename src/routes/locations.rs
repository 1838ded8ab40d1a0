use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::location::{CreateLocationRequest, LocationSummary},
    error::AppError,
    routes::auth::require_token,
    services::{auth_service::Caller, location_service},
    state::SharedState,
};

pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/location/", get(list_locations).post(create_location))
        .route("/location/{id}/", get(get_location))
        .route_layer(middleware::from_fn_with_state(state, require_token))
}

#[utoipa::path(
    get,
    path = "/location/",
    tag = "locations",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    responses((status = 200, description = "All rinks", body = [LocationSummary]))
)]
pub async fn list_locations(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LocationSummary>>, AppError> {
    Ok(Json(location_service::list_locations(&state).await?))
}

/// Register a rink (staff only).
#[utoipa::path(
    post,
    path = "/location/",
    tag = "locations",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created", body = LocationSummary),
        (status = 403, description = "Caller is not staff")
    )
)]
pub async fn create_location(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Valid(Json(payload)): Valid<Json<CreateLocationRequest>>,
) -> Result<(StatusCode, Json<LocationSummary>), AppError> {
    let location = location_service::create_location(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

#[utoipa::path(
    get,
    path = "/location/{id}/",
    tag = "locations",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the location")
    ),
    responses(
        (status = 200, description = "Location", body = LocationSummary),
        (status = 404, description = "Unknown location")
    )
)]
pub async fn get_location(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LocationSummary>, AppError> {
    Ok(Json(location_service::get_location(&state, id).await?))
}
