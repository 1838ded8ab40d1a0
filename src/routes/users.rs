use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::user::{CreateUserRequest, UpdateUserRequest, UserSummary},
    error::AppError,
    routes::auth::require_token,
    services::{auth_service::Caller, user_service},
    state::SharedState,
};

/// Registration is public, everything else needs a token.
pub fn router(state: SharedState) -> Router<SharedState> {
    let registration = Router::new().route("/user/", post(create_user));

    let accounts = Router::new()
        .route("/user/", get(list_users))
        .route(
            "/user/{id}/",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, require_token));

    registration.merge(accounts)
}

#[utoipa::path(
    get,
    path = "/user/",
    tag = "users",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    responses((status = 200, description = "All accounts", body = [UserSummary]))
)]
pub async fn list_users(State(state): State<SharedState>) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(user_service::list_users(&state).await?))
}

/// Register an account. It stays inactive until the emailed link is followed.
#[utoipa::path(
    post,
    path = "/user/",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserSummary),
        (status = 400, description = "Invalid payload or username/email taken")
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<UserSummary>), AppError> {
    let user = user_service::create_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/user/{id}/",
    tag = "users",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the user")
    ),
    responses(
        (status = 200, description = "Account", body = UserSummary),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(user_service::get_user(&state, id).await?))
}

#[utoipa::path(
    patch,
    path = "/user/{id}/",
    tag = "users",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the user")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = UserSummary),
        (status = 403, description = "Not the caller's account")
    )
)]
pub async fn update_user(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateUserRequest>>,
) -> Result<Json<UserSummary>, AppError> {
    Ok(Json(
        user_service::update_user(&state, &caller, id, payload).await?,
    ))
}

/// Delete an account with the games it rents; slots it holds are freed.
#[utoipa::path(
    delete,
    path = "/user/{id}/",
    tag = "users",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the user")
    ),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 403, description = "Not the caller's account")
    )
)]
pub async fn delete_user(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user_service::delete_user(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
