use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    dto::auth::{
        CheckEmailRequest, CheckUsernameRequest, TokenRequest, TokenResponse, UniqueResponse,
    },
    error::AppError,
    services::{auth_service, user_service},
    state::SharedState,
};

const ACTIVATED: &str =
    "Thank you for your email confirmation. Now you can login to your account.";
const INVALID_LINK: &str = "Activation link is invalid!";

/// Public authentication endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api-token-auth/", post(obtain_token))
        .route("/activate/{uid}/{token}/", get(activate))
        .route("/check-username/", post(check_username))
        .route("/check-email/", post(check_email))
}

/// Reject requests without a valid `Authorization: Token <key>` header and expose the
/// authenticated [`auth_service::Caller`] to handlers.
pub async fn require_token(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| {
            AppError::unauthorized("Authentication credentials were not provided.")
        })?;

    let caller = auth_service::authenticate(&state, &header).await?;
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Exchange credentials for an API token.
#[utoipa::path(
    post,
    path = "/api-token-auth/",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token of the user", body = TokenResponse),
        (status = 400, description = "Bad credentials or inactive account")
    )
)]
pub async fn obtain_token(
    State(state): State<SharedState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    Ok(Json(auth_service::obtain_token(&state, payload).await?))
}

/// Follow the link mailed at registration.
#[utoipa::path(
    get,
    path = "/activate/{uid}/{token}/",
    tag = "auth",
    params(
        ("uid" = String, Path, description = "Identifier of the user"),
        ("token" = String, Path, description = "Activation token")
    ),
    responses((status = 200, description = "Plain text activation result", body = String))
)]
pub async fn activate(
    State(state): State<SharedState>,
    Path((uid, token)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let message = if auth_service::activate(&state, &uid, &token).await? {
        ACTIVATED
    } else {
        INVALID_LINK
    };
    Ok((StatusCode::OK, message).into_response())
}

/// Whether a username is still free.
#[utoipa::path(
    post,
    path = "/check-username/",
    tag = "auth",
    request_body = CheckUsernameRequest,
    responses(
        (status = 200, description = "Uniqueness of the username", body = UniqueResponse),
        (status = 400, description = "Missing username")
    )
)]
pub async fn check_username(
    State(state): State<SharedState>,
    Json(payload): Json<CheckUsernameRequest>,
) -> Result<Json<UniqueResponse>, AppError> {
    Ok(Json(user_service::check_username(&state, payload).await?))
}

/// Whether an email address is still free.
#[utoipa::path(
    post,
    path = "/check-email/",
    tag = "auth",
    request_body = CheckEmailRequest,
    responses(
        (status = 200, description = "Uniqueness of the email", body = UniqueResponse),
        (status = 400, description = "Missing email")
    )
)]
pub async fn check_email(
    State(state): State<SharedState>,
    Json(payload): Json<CheckEmailRequest>,
) -> Result<Json<UniqueResponse>, AppError> {
    Ok(Json(user_service::check_email(&state, payload).await?))
}
