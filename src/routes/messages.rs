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
    dto::message::{CreateMessageRequest, MessageSummary, UpdateMessageRequest},
    error::AppError,
    routes::auth::require_token,
    services::{auth_service::Caller, message_service},
    state::SharedState,
};

pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/message/", get(list_messages).post(create_message))
        .route(
            "/message/{id}/",
            get(get_message).patch(update_message).delete(delete_message),
        )
        .route_layer(middleware::from_fn_with_state(state, require_token))
}

/// Messages visible to the caller.
#[utoipa::path(
    get,
    path = "/message/",
    tag = "messages",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    responses((status = 200, description = "Visible messages, oldest first", body = [MessageSummary]))
)]
pub async fn list_messages(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<MessageSummary>>, AppError> {
    Ok(Json(message_service::list_messages(&state, &caller).await?))
}

#[utoipa::path(
    post,
    path = "/message/",
    tag = "messages",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message posted", body = MessageSummary),
        (status = 403, description = "Caller is neither renter nor goalie of the game")
    )
)]
pub async fn create_message(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Valid(Json(payload)): Valid<Json<CreateMessageRequest>>,
) -> Result<(StatusCode, Json<MessageSummary>), AppError> {
    let message = message_service::create_message(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/message/{id}/",
    tag = "messages",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the message")
    ),
    responses(
        (status = 200, description = "Message", body = MessageSummary),
        (status = 404, description = "Unknown or hidden message")
    )
)]
pub async fn get_message(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageSummary>, AppError> {
    Ok(Json(message_service::get_message(&state, &caller, id).await?))
}

#[utoipa::path(
    patch,
    path = "/message/{id}/",
    tag = "messages",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the message")
    ),
    request_body = UpdateMessageRequest,
    responses(
        (status = 200, description = "Message edited", body = MessageSummary),
        (status = 403, description = "Caller did not send the message")
    )
)]
pub async fn update_message(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateMessageRequest>>,
) -> Result<Json<MessageSummary>, AppError> {
    Ok(Json(
        message_service::update_message(&state, &caller, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/message/{id}/",
    tag = "messages",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the message")
    ),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, description = "Caller did not send the message")
    )
)]
pub async fn delete_message(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    message_service::delete_message(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
