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
    dto::game::{CreateGameRequest, GameSummary, UpdateGameRequest},
    error::AppError,
    routes::auth::require_token,
    services::{auth_service::Caller, game_service},
    state::SharedState,
};

pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/game/", get(list_games).post(create_game))
        .route(
            "/game/{id}/",
            get(get_game).patch(update_game).delete(delete_game),
        )
        .route_layer(middleware::from_fn_with_state(state, require_token))
}

/// List games, soonest first.
#[utoipa::path(
    get,
    path = "/game/",
    tag = "games",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    responses((status = 200, description = "All games", body = [GameSummary]))
)]
pub async fn list_games(State(state): State<SharedState>) -> Result<Json<Vec<GameSummary>>, AppError> {
    Ok(Json(game_service::list_games(&state).await?))
}

/// Publish a game; the caller becomes its renter.
#[utoipa::path(
    post,
    path = "/game/",
    tag = "games",
    params(("Authorization" = String, Header, description = "`Token <key>`")),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameSummary),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Valid(Json(payload)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameSummary>), AppError> {
    let game = game_service::create_game(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

#[utoipa::path(
    get,
    path = "/game/{id}/",
    tag = "games",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the game")
    ),
    responses(
        (status = 200, description = "Game", body = GameSummary),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Reschedule a game. Restricted to its renter.
#[utoipa::path(
    patch,
    path = "/game/{id}/",
    tag = "games",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the game")
    ),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameSummary),
        (status = 403, description = "Caller is not the renter"),
        (status = 409, description = "Game changed concurrently")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateGameRequest>>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(
        game_service::update_game(&state, &caller, id, payload).await?,
    ))
}

/// Delete a game with its messages.
#[utoipa::path(
    delete,
    path = "/game/{id}/",
    tag = "games",
    params(
        ("Authorization" = String, Header, description = "`Token <key>`"),
        ("id" = Uuid, Path, description = "Identifier of the game")
    ),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 403, description = "Caller is not the renter")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
