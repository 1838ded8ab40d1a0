use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{DEFAULT_SKILL_LEVEL, GameEntity},
        store::Store,
    },
    dto::game::{CreateGameRequest, GameSummary, UpdateGameRequest},
    error::ServiceError,
    services::auth_service::Caller,
    state::AppState,
};

/// Load a game or fail with [`ServiceError::NotFound`].
pub async fn load_game(store: &dyn Store, id: Uuid) -> Result<GameEntity, ServiceError> {
    store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))
}

/// [`load_game`] for callers holding the game's lock. An unknown id also drops the lock
/// entry, so requests for made-up games leave nothing behind.
pub async fn load_locked_game(
    state: &AppState,
    store: &dyn Store,
    id: Uuid,
) -> Result<GameEntity, ServiceError> {
    let loaded = load_game(store, id).await;
    if matches!(loaded, Err(ServiceError::NotFound(_))) {
        state.game_locks().forget(id);
    }
    loaded
}

/// Persist `game` if nobody wrote it since it was loaded, bumping its version.
pub async fn save_versioned(store: &dyn Store, game: &mut GameEntity) -> Result<(), ServiceError> {
    let expected = game.version;
    game.version = expected + 1;
    game.updated_at = SystemTime::now();

    if store.replace_game(game.clone(), expected).await? {
        return Ok(());
    }

    game.version = expected;
    Err(ServiceError::InvalidState(format!(
        "game `{}` was modified concurrently",
        game.id
    )))
}

/// Every game, earliest first.
pub async fn list_games(state: &AppState) -> Result<Vec<GameSummary>, ServiceError> {
    let store = state.require_store().await?;
    let mut games = store.list_games().await?;
    games.sort_by_key(|game| game.game_time);
    Ok(games.into_iter().map(Into::into).collect())
}

pub async fn get_game(state: &AppState, id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_store().await?;
    load_game(store.as_ref(), id).await.map(Into::into)
}

/// Publish a new game with empty slots; the caller becomes its renter.
pub async fn create_game(
    state: &AppState,
    caller: &Caller,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let game_time = parse_game_time(&request.game_time)?;
    let store = state.require_store().await?;
    ensure_location(store.as_ref(), request.location).await?;

    let game = GameEntity::new(
        Some(caller.id),
        request.location,
        game_time,
        request.skill_level.unwrap_or(DEFAULT_SKILL_LEVEL),
        request.two_goalies_needed,
    );
    store.save_game(game.clone()).await?;
    info!(game_id = %game.id, renter = %caller.id, "game created");
    Ok(game.into())
}

/// Change schedule details of a game. Slots and `two_goalies_needed` stay untouched.
pub async fn update_game(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    request: UpdateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let game_time = request
        .game_time
        .as_deref()
        .map(parse_game_time)
        .transpose()?;
    let store = state.require_store().await?;

    let _guard = state.game_locks().lock(id).await;
    let mut game = load_locked_game(state, store.as_ref(), id).await?;
    ensure_renter(caller, &game)?;

    if let Some(location) = request.location {
        ensure_location(store.as_ref(), location).await?;
        game.location = location;
    }
    if let Some(skill_level) = request.skill_level {
        game.skill_level = skill_level;
    }
    if let Some(game_time) = game_time {
        game.game_time = game_time;
    }

    save_versioned(store.as_ref(), &mut game).await?;
    Ok(game.into())
}

/// Delete a game and its messages.
pub async fn delete_game(state: &AppState, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    {
        let _guard = state.game_locks().lock(id).await;
        let game = load_locked_game(state, store.as_ref(), id).await?;
        ensure_renter(caller, &game)?;
        store.delete_game(id).await?;
    }
    state.game_locks().forget(id);
    info!(game_id = %id, "game deleted");
    Ok(())
}

fn ensure_renter(caller: &Caller, game: &GameEntity) -> Result<(), ServiceError> {
    if caller.is_superuser || game.is_rented_by(caller.id) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "only the renter can change this game".into(),
        ))
    }
}

async fn ensure_location(store: &dyn Store, id: Uuid) -> Result<(), ServiceError> {
    match store.find_location(id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::InvalidInput(format!(
            "Invalid location `{id}` - object does not exist"
        ))),
    }
}

fn parse_game_time(value: &str) -> Result<SystemTime, ServiceError> {
    OffsetDateTime::parse(value.trim(), &Rfc3339)
        .map(SystemTime::from)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid game_time `{value}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::models::LocationEntity,
        services::testing::{caller, state_with_store},
    };

    async fn seed_location(state: &AppState) -> Uuid {
        let location = LocationEntity {
            id: Uuid::new_v4(),
            name: "Rink".into(),
            latitude: 45.5,
            longitude: -73.6,
        };
        let id = location.id;
        let store = state.require_store().await.unwrap();
        store.save_location(location).await.unwrap();
        id
    }

    fn create_request(location: Uuid) -> CreateGameRequest {
        CreateGameRequest {
            skill_level: None,
            location,
            game_time: "2018-05-16T20:00:00Z".into(),
            two_goalies_needed: true,
        }
    }

    #[tokio::test]
    async fn created_game_starts_with_empty_slots() {
        let state = state_with_store(AppConfig::default()).await;
        let location = seed_location(&state).await;
        let renter = caller(false);

        let game = create_game(&state, &renter, create_request(location))
            .await
            .unwrap();

        assert_eq!(game.user, Some(renter.id));
        assert_eq!(game.skill_level, DEFAULT_SKILL_LEVEL);
        assert_eq!(game.goalie_one, None);
        assert_eq!(game.goalie_two, None);
        assert_eq!(game.game_time, "2018-05-16T20:00:00Z");
    }

    #[tokio::test]
    async fn create_rejects_bad_time_and_unknown_location() {
        let state = state_with_store(AppConfig::default()).await;
        let location = seed_location(&state).await;
        let renter = caller(false);

        let mut request = create_request(location);
        request.game_time = "tomorrow".into();
        let err = create_game(&state, &renter, request).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = create_game(&state, &renter, create_request(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn only_the_renter_or_a_superuser_may_update() {
        let state = state_with_store(AppConfig::default()).await;
        let location = seed_location(&state).await;
        let renter = caller(false);
        let game = create_game(&state, &renter, create_request(location))
            .await
            .unwrap();

        let update = || UpdateGameRequest {
            skill_level: Some(2),
            ..Default::default()
        };

        let err = update_game(&state, &caller(false), game.id, update())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let updated = update_game(&state, &renter, game.id, update()).await.unwrap();
        assert_eq!(updated.skill_level, 2);
        assert_eq!(updated.creation_time, game.creation_time);

        update_game(&state, &caller(true), game.id, update())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let state = state_with_store(AppConfig::default()).await;
        let store = state.require_store().await.unwrap();
        let mut game = GameEntity::new(None, Uuid::new_v4(), SystemTime::now(), 5, false);
        store.save_game(game.clone()).await.unwrap();

        let mut concurrent = game.clone();
        save_versioned(store.as_ref(), &mut concurrent).await.unwrap();

        let err = save_versioned(store.as_ref(), &mut game).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(game.version, 0);
    }

    #[tokio::test]
    async fn delete_removes_game_and_its_lock() {
        let state = state_with_store(AppConfig::default()).await;
        let location = seed_location(&state).await;
        let renter = caller(false);
        let game = create_game(&state, &renter, create_request(location))
            .await
            .unwrap();

        let err = delete_game(&state, &caller(false), game.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        delete_game(&state, &renter, game.id).await.unwrap();
        assert!(state.game_locks().is_empty());
        let err = get_game(&state, game.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_game_leaves_no_lock_behind() {
        let state = state_with_store(AppConfig::default()).await;
        let admin = caller(true);

        let err = update_game(&state, &admin, Uuid::new_v4(), UpdateGameRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = delete_game(&state, &admin, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        assert!(state.game_locks().is_empty());
    }
}
