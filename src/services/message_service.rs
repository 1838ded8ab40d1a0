//! Conversations between a renter and the goalies of their games.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::MessageEntity,
    dto::message::{CreateMessageRequest, MessageSummary, UpdateMessageRequest},
    error::ServiceError,
    services::{auth_service::Caller, game_service::load_game},
    state::{AppState, slots},
};

/// Superusers see every message, everybody else what they sent or what concerns them as goalie.
pub fn is_visible_to(caller: &Caller, message: &MessageEntity) -> bool {
    caller.is_superuser || message.sender() == caller.id || message.goalie_user == caller.id
}

fn can_modify(caller: &Caller, message: &MessageEntity) -> bool {
    caller.is_superuser || message.sender() == caller.id
}

/// Messages visible to `caller`, oldest first.
pub async fn list_messages(
    state: &AppState,
    caller: &Caller,
) -> Result<Vec<MessageSummary>, ServiceError> {
    let store = state.require_store().await?;
    let mut messages = store
        .list_messages()
        .await?
        .into_iter()
        .filter(|message| is_visible_to(caller, message))
        .collect::<Vec<_>>();
    messages.sort_by_key(|message| message.created_at);
    Ok(messages.into_iter().map(Into::into).collect())
}

/// A single message, hidden ones answer not found.
pub async fn get_message(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
) -> Result<MessageSummary, ServiceError> {
    load_visible(state, caller, id).await.map(Into::into)
}

/// Post a message on a game. The renter writes to a named goalie, a goalie holding a slot
/// writes to the renter.
pub async fn create_message(
    state: &AppState,
    caller: &Caller,
    request: CreateMessageRequest,
) -> Result<MessageSummary, ServiceError> {
    let store = state.require_store().await?;
    let game = load_game(store.as_ref(), request.game).await?;
    let renter = game.user.ok_or_else(|| {
        ServiceError::InvalidState(format!("game `{}` has no renter", game.id))
    })?;

    let (goalie_user, sender_is_goalie) = if renter == caller.id {
        let goalie = request.goalie.ok_or_else(|| {
            ServiceError::InvalidInput("Field 'goalie' is required when the renter writes".into())
        })?;
        (goalie, false)
    } else if slots::slot_of(&game, caller.id).is_some() {
        (caller.id, true)
    } else {
        return Err(ServiceError::Forbidden(
            "only the renter and goalies of a game can message about it".into(),
        ));
    };

    let message = MessageEntity {
        id: Uuid::new_v4(),
        game: game.id,
        body: request.body,
        game_user: renter,
        goalie_user,
        sender_is_goalie,
        created_at: SystemTime::now(),
    };
    store.save_message(message.clone()).await?;
    info!(message_id = %message.id, game_id = %game.id, sender = %caller.id, "message posted");
    Ok(message.into())
}

/// Replace the body of a message the caller sent.
pub async fn update_message(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    request: UpdateMessageRequest,
) -> Result<MessageSummary, ServiceError> {
    let mut message = load_visible(state, caller, id).await?;
    if !can_modify(caller, &message) {
        return Err(ServiceError::Forbidden(
            "only the sender can edit a message".into(),
        ));
    }

    message.body = request.body;
    let store = state.require_store().await?;
    store.save_message(message.clone()).await?;
    Ok(message.into())
}

/// Delete a message the caller sent.
pub async fn delete_message(state: &AppState, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let message = load_visible(state, caller, id).await?;
    if !can_modify(caller, &message) {
        return Err(ServiceError::Forbidden(
            "only the sender can delete a message".into(),
        ));
    }

    let store = state.require_store().await?;
    store.delete_message(id).await?;
    Ok(())
}

/// Messages the caller may not see are reported as missing.
async fn load_visible(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
) -> Result<MessageEntity, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_message(id)
        .await?
        .filter(|message| is_visible_to(caller, message))
        .ok_or_else(|| ServiceError::NotFound(format!("message `{id}` not found")))
}
