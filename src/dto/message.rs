use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::MessageEntity, dto::format_system_time};

/// Message posted on a game conversation.
///
/// The renter side is taken from the game; when the caller is the renter, `goalie`
/// names the goalie they are writing to.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMessageRequest {
    pub game: Uuid,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    #[serde(default)]
    pub goalie: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateMessageRequest {
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageSummary {
    pub id: Uuid,
    pub game: Uuid,
    pub body: String,
    pub game_user: Uuid,
    pub goalie: Uuid,
    pub creation_time: String,
    pub sender_is_goalie: bool,
}

impl From<MessageEntity> for MessageSummary {
    fn from(message: MessageEntity) -> Self {
        Self {
            id: message.id,
            game: message.game,
            body: message.body,
            game_user: message.game_user,
            goalie: message.goalie_user,
            creation_time: format_system_time(message.created_at),
            sender_is_goalie: message.sender_is_goalie,
        }
    }
}
