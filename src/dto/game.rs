use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::GameEntity, dto::format_system_time};

/// Payload used to publish a new game. The caller becomes its renter.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// 1 (best) to 5, defaults to 5.
    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub skill_level: Option<u8>,
    pub location: Uuid,
    /// RFC 3339 start time, e.g. `2018-05-16T20:00:00Z`.
    pub game_time: String,
    /// Whether a second goalie slot is offered. Cannot be changed later.
    #[serde(default)]
    pub two_goalies_needed: bool,
}

/// Partial update of a game. Goalie slots are only changed through apply/release.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateGameRequest {
    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub skill_level: Option<u8>,
    #[serde(default)]
    pub location: Option<Uuid>,
    #[serde(default)]
    pub game_time: Option<String>,
}

/// Public projection of a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: Uuid,
    /// Renter organising the game.
    pub user: Option<Uuid>,
    pub skill_level: u8,
    pub location: Uuid,
    pub game_time: String,
    pub creation_time: String,
    pub goalie_one: Option<Uuid>,
    pub goalie_two: Option<Uuid>,
    pub two_goalies_needed: bool,
}

impl From<GameEntity> for GameSummary {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            user: game.user,
            skill_level: game.skill_level,
            location: game.location,
            game_time: format_system_time(game.game_time),
            creation_time: format_system_time(game.created_at),
            goalie_one: game.goalie_one,
            goalie_two: game.goalie_two,
            two_goalies_needed: game.two_goalies_needed,
        }
    }
}
