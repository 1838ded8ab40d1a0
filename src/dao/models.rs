use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Default skill level for games and profiles (1 is best, 5 is the lowest).
pub const DEFAULT_SKILL_LEVEL: u8 = 5;

/// Aggregate game entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Renter organising the game.
    pub user: Option<Uuid>,
    /// Expected skill level, 1 (best) to 5.
    pub skill_level: u8,
    /// Rink where the game is played.
    pub location: Uuid,
    /// Scheduled start of the game.
    pub game_time: SystemTime,
    /// Creation timestamp, never changed after insertion.
    pub created_at: SystemTime,
    /// Last time the game entity was updated.
    pub updated_at: SystemTime,
    /// Goalie holding the first slot.
    pub goalie_one: Option<Uuid>,
    /// Goalie holding the second slot, only when two goalies are needed.
    pub goalie_two: Option<Uuid>,
    /// Whether the second slot may ever be filled.
    pub two_goalies_needed: bool,
    /// Goalies waiting for a slot while the queue window is open.
    #[serde(default)]
    pub applied_goalies: Vec<Uuid>,
    /// Optimistic concurrency counter, bumped on every write.
    #[serde(default)]
    pub version: u64,
}

impl GameEntity {
    /// Fresh game with both slots empty.
    pub fn new(
        user: Option<Uuid>,
        location: Uuid,
        game_time: SystemTime,
        skill_level: u8,
        two_goalies_needed: bool,
    ) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            user,
            skill_level,
            location,
            game_time,
            created_at: now,
            updated_at: now,
            goalie_one: None,
            goalie_two: None,
            two_goalies_needed,
            applied_goalies: Vec::new(),
            version: 0,
        }
    }

    /// Whether `user_id` organises this game.
    pub fn is_rented_by(&self, user_id: Uuid) -> bool {
        self.user == Some(user_id)
    }
}

/// Rink where games take place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationEntity {
    /// Primary key of the location.
    pub id: Uuid,
    /// Name of the rink.
    pub name: String,
    /// Decimal latitude, south is negative.
    pub latitude: f64,
    /// Decimal longitude, west is negative.
    pub longitude: f64,
}

/// Message exchanged between a renter and a goalie about a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEntity {
    /// Primary key of the message.
    pub id: Uuid,
    /// Game the conversation is about.
    pub game: Uuid,
    /// Message text.
    pub body: String,
    /// Renter side of the conversation.
    pub game_user: Uuid,
    /// Goalie side of the conversation.
    pub goalie_user: Uuid,
    /// Whether the goalie wrote this message.
    pub sender_is_goalie: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

impl MessageEntity {
    /// Identifier of the user who wrote the message.
    pub fn sender(&self) -> Uuid {
        if self.sender_is_goalie {
            self.goalie_user
        } else {
            self.game_user
        }
    }
}

/// Account registered in the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    /// Given name, may be empty.
    pub first_name: String,
    /// Family name, may be empty.
    pub last_name: String,
    /// Salted password hash.
    pub password_hash: String,
    /// Staff members may manage rinks.
    pub is_staff: bool,
    /// Superusers may act on any resource.
    pub is_superuser: bool,
    /// False until the activation link was followed.
    pub is_active: bool,
    /// Registration timestamp.
    pub date_joined: SystemTime,
}

/// Per-user profile, sharing the primary key of its user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileEntity {
    /// Same identifier as the owning user.
    pub id: Uuid,
    /// Games the user has played in.
    pub games_played: u32,
    /// Whether the user can be assigned to goalie slots.
    pub is_goalie: bool,
    /// Preferred rinks.
    pub locations: Vec<Uuid>,
    /// Optional picture URL.
    pub picture: Option<String>,
    /// Average rating, 0 to 5.
    pub rating: f32,
    /// Activation token mailed at registration.
    pub reset_token: String,
    /// API token issued at registration.
    pub access_token: String,
    /// Self-assessed skill level, 1 (best) to 5.
    pub skill_level: u8,
}

impl ProfileEntity {
    /// Default profile for a freshly created user.
    pub fn for_user(id: Uuid) -> Self {
        Self {
            id,
            games_played: 0,
            is_goalie: true,
            locations: Vec::new(),
            picture: None,
            rating: 0.0,
            reset_token: String::new(),
            access_token: String::new(),
            skill_level: DEFAULT_SKILL_LEVEL,
        }
    }
}

/// API token granting access on behalf of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthTokenEntity {
    /// Token value sent in the `Authorization` header.
    pub key: String,
    /// Owner of the token.
    pub user: Uuid,
    /// Issue timestamp.
    pub created_at: SystemTime,
}
