/// In-process backend.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    AuthTokenEntity, GameEntity, LocationEntity, MessageEntity, ProfileEntity, UserEntity,
};
use crate::dao::storage::StorageResult;

pub use memory::MemoryStore;

/// Persistence of games, including the versioned write used by slot changes.
pub trait GameStore: Send + Sync {
    /// Insert or overwrite a game unconditionally.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite a game only if the stored copy still carries `expected_version`.
    ///
    /// Returns `false` when the stored version moved on (or the game vanished).
    fn replace_game(
        &self,
        game: GameEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Delete a game together with its messages.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
}

/// Persistence of rinks.
pub trait LocationStore: Send + Sync {
    fn save_location(&self, location: LocationEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_location(&self, id: Uuid)
    -> BoxFuture<'static, StorageResult<Option<LocationEntity>>>;
    fn list_locations(&self) -> BoxFuture<'static, StorageResult<Vec<LocationEntity>>>;
}

/// Persistence of renter/goalie messages.
pub trait MessageStore: Send + Sync {
    fn save_message(&self, message: MessageEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_message(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MessageEntity>>>;
    fn list_messages(&self) -> BoxFuture<'static, StorageResult<Vec<MessageEntity>>>;
    fn delete_message(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
}

/// Persistence of accounts, their profiles and API tokens.
pub trait UserStore: Send + Sync {
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Delete a user along with their profile and tokens.
    fn delete_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn save_profile(&self, profile: ProfileEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_profile(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>>;
    fn list_profiles(&self) -> BoxFuture<'static, StorageResult<Vec<ProfileEntity>>>;
    fn save_token(&self, token: AuthTokenEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_token(&self, key: String)
    -> BoxFuture<'static, StorageResult<Option<AuthTokenEntity>>>;
    fn find_token_for_user(
        &self,
        user: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AuthTokenEntity>>>;
}

/// Full storage backend installed into the shared state.
pub trait Store: GameStore + LocationStore + MessageStore + UserStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
