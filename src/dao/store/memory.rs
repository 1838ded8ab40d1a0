//! Process-local storage backend used when no database is configured and by the tests.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::{BoxFuture, ready};
use uuid::Uuid;

use super::{GameStore, LocationStore, MessageStore, Store, UserStore};
use crate::dao::{
    models::{
        AuthTokenEntity, GameEntity, LocationEntity, MessageEntity, ProfileEntity, UserEntity,
    },
    storage::StorageResult,
};

/// Store keeping every collection in concurrent in-process maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    games: DashMap<Uuid, GameEntity>,
    locations: DashMap<Uuid, LocationEntity>,
    messages: DashMap<Uuid, MessageEntity>,
    users: DashMap<Uuid, UserEntity>,
    profiles: DashMap<Uuid, ProfileEntity>,
    tokens: DashMap<String, AuthTokenEntity>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn done<T: Send + 'static>(value: T) -> BoxFuture<'static, StorageResult<T>> {
    Box::pin(ready(Ok(value)))
}

fn values<K, V>(map: &DashMap<K, V>) -> Vec<V>
where
    K: Eq + std::hash::Hash,
    V: Clone,
{
    map.iter().map(|entry| entry.value().clone()).collect()
}

impl GameStore for MemoryStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.games.insert(game.id, game);
        done(())
    }

    fn replace_game(
        &self,
        game: GameEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let replaced = match self.inner.games.entry(game.id) {
            Entry::Occupied(mut stored) if stored.get().version == expected_version => {
                stored.insert(game);
                true
            }
            _ => false,
        };
        done(replaced)
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        done(self.inner.games.get(&id).map(|game| game.clone()))
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        done(values(&self.inner.games))
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.inner.games.remove(&id).is_some();
        if removed {
            self.inner.messages.retain(|_, message| message.game != id);
        }
        done(removed)
    }
}

impl LocationStore for MemoryStore {
    fn save_location(&self, location: LocationEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.locations.insert(location.id, location);
        done(())
    }

    fn find_location(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<LocationEntity>>> {
        done(self.inner.locations.get(&id).map(|location| location.clone()))
    }

    fn list_locations(&self) -> BoxFuture<'static, StorageResult<Vec<LocationEntity>>> {
        done(values(&self.inner.locations))
    }
}

impl MessageStore for MemoryStore {
    fn save_message(&self, message: MessageEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.messages.insert(message.id, message);
        done(())
    }

    fn find_message(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MessageEntity>>> {
        done(self.inner.messages.get(&id).map(|message| message.clone()))
    }

    fn list_messages(&self) -> BoxFuture<'static, StorageResult<Vec<MessageEntity>>> {
        done(values(&self.inner.messages))
    }

    fn delete_message(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        done(self.inner.messages.remove(&id).is_some())
    }
}

impl UserStore for MemoryStore {
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.users.insert(user.id, user);
        done(())
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        done(self.inner.users.get(&id).map(|user| user.clone()))
    }

    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let found = self
            .inner
            .users
            .iter()
            .find(|user| user.username == username)
            .map(|user| user.value().clone());
        done(found)
    }

    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let found = self
            .inner
            .users
            .iter()
            .find(|user| user.email == email)
            .map(|user| user.value().clone());
        done(found)
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        done(values(&self.inner.users))
    }

    fn delete_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.inner.users.remove(&id).is_some();
        self.inner.profiles.remove(&id);
        self.inner.tokens.retain(|_, token| token.user != id);
        done(removed)
    }

    fn save_profile(&self, profile: ProfileEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.profiles.insert(profile.id, profile);
        done(())
    }

    fn find_profile(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>> {
        done(self.inner.profiles.get(&id).map(|profile| profile.clone()))
    }

    fn list_profiles(&self) -> BoxFuture<'static, StorageResult<Vec<ProfileEntity>>> {
        done(values(&self.inner.profiles))
    }

    fn save_token(&self, token: AuthTokenEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.tokens.insert(token.key.clone(), token);
        done(())
    }

    fn find_token(
        &self,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<AuthTokenEntity>>> {
        done(self.inner.tokens.get(&key).map(|token| token.clone()))
    }

    fn find_token_for_user(
        &self,
        user: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AuthTokenEntity>>> {
        let found = self
            .inner
            .tokens
            .iter()
            .find(|token| token.user == user)
            .map(|token| token.value().clone());
        done(found)
    }
}

impl Store for MemoryStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        done(())
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        done(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn game() -> GameEntity {
        GameEntity::new(None, Uuid::new_v4(), SystemTime::now(), 3, true)
    }

    #[tokio::test]
    async fn replace_game_requires_matching_version() {
        let store = MemoryStore::new();
        let mut stored = game();
        store.save_game(stored.clone()).await.unwrap();

        stored.goalie_one = Some(Uuid::new_v4());
        stored.version = 1;
        assert!(store.replace_game(stored.clone(), 0).await.unwrap());

        stored.version = 2;
        assert!(!store.replace_game(stored.clone(), 0).await.unwrap());
        assert_eq!(store.find_game(stored.id).await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn replace_game_does_not_resurrect_deleted_games() {
        let store = MemoryStore::new();
        let stored = game();
        assert!(!store.replace_game(stored.clone(), 0).await.unwrap());
        assert!(store.find_game(stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_game_drops_its_messages() {
        let store = MemoryStore::new();
        let stored = game();
        store.save_game(stored.clone()).await.unwrap();
        let message = MessageEntity {
            id: Uuid::new_v4(),
            game: stored.id,
            body: "see you at the rink".into(),
            game_user: Uuid::new_v4(),
            goalie_user: Uuid::new_v4(),
            sender_is_goalie: false,
            created_at: SystemTime::now(),
        };
        store.save_message(message.clone()).await.unwrap();

        assert!(store.delete_game(stored.id).await.unwrap());
        assert!(store.find_message(message.id).await.unwrap().is_none());
    }
}
