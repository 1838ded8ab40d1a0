use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, doc_id, field_eq, version_as_bson},
};
use crate::dao::{
    models::{
        AuthTokenEntity, GameEntity, LocationEntity, MessageEntity, ProfileEntity, UserEntity,
    },
    storage::StorageResult,
    store::{GameStore, LocationStore, MessageStore, Store, UserStore},
};

const GAMES: &str = "games";
const LOCATIONS: &str = "locations";
const MESSAGES: &str = "messages";
const USERS: &str = "users";
const PROFILES: &str = "profiles";
const TOKENS: &str = "tokens";

/// Unique indexes created at connection time: (collection, field, index name).
const UNIQUE_INDEXES: &[(&str, &str, &str)] = &[
    (LOCATIONS, "id", "location_id_idx"),
    (MESSAGES, "id", "message_id_idx"),
    (USERS, "id", "user_id_idx"),
    (USERS, "username", "user_username_idx"),
    (USERS, "email", "user_email_idx"),
    (PROFILES, "id", "profile_id_idx"),
    (TOKENS, "key", "token_key_idx"),
];

/// Store backed by a MongoDB database, one collection per entity.
#[derive(Clone)]
pub struct MongoStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;
        info!(database = %config.database_name, "connected to MongoDB");

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        for (collection, field, name) in UNIQUE_INDEXES {
            let mut keys = Document::new();
            keys.insert(*field, 1);
            let index = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some((*name).to_owned()))
                        .unique(Some(true))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(collection)
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: *collection,
                    index: *field,
                    source,
                })?;
        }

        let message_game_index = IndexModel::builder()
            .keys(doc! {"game": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("message_game_idx".to_owned()))
                    .build(),
            )
            .build();
        database
            .collection::<Document>(MESSAGES)
            .create_index(message_game_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MESSAGES,
                index: "game",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<T>(name)
    }

    async fn upsert<T>(&self, name: &'static str, filter: Document, value: &T) -> MongoResult<()>
    where
        T: Serialize + Send + Sync,
    {
        self.collection::<T>(name)
            .await
            .replace_one(filter, value)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: name,
                source,
            })?;
        Ok(())
    }

    async fn find_one<T>(&self, name: &'static str, filter: Document) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        self.collection::<T>(name)
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })
    }

    async fn find_all<T>(&self, name: &'static str) -> MongoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        self.collection::<T>(name)
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Read {
                collection: name,
                source,
            })
    }

    async fn delete(&self, name: &'static str, filter: Document) -> MongoResult<bool> {
        let result = self
            .collection::<Document>(name)
            .await
            .delete_one(filter)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: name,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_all(&self, name: &'static str, filter: Document) -> MongoResult<()> {
        self.collection::<Document>(name)
            .await
            .delete_many(filter)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: name,
                source,
            })?;
        Ok(())
    }

    async fn replace_game(&self, game: GameEntity, expected_version: u64) -> MongoResult<bool> {
        let mut filter = doc_id(game.id);
        filter.insert("version", version_as_bson(expected_version));
        let document: MongoGameDocument = game.into();

        let result = self
            .collection::<MongoGameDocument>(GAMES)
            .await
            .replace_one(filter, &document)
            .await
            .map_err(|source| MongoDaoError::Write {
                collection: GAMES,
                source,
            })?;
        Ok(result.matched_count == 1)
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        let deleted = self.delete(GAMES, doc_id(id)).await?;
        if deleted {
            self.delete_all(MESSAGES, field_eq("game", id)).await?;
        }
        Ok(deleted)
    }

    async fn delete_user(&self, id: Uuid) -> MongoResult<bool> {
        let deleted = self.delete(USERS, field_eq("id", id)).await?;
        self.delete(PROFILES, field_eq("id", id)).await?;
        self.delete_all(TOKENS, field_eq("user", id)).await?;
        Ok(deleted)
    }
}

macro_rules! boxed {
    ($store:expr, |$inner:ident| $body:expr) => {{
        let $inner = $store.clone();
        Box::pin(async move { $body.await.map_err(Into::into) })
    }};
}

impl GameStore for MongoStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let filter = doc_id(game.id);
        let document: MongoGameDocument = game.into();
        boxed!(self, |store| store.upsert(GAMES, filter, &document))
    }

    fn replace_game(
        &self,
        game: GameEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        boxed!(self, |store| store.replace_game(game, expected_version))
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store
                .find_one::<MongoGameDocument>(GAMES, doc_id(id))
                .await?;
            Ok(document.map(GameEntity::from))
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents = store.find_all::<MongoGameDocument>(GAMES).await?;
            Ok(documents.into_iter().map(GameEntity::from).collect())
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        boxed!(self, |store| store.delete_game(id))
    }
}

impl LocationStore for MongoStore {
    fn save_location(&self, location: LocationEntity) -> BoxFuture<'static, StorageResult<()>> {
        let filter = field_eq("id", location.id);
        boxed!(self, |store| store.upsert(LOCATIONS, filter, &location))
    }

    fn find_location(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<LocationEntity>>> {
        boxed!(self, |store| store.find_one::<LocationEntity>(LOCATIONS, field_eq("id", id)))
    }

    fn list_locations(&self) -> BoxFuture<'static, StorageResult<Vec<LocationEntity>>> {
        boxed!(self, |store| store.find_all::<LocationEntity>(LOCATIONS))
    }
}

impl MessageStore for MongoStore {
    fn save_message(&self, message: MessageEntity) -> BoxFuture<'static, StorageResult<()>> {
        let filter = field_eq("id", message.id);
        boxed!(self, |store| store.upsert(MESSAGES, filter, &message))
    }

    fn find_message(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MessageEntity>>> {
        boxed!(self, |store| store.find_one::<MessageEntity>(MESSAGES, field_eq("id", id)))
    }

    fn list_messages(&self) -> BoxFuture<'static, StorageResult<Vec<MessageEntity>>> {
        boxed!(self, |store| store.find_all::<MessageEntity>(MESSAGES))
    }

    fn delete_message(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        boxed!(self, |store| store.delete(MESSAGES, field_eq("id", id)))
    }
}

impl UserStore for MongoStore {
    fn save_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let filter = field_eq("id", user.id);
        boxed!(self, |store| store.upsert(USERS, filter, &user))
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        boxed!(self, |store| store.find_one::<UserEntity>(USERS, field_eq("id", id)))
    }

    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        boxed!(self, |store| store
            .find_one::<UserEntity>(USERS, doc! {"username": username}))
    }

    fn find_user_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        boxed!(self, |store| store.find_one::<UserEntity>(USERS, doc! {"email": email}))
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        boxed!(self, |store| store.find_all::<UserEntity>(USERS))
    }

    fn delete_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        boxed!(self, |store| store.delete_user(id))
    }

    fn save_profile(&self, profile: ProfileEntity) -> BoxFuture<'static, StorageResult<()>> {
        let filter = field_eq("id", profile.id);
        boxed!(self, |store| store.upsert(PROFILES, filter, &profile))
    }

    fn find_profile(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>> {
        boxed!(self, |store| store.find_one::<ProfileEntity>(PROFILES, field_eq("id", id)))
    }

    fn list_profiles(&self) -> BoxFuture<'static, StorageResult<Vec<ProfileEntity>>> {
        boxed!(self, |store| store.find_all::<ProfileEntity>(PROFILES))
    }

    fn save_token(&self, token: AuthTokenEntity) -> BoxFuture<'static, StorageResult<()>> {
        let filter = doc! {"key": token.key.clone()};
        boxed!(self, |store| store.upsert(TOKENS, filter, &token))
    }

    fn find_token(
        &self,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<AuthTokenEntity>>> {
        boxed!(self, |store| store.find_one::<AuthTokenEntity>(TOKENS, doc! {"key": key}))
    }

    fn find_token_for_user(
        &self,
        user: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AuthTokenEntity>>> {
        boxed!(self, |store| store.find_one::<AuthTokenEntity>(TOKENS, field_eq("user", user)))
    }
}

impl Store for MongoStore {
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
