//! Fixtures shared by the service tests.

use std::{sync::Arc, time::SystemTime};

use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        models::{ProfileEntity, UserEntity},
        store::MemoryStore,
    },
    services::auth_service::{Caller, hash_password},
    state::{AppState, SharedState},
};

pub const SECRET: &str = "test-secret";

/// State backed by a fresh [`MemoryStore`], out of degraded mode.
pub async fn state_with_store(config: AppConfig) -> SharedState {
    let state = AppState::new(config.with_secret_key(SECRET));
    state.set_store(Arc::new(MemoryStore::new())).await;
    state
}

/// Active user with a goalie profile. Returns the user id.
pub async fn seed_goalie(state: &AppState, username: &str) -> Uuid {
    let user = active_user(username);
    let id = user.id;
    let store = state.require_store().await.unwrap();
    store.save_user(user).await.unwrap();
    store.save_profile(ProfileEntity::for_user(id)).await.unwrap();
    id
}

pub fn active_user(username: &str) -> UserEntity {
    UserEntity {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: hash_password(SECRET, "testpassword"),
        is_staff: false,
        is_superuser: false,
        is_active: true,
        date_joined: SystemTime::now(),
    }
}

pub fn caller(is_superuser: bool) -> Caller {
    Caller {
        id: Uuid::new_v4(),
        username: "caller".into(),
        is_staff: is_superuser,
        is_superuser,
    }
}
