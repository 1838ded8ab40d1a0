//! Accounts, registration and the on-user-created hook.

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{ProfileEntity, UserEntity},
        store::Store,
    },
    dto::{
        auth::{CheckEmailRequest, CheckUsernameRequest, UniqueResponse},
        user::{CreateUserRequest, UpdateUserRequest, UserSummary},
    },
    error::ServiceError,
    services::{
        auth_service::{self, Caller},
        game_service::{load_locked_game, save_versioned},
        notifier::OutgoingEmail,
    },
    state::{AppState, slots},
};

const VERIFY_SUBJECT: &str = "Verify Your Rent A Goalie Account";

/// Every account sorted by username.
pub async fn list_users(state: &AppState) -> Result<Vec<UserSummary>, ServiceError> {
    let store = state.require_store().await?;
    let mut users = store.list_users().await?;
    users.sort_by(|a, b| a.username.cmp(&b.username));
    Ok(users.into_iter().map(Into::into).collect())
}

/// A single account.
pub async fn get_user(state: &AppState, id: Uuid) -> Result<UserSummary, ServiceError> {
    let store = state.require_store().await?;
    load_user(store.as_ref(), id).await.map(Into::into)
}

/// Register an inactive account and run [`on_user_created`].
pub async fn create_user(
    state: &AppState,
    request: CreateUserRequest,
) -> Result<UserSummary, ServiceError> {
    let store = state.require_store().await?;
    ensure_username_free(store.as_ref(), &request.username).await?;
    ensure_email_free(store.as_ref(), &request.email).await?;

    let mut user = UserEntity {
        id: Uuid::new_v4(),
        username: request.username,
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        password_hash: String::new(),
        is_staff: false,
        is_superuser: false,
        is_active: false,
        date_joined: SystemTime::now(),
    };
    on_user_created(state, store.as_ref(), &mut user, &request.password).await?;
    Ok(user.into())
}

/// Side effects of a new account: hashed password, profile, API token and the
/// verification email. A failed email is logged and otherwise ignored.
pub async fn on_user_created(
    state: &AppState,
    store: &dyn Store,
    user: &mut UserEntity,
    password: &str,
) -> Result<(), ServiceError> {
    let config = state.config();
    user.password_hash = auth_service::hash_password(config.secret_key(), password);
    store.save_user(user.clone()).await?;

    let token = auth_service::issue_token(user.id);
    let activation = auth_service::make_activation_token(config.secret_key(), user, SystemTime::now());
    let profile = ProfileEntity {
        reset_token: activation.clone(),
        access_token: token.key.clone(),
        ..ProfileEntity::for_user(user.id)
    };
    store.save_token(token).await?;
    store.save_profile(profile).await?;
    info!(user_id = %user.id, username = %user.username, "user registered");

    let email = OutgoingEmail {
        to: user.email.clone(),
        subject: VERIFY_SUBJECT.into(),
        body: format!(
            "Hi {name},\n\nPlease click on the link to confirm your registration:\n\
             http://{domain}/activate/{uid}/{activation}/\n",
            name = user.username,
            domain = config.site_domain,
            uid = user.id,
        ),
    };
    if let Err(err) = state.notifier().send(email).await {
        warn!(user_id = %user.id, error = %err, "verification email not sent");
    }
    Ok(())
}

/// Update the caller's own account, or any account for superusers.
pub async fn update_user(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    request: UpdateUserRequest,
) -> Result<UserSummary, ServiceError> {
    ensure_self(caller, id)?;
    let store = state.require_store().await?;
    let mut user = load_user(store.as_ref(), id).await?;

    if let Some(email) = request.email {
        if email != user.email {
            ensure_email_free(store.as_ref(), &email).await?;
        }
        user.email = email;
    }
    if let Some(password) = request.password {
        user.password_hash = auth_service::hash_password(state.config().secret_key(), &password);
    }
    if let Some(first_name) = request.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = request.last_name {
        user.last_name = last_name;
    }

    store.save_user(user.clone()).await?;
    Ok(user.into())
}

/// Delete an account. Games the user rents go with it, slots they hold are freed.
pub async fn delete_user(state: &AppState, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    ensure_self(caller, id)?;
    let store = state.require_store().await?;
    load_user(store.as_ref(), id).await?;

    for game in store.list_games().await? {
        let game_id = game.id;
        if game.is_rented_by(id) {
            {
                let _guard = state.game_locks().lock(game_id).await;
                store.delete_game(game_id).await?;
            }
            state.game_locks().forget(game_id);
        } else if slots::slot_of(&game, id).is_some() || game.applied_goalies.contains(&id) {
            let _guard = state.game_locks().lock(game_id).await;
            let mut game = load_locked_game(state, store.as_ref(), game_id).await?;
            slots::release(&mut game, id);
            save_versioned(store.as_ref(), &mut game).await?;
        }
    }

    store.delete_user(id).await?;
    info!(user_id = %id, "user deleted");
    Ok(())
}

/// Whether the requested username is still free.
pub async fn check_username(
    state: &AppState,
    request: CheckUsernameRequest,
) -> Result<UniqueResponse, ServiceError> {
    let username = request
        .username
        .ok_or_else(|| ServiceError::InvalidInput("Must provide username field".into()))?;
    let store = state.require_store().await?;
    let unique = store.find_user_by_username(username).await?.is_none();
    Ok(UniqueResponse { unique })
}

/// Whether the requested email is still free.
pub async fn check_email(
    state: &AppState,
    request: CheckEmailRequest,
) -> Result<UniqueResponse, ServiceError> {
    let email = request
        .email
        .ok_or_else(|| ServiceError::InvalidInput("Must provide email field".into()))?;
    let store = state.require_store().await?;
    let unique = store.find_user_by_email(email).await?.is_none();
    Ok(UniqueResponse { unique })
}

fn ensure_self(caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    if caller.can_act_for(id) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "accounts can only be changed by their owner".into(),
        ))
    }
}

async fn load_user(store: &dyn Store, id: Uuid) -> Result<UserEntity, ServiceError> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{id}` not found")))
}

async fn ensure_username_free(store: &dyn Store, username: &str) -> Result<(), ServiceError> {
    if store.find_user_by_username(username.to_owned()).await?.is_some() {
        return Err(ServiceError::InvalidInput(
            "A user with that username already exists.".into(),
        ));
    }
    Ok(())
}

async fn ensure_email_free(store: &dyn Store, email: &str) -> Result<(), ServiceError> {
    if store.find_user_by_email(email.to_owned()).await?.is_some() {
        return Err(ServiceError::InvalidInput(
            "A user with that email already exists.".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{models::GameEntity, store::MemoryStore},
        dto::auth::TokenRequest,
        services::{
            notifier::MemoryNotifier,
            testing::{SECRET, caller, seed_goalie, state_with_store},
        },
    };

    fn registration(username: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: "testpassword".into(),
            first_name: "Hannah".into(),
            last_name: "Test".into(),
        }
    }

    async fn state_with_outbox() -> (Arc<AppState>, MemoryNotifier) {
        let outbox = MemoryNotifier::new();
        let state = AppState::with_notifier(
            AppConfig::default().with_secret_key(SECRET),
            Arc::new(outbox.clone()),
        );
        state.set_store(Arc::new(MemoryStore::new())).await;
        (state, outbox)
    }

    #[tokio::test]
    async fn registration_runs_the_hook() {
        let (state, outbox) = state_with_outbox().await;

        let user = create_user(&state, registration("testuser")).await.unwrap();
        assert!(!user.is_active);

        let store = state.require_store().await.unwrap();
        let profile = store.find_profile(user.id).await.unwrap().unwrap();
        assert!(profile.is_goalie);
        let token = store.find_token_for_user(user.id).await.unwrap().unwrap();
        assert_eq!(profile.access_token, token.key);

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "testuser@example.com");
        assert_eq!(sent[0].subject, VERIFY_SUBJECT);
        assert!(sent[0].body.contains(&format!(
            "/activate/{}/{}/",
            user.id, profile.reset_token
        )));
    }

    #[tokio::test]
    async fn activation_link_enables_login() {
        let (state, _outbox) = state_with_outbox().await;
        let user = create_user(&state, registration("testuser")).await.unwrap();
        let login = || TokenRequest {
            username: "testuser".into(),
            password: "testpassword".into(),
        };

        let err = auth_service::obtain_token(&state, login()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let store = state.require_store().await.unwrap();
        let profile = store.find_profile(user.id).await.unwrap().unwrap();
        let uid = user.id.to_string();
        assert!(
            auth_service::activate(&state, &uid, &profile.reset_token)
                .await
                .unwrap()
        );
        // Links are single use.
        assert!(
            !auth_service::activate(&state, &uid, &profile.reset_token)
                .await
                .unwrap()
        );

        let token = auth_service::obtain_token(&state, login()).await.unwrap();
        assert_eq!(token.token, profile.access_token);
        let caller = auth_service::authenticate(&state, &format!("Token {}", token.token))
            .await
            .unwrap();
        assert_eq!(caller.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let state = state_with_store(AppConfig::default()).await;
        create_user(&state, registration("testuser")).await.unwrap();

        let err = create_user(&state, registration("testuser")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let mut other = registration("other");
        other.email = "testuser@example.com".into();
        let err = create_user(&state, other).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn uniqueness_checks() {
        let state = state_with_store(AppConfig::default()).await;
        create_user(&state, registration("testuser")).await.unwrap();

        let taken = check_username(
            &state,
            CheckUsernameRequest {
                username: Some("testuser".into()),
            },
        )
        .await
        .unwrap();
        assert!(!taken.unique);

        let free = check_email(
            &state,
            CheckEmailRequest {
                email: Some("new@example.com".into()),
            },
        )
        .await
        .unwrap();
        assert!(free.unique);

        let err = check_username(&state, CheckUsernameRequest { username: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn deleting_a_user_cleans_up_games() {
        let state = state_with_store(AppConfig::default()).await;
        let goalie = seed_goalie(&state, "goalie").await;
        let other = caller(false);
        let store = state.require_store().await.unwrap();

        let rented = GameEntity::new(Some(goalie), Uuid::new_v4(), SystemTime::now(), 5, false);
        let mut played = GameEntity::new(Some(other.id), Uuid::new_v4(), SystemTime::now(), 5, true);
        played.goalie_two = Some(goalie);
        store.save_game(rented.clone()).await.unwrap();
        store.save_game(played.clone()).await.unwrap();

        let err = delete_user(&state, &other, goalie).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let me = Caller {
            id: goalie,
            username: "goalie".into(),
            is_staff: false,
            is_superuser: false,
        };
        delete_user(&state, &me, goalie).await.unwrap();

        assert!(store.find_game(rented.id).await.unwrap().is_none());
        let played = store.find_game(played.id).await.unwrap().unwrap();
        assert_eq!(played.goalie_two, None);
        assert!(store.find_user(goalie).await.unwrap().is_none());
        assert!(store.find_profile(goalie).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn password_change_rehashes() {
        let state = state_with_store(AppConfig::default()).await;
        let id = seed_goalie(&state, "goalie").await;
        let me = Caller {
            id,
            username: "goalie".into(),
            is_staff: false,
            is_superuser: false,
        };

        update_user(
            &state,
            &me,
            id,
            UpdateUserRequest {
                password: Some("new-password".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let store = state.require_store().await.unwrap();
        let user = store.find_user(id).await.unwrap().unwrap();
        assert!(auth_service::verify_password(
            SECRET,
            "new-password",
            &user.password_hash
        ));
    }
}
