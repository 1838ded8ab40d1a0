//! Token authentication, password hashing and account activation links.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::models::{AuthTokenEntity, UserEntity},
    dto::auth::{TokenRequest, TokenResponse},
    error::ServiceError,
    state::AppState,
};

type HmacSha256 = Hmac<Sha256>;

const PASSWORD_SCHEME: &str = "hmac-sha256";
const TOKEN_BYTES: usize = 20;
const SALT_BYTES: usize = 12;
const ACTIVATION_HASH_LEN: usize = 20;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// Authenticated user on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// User id.
    pub id: Uuid,
    /// Login name, for logs.
    pub username: String,
    /// Copied from the user.
    pub is_staff: bool,
    /// Copied from the user.
    pub is_superuser: bool,
}

impl Caller {
    /// Superusers may act for anyone, everybody else only for themselves.
    pub fn can_act_for(&self, user: Uuid) -> bool {
        self.is_superuser || self.id == user
    }
}

impl From<&UserEntity> for Caller {
    fn from(user: &UserEntity) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}

/// Resolve an `Authorization: Token <key>` header value to an active user.
pub async fn authenticate(state: &AppState, header: &str) -> Result<Caller, ServiceError> {
    let key = header
        .strip_prefix("Token ")
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("expected `Token <key>` credentials".into()))?;

    let store = state.require_store().await?;
    let token = store
        .find_token(key.to_owned())
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("invalid token".into()))?;
    let user = store
        .find_user(token.user)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("user inactive or deleted".into()))?;

    if !user.is_active {
        return Err(ServiceError::Unauthorized(
            "user inactive or deleted".into(),
        ));
    }

    Ok(Caller::from(&user))
}

/// Exchange a username and password for the user's API token.
pub async fn obtain_token(
    state: &AppState,
    request: TokenRequest,
) -> Result<TokenResponse, ServiceError> {
    let store = state.require_store().await?;
    let user = store
        .find_user_by_username(request.username)
        .await?
        .ok_or_else(|| ServiceError::InvalidInput(INVALID_CREDENTIALS.into()))?;

    let secret = state.config().secret_key();
    if !user.is_active || !verify_password(secret, &request.password, &user.password_hash) {
        debug!(user_id = %user.id, "rejected token request");
        return Err(ServiceError::InvalidInput(INVALID_CREDENTIALS.into()));
    }

    if let Some(token) = store.find_token_for_user(user.id).await? {
        return Ok(TokenResponse { token: token.key });
    }

    let token = issue_token(user.id);
    store.save_token(token.clone()).await?;
    Ok(TokenResponse { token: token.key })
}

/// Follow an activation link. Returns `false` when the link is invalid or expired.
pub async fn activate(state: &AppState, uid: &str, token: &str) -> Result<bool, ServiceError> {
    let Ok(user_id) = Uuid::parse_str(uid) else {
        return Ok(false);
    };

    let store = state.require_store().await?;
    let Some(mut user) = store.find_user(user_id).await? else {
        return Ok(false);
    };

    let config = state.config();
    if !check_activation_token(
        config.secret_key(),
        &user,
        token,
        config.activation_timeout,
        SystemTime::now(),
    ) {
        return Ok(false);
    }

    user.is_active = true;
    store.save_user(user).await?;
    info!(%user_id, "account activated");
    Ok(true)
}

/// Fresh random API token for `user`.
pub fn issue_token(user: Uuid) -> AuthTokenEntity {
    let bytes: [u8; TOKEN_BYTES] = rand::rng().random();
    AuthTokenEntity {
        key: hex::encode(bytes),
        user,
        created_at: SystemTime::now(),
    }
}

fn keyed_mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length.
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).unwrap_or_else(|_| unreachable!())
}

/// Salted HMAC-SHA256 of `password`, keyed with the server secret.
pub fn hash_password(secret: &str, password: &str) -> String {
    let salt: [u8; SALT_BYTES] = rand::rng().random();
    let salt = hex::encode(salt);
    let mut mac = keyed_mac(secret);
    mac.update(salt.as_bytes());
    mac.update(password.as_bytes());
    let digest = hex::encode(mac.finalize().into_bytes());
    format!("{PASSWORD_SCHEME}${salt}${digest}")
}

/// Check `password` against a hash produced by [`hash_password`].
pub fn verify_password(secret: &str, password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(PASSWORD_SCHEME), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };

    let mut mac = keyed_mac(secret);
    mac.update(salt.as_bytes());
    mac.update(password.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

fn days_since_epoch(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
        / SECONDS_PER_DAY
}

fn activation_mac(secret: &str, user: &UserEntity, day: u64) -> HmacSha256 {
    let mut mac = keyed_mac(secret);
    mac.update(user.id.as_bytes());
    mac.update(user.password_hash.as_bytes());
    mac.update(&[u8::from(user.is_active)]);
    mac.update(&day.to_be_bytes());
    mac
}

/// Activation token of the form `<base36 day>-<20 hex chars>`.
///
/// The token stops validating once the account is active or its password changes.
pub fn make_activation_token(secret: &str, user: &UserEntity, issued_at: SystemTime) -> String {
    let day = days_since_epoch(issued_at);
    let digest = hex::encode(activation_mac(secret, user, day).finalize().into_bytes());
    format!("{}-{}", to_base36(day), &digest[..ACTIVATION_HASH_LEN])
}

/// Whether `token` was issued for `user` in its current state and is younger than `timeout`.
pub fn check_activation_token(
    secret: &str,
    user: &UserEntity,
    token: &str,
    timeout: Duration,
    now: SystemTime,
) -> bool {
    let Some((day, hash)) = token.split_once('-') else {
        return false;
    };
    let Some(day) = from_base36(day) else {
        return false;
    };
    if hash.len() != ACTIVATION_HASH_LEN {
        return false;
    }
    let Ok(hash) = hex::decode(hash) else {
        return false;
    };

    let today = days_since_epoch(now);
    if day > today || (today - day) * SECONDS_PER_DAY > timeout.as_secs() {
        return false;
    }

    activation_mac(secret, user, day)
        .verify_truncated_left(&hash)
        .is_ok()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn from_base36(value: &str) -> Option<u64> {
    if value.is_empty() || value.len() > 13 {
        return None;
    }
    u64::from_str_radix(value, 36).ok()
}
