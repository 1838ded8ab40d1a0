use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials exchanged for an API token.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of `/check-username/`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckUsernameRequest {
    #[serde(default)]
    pub username: Option<String>,
}

/// Body of `/check-email/`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniqueResponse {
    pub unique: bool,
}
