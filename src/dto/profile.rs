use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::ProfileEntity;

/// Partial profile update. `picture: null` removes the picture.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub is_goalie: Option<bool>,
    #[serde(default)]
    pub locations: Option<Vec<Uuid>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(url)]
    pub picture: Option<Option<String>>,
    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub skill_level: Option<u8>,
}

/// Public projection of a profile; tokens are never exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub user: Uuid,
    pub games_played: u32,
    pub is_goalie: bool,
    pub locations: Vec<Uuid>,
    pub picture: Option<String>,
    pub rating: f32,
    pub skill_level: u8,
}

impl From<ProfileEntity> for ProfileSummary {
    fn from(profile: ProfileEntity) -> Self {
        Self {
            id: profile.id,
            user: profile.id,
            games_played: profile.games_played,
            is_goalie: profile.is_goalie,
            locations: profile.locations,
            picture: profile.picture,
            rating: profile.rating,
            skill_level: profile.skill_level,
        }
    }
}
