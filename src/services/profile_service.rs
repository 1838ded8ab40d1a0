use uuid::Uuid;

use crate::{
    dto::profile::{ProfileSummary, UpdateProfileRequest},
    error::ServiceError,
    services::auth_service::Caller,
    state::AppState,
};

/// Every profile.
pub async fn list_profiles(state: &AppState) -> Result<Vec<ProfileSummary>, ServiceError> {
    let store = state.require_store().await?;
    Ok(store
        .list_profiles()
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Profile of the user `id`.
pub async fn get_profile(state: &AppState, id: Uuid) -> Result<ProfileSummary, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_profile(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("profile `{id}` not found")))
}

/// Update goalie preferences. Only the owner (or a superuser) may do so.
pub async fn update_profile(
    state: &AppState,
    caller: &Caller,
    id: Uuid,
    request: UpdateProfileRequest,
) -> Result<ProfileSummary, ServiceError> {
    if !caller.can_act_for(id) {
        return Err(ServiceError::Forbidden(
            "profiles can only be changed by their owner".into(),
        ));
    }

    let store = state.require_store().await?;
    let mut profile = store
        .find_profile(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("profile `{id}` not found")))?;

    if let Some(is_goalie) = request.is_goalie {
        profile.is_goalie = is_goalie;
    }
    if let Some(locations) = request.locations {
        for location in &locations {
            if store.find_location(*location).await?.is_none() {
                return Err(ServiceError::InvalidInput(format!(
                    "Invalid location `{location}` - object does not exist"
                )));
            }
        }
        profile.locations = locations;
    }
    if let Some(picture) = request.picture {
        profile.picture = picture;
    }
    if let Some(skill_level) = request.skill_level {
        profile.skill_level = skill_level;
    }

    store.save_profile(profile.clone()).await?;
    Ok(profile.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::models::ProfileEntity,
        services::testing::{caller, state_with_store},
    };

    #[tokio::test]
    async fn owner_updates_and_clears_picture() {
        let state = state_with_store(AppConfig::default()).await;
        let owner = caller(false);
        let store = state.require_store().await.unwrap();
        store
            .save_profile(ProfileEntity {
                picture: Some("https://example.com/me.png".into()),
                ..ProfileEntity::for_user(owner.id)
            })
            .await
            .unwrap();

        let updated = update_profile(
            &state,
            &owner,
            owner.id,
            UpdateProfileRequest {
                is_goalie: Some(false),
                picture: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(!updated.is_goalie);
        assert_eq!(updated.picture, None);
        assert_eq!(updated.skill_level, 5);
    }

    #[tokio::test]
    async fn others_cannot_update() {
        let state = state_with_store(AppConfig::default()).await;
        let owner = caller(false);
        let store = state.require_store().await.unwrap();
        store
            .save_profile(ProfileEntity::for_user(owner.id))
            .await
            .unwrap();

        let err = update_profile(&state, &caller(false), owner.id, Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        update_profile(&state, &caller(true), owner.id, Default::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_locations_are_rejected() {
        let state = state_with_store(AppConfig::default()).await;
        let owner = caller(false);
        let store = state.require_store().await.unwrap();
        store
            .save_profile(ProfileEntity::for_user(owner.id))
            .await
            .unwrap();

        let err = update_profile(
            &state,
            &owner,
            owner.id,
            UpdateProfileRequest {
                locations: Some(vec![Uuid::new_v4()]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
