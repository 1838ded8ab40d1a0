use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::LocationEntity,
    dto::location::{CreateLocationRequest, LocationSummary},
    error::ServiceError,
    services::auth_service::Caller,
    state::AppState,
};

/// Every rink sorted by name.
pub async fn list_locations(state: &AppState) -> Result<Vec<LocationSummary>, ServiceError> {
    let store = state.require_store().await?;
    let mut locations = store.list_locations().await?;
    locations.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(locations.into_iter().map(Into::into).collect())
}

pub async fn get_location(state: &AppState, id: Uuid) -> Result<LocationSummary, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_location(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("location `{id}` not found")))
}

/// Register a rink. Restricted to staff.
pub async fn create_location(
    state: &AppState,
    caller: &Caller,
    request: CreateLocationRequest,
) -> Result<LocationSummary, ServiceError> {
    if !(caller.is_staff || caller.is_superuser) {
        return Err(ServiceError::Forbidden(
            "only staff can add locations".into(),
        ));
    }

    let store = state.require_store().await?;
    let location = LocationEntity::from(request);
    store.save_location(location.clone()).await?;
    info!(location_id = %location.id, name = %location.name, "location created");
    Ok(location.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        services::testing::{caller, state_with_store},
    };

    fn request(name: Option<&str>) -> CreateLocationRequest {
        CreateLocationRequest {
            name: name.map(str::to_owned),
            latitude: 43.65,
            longitude: -79.38,
        }
    }

    #[tokio::test]
    async fn staff_create_and_everyone_reads() {
        let state = state_with_store(AppConfig::default()).await;

        let created = create_location(&state, &caller(true), request(None))
            .await
            .unwrap();
        assert_eq!(created.name, "No name given");

        let fetched = get_location(&state, created.id).await.unwrap();
        assert_eq!(fetched.latitude, 43.65);
        assert_eq!(list_locations(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn regular_users_cannot_create() {
        let state = state_with_store(AppConfig::default()).await;
        let err = create_location(&state, &caller(false), request(Some("Rink")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
