use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::LocationEntity;

const DEFAULT_LOCATION_NAME: &str = "No name given";

/// New rink definition.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateLocationRequest {
    #[serde(default)]
    #[validate(length(max = 64))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl From<CreateLocationRequest> for LocationEntity {
    fn from(request: CreateLocationRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION_NAME.to_owned()),
            latitude: request.latitude,
            longitude: request.longitude,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationSummary {
    pub id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LocationEntity> for LocationSummary {
    fn from(location: LocationEntity) -> Self {
        Self {
            id: location.id,
            name: location.name,
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}
