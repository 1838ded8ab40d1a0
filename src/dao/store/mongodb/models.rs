use mongodb::bson::{Binary, Bson, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::GameEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    user: Option<Uuid>,
    skill_level: u8,
    location: Uuid,
    game_time: DateTime,
    created_at: DateTime,
    updated_at: DateTime,
    goalie_one: Option<Uuid>,
    goalie_two: Option<Uuid>,
    two_goalies_needed: bool,
    #[serde(default)]
    applied_goalies: Vec<Uuid>,
    #[serde(default)]
    version: i64,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            user: value.user,
            skill_level: value.skill_level,
            location: value.location,
            game_time: DateTime::from_system_time(value.game_time),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            goalie_one: value.goalie_one,
            goalie_two: value.goalie_two,
            two_goalies_needed: value.two_goalies_needed,
            applied_goalies: value.applied_goalies,
            version: version_as_bson(value.version),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            user: value.user,
            skill_level: value.skill_level,
            location: value.location,
            game_time: value.game_time.to_system_time(),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            goalie_one: value.goalie_one,
            goalie_two: value.goalie_two,
            two_goalies_needed: value.two_goalies_needed,
            applied_goalies: value.applied_goalies,
            version: value.version.max(0) as u64,
        }
    }
}

/// Versions are stored as signed 64-bit integers, the widest integer BSON offers.
pub fn version_as_bson(version: u64) -> i64 {
    i64::try_from(version).unwrap_or(i64::MAX)
}

/// Same encoding serde produces for a [`Uuid`] field inside a document.
pub fn uuid_as_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_bson(id)}
}

pub fn field_eq(field: &str, id: Uuid) -> Document {
    let mut filter = Document::new();
    filter.insert(field, uuid_as_bson(id));
    filter
}
