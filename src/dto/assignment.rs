use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::state::slots::{AssignOutcome, ReleaseOutcome};

/// Body shared by `/apply/` and `/release/`.
///
/// Fields are kept as raw JSON so a missing, blank or non-string value is reported
/// against the field it came from rather than as a decoding failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SlotRequest {
    /// Identifier of the game.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub game: Option<Value>,
    /// Identifier of the goalie.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub goalie: Option<Value>,
}

#[cfg(test)]
impl SlotRequest {
    pub fn new(game: impl Into<String>, goalie: impl Into<String>) -> Self {
        Self {
            game: Some(Value::String(game.into())),
            goalie: Some(Value::String(goalie.into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplyResult {
    Assigned,
    Queued,
    Full,
}

/// Outcome of a goalie application.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyResponse {
    pub result: ApplyResult,
    /// Slot number (1 or 2) when assigned.
    pub slot: Option<u8>,
    pub message: String,
}

impl From<AssignOutcome> for ApplyResponse {
    fn from(outcome: AssignOutcome) -> Self {
        match outcome {
            AssignOutcome::Assigned(slot) => Self {
                result: ApplyResult::Assigned,
                slot: Some(slot.number()),
                message: "Goalie saved".into(),
            },
            AssignOutcome::Queued => Self {
                result: ApplyResult::Queued,
                slot: None,
                message: "Goalie queued".into(),
            },
            AssignOutcome::Full => Self {
                result: ApplyResult::Full,
                slot: None,
                message: "Game has already been filled".into(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseResult {
    Released,
    NotAssigned,
}

/// Outcome of a goalie withdrawal.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReleaseResponse {
    pub result: ReleaseResult,
    /// Slot number (1 or 2) that was freed.
    pub slot: Option<u8>,
    pub message: String,
}

impl From<ReleaseOutcome> for ReleaseResponse {
    fn from(outcome: ReleaseOutcome) -> Self {
        match outcome {
            ReleaseOutcome::Released(slot) => Self {
                result: ReleaseResult::Released,
                slot: Some(slot.number()),
                message: "Goalie removed".into(),
            },
            ReleaseOutcome::NotAssigned => Self {
                result: ReleaseResult::NotAssigned,
                slot: None,
                message: "Goalie is not assigned to this game".into(),
            },
        }
    }
}
