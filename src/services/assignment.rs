//! Goalie applications to games.

use std::time::{Duration, SystemTime};

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::store::Store,
    dto::assignment::SlotRequest,
    error::ServiceError,
    services::game_service::{load_locked_game, save_versioned},
    state::{
        AppState,
        slots::{self, AssignOutcome},
    },
};

/// Decides whether an applying goalie gets a slot, waits in the queue or is turned away.
#[derive(Debug, Clone, Default)]
pub struct AssignmentService {
    queue_window: Option<Duration>,
}

impl AssignmentService {
    /// `queue_window` is how long after creation a game collects applications instead of
    /// assigning them. `None` means first come, first served.
    pub fn new(queue_window: Option<Duration>) -> Self {
        Self { queue_window }
    }

    /// Apply a goalie to a game.
    ///
    /// Both identifiers are checked before any storage access. The load-check-save runs
    /// under the game's lock and is persisted with a versioned write.
    pub async fn apply(
        &self,
        state: &AppState,
        request: SlotRequest,
    ) -> Result<AssignOutcome, ServiceError> {
        let (game_id, goalie_id) = parse_slot_request(&request)?;
        let store = state.require_store().await?;

        let _guard = state.game_locks().lock(game_id).await;
        let mut game = load_locked_game(state, store.as_ref(), game_id).await?;
        ensure_goalie(store.as_ref(), goalie_id).await?;
        slots::check(&game)?;

        if self.in_queue_window(game.created_at, SystemTime::now()) {
            if slots::enqueue(&mut game, goalie_id) {
                save_versioned(store.as_ref(), &mut game).await?;
            }
            info!(%game_id, %goalie_id, "goalie queued");
            return Ok(AssignOutcome::Queued);
        }

        let outcome = slots::assign(&mut game, goalie_id);
        match outcome {
            AssignOutcome::Assigned(slot) => {
                save_versioned(store.as_ref(), &mut game).await?;
                info!(%game_id, %goalie_id, slot = slot.number(), "goalie assigned");
            }
            AssignOutcome::Full => debug!(%game_id, %goalie_id, "game already filled"),
            AssignOutcome::Queued => {}
        }
        Ok(outcome)
    }

    fn in_queue_window(&self, created_at: SystemTime, now: SystemTime) -> bool {
        let Some(window) = self.queue_window else {
            return false;
        };
        // A creation time in the future counts as freshly created.
        now.duration_since(created_at)
            .map(|age| age < window)
            .unwrap_or(true)
    }
}

/// Parse the mandatory `game` and `goalie` identifiers of an apply/release body.
pub fn parse_slot_request(request: &SlotRequest) -> Result<(Uuid, Uuid), ServiceError> {
    let game = parse_field("game", request.game.as_ref())?;
    let goalie = parse_field("goalie", request.goalie.as_ref())?;
    Ok((game, goalie))
}

fn parse_field(name: &str, value: Option<&Value>) -> Result<Uuid, ServiceError> {
    let malformed =
        || ServiceError::InvalidInput(format!("Field '{name}' must be a valid identifier"));
    let text = match value {
        None | Some(Value::Null) => "",
        Some(Value::String(text)) => text.trim(),
        Some(_) => return Err(malformed()),
    };
    if text.is_empty() {
        return Err(ServiceError::InvalidInput(format!(
            "Field '{name}' cannot be blank"
        )));
    }
    Uuid::parse_str(text).map_err(|_| malformed())
}

/// The goalie must be a known user whose profile allows goaltending.
async fn ensure_goalie(store: &dyn Store, goalie_id: Uuid) -> Result<(), ServiceError> {
    let not_found = || ServiceError::NotFound(format!("goalie `{goalie_id}` not found"));

    store.find_user(goalie_id).await?.ok_or_else(not_found)?;
    let profile = store.find_profile(goalie_id).await?.ok_or_else(not_found)?;
    if !profile.is_goalie {
        return Err(not_found());
    }
    Ok(())
}
