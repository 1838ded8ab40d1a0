//! Goalies withdrawing from games.

use tracing::{debug, info};

use crate::{
    dto::assignment::SlotRequest,
    error::ServiceError,
    services::{
        assignment::parse_slot_request,
        game_service::{load_locked_game, save_versioned},
    },
    state::{
        AppState,
        slots::{self, ReleaseOutcome},
    },
};

/// Clear the slot held by the goalie. Calling it again yields [`ReleaseOutcome::NotAssigned`].
pub async fn release(
    state: &AppState,
    request: SlotRequest,
) -> Result<ReleaseOutcome, ServiceError> {
    let (game_id, goalie_id) = parse_slot_request(&request)?;
    let store = state.require_store().await?;

    let _guard = state.game_locks().lock(game_id).await;
    let mut game = load_locked_game(state, store.as_ref(), game_id).await?;
    let queued = game.applied_goalies.len();

    let outcome = slots::release(&mut game, goalie_id);
    if matches!(outcome, ReleaseOutcome::Released(_)) || game.applied_goalies.len() != queued {
        save_versioned(store.as_ref(), &mut game).await?;
    }

    match outcome {
        ReleaseOutcome::Released(slot) => {
            info!(%game_id, %goalie_id, slot = slot.number(), "goalie released")
        }
        ReleaseOutcome::NotAssigned => debug!(%game_id, %goalie_id, "goalie held no slot"),
    }
    Ok(outcome)
}
