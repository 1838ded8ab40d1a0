//! Goalie slot rules for a single game.
//!
//! These helpers only mutate the in-memory [`GameEntity`]; callers are responsible for
//! holding the per-game lock and persisting the result.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::GameEntity;

/// One of the (up to) two goalie positions of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Always present.
    One,
    /// Only for games needing two goalies.
    Two,
}

impl Slot {
    /// 1-based slot number as shown to clients.
    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

/// Result of a goalie applying to a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The goalie now holds the given, previously empty, slot.
    Assigned(Slot),
    /// The goalie was added to the waiting list; slots are untouched.
    Queued,
    /// Every eligible slot is taken; nothing changed.
    Full,
}

/// Result of a goalie withdrawing from a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The given slot was held by the goalie and is now empty.
    Released(Slot),
    /// The goalie did not hold any slot; nothing changed.
    NotAssigned,
}

/// Stored slot state that breaks the game rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotViolation {
    /// A one-goalie game has its second slot filled.
    #[error("game `{game}` has a second goalie but only needs one")]
    SecondSlotNotNeeded {
        /// Game holding the invalid state.
        game: Uuid,
    },
}

/// First empty slot the game still needs filled, in slot order.
pub fn open_slot(game: &GameEntity) -> Option<Slot> {
    if game.goalie_one.is_none() {
        Some(Slot::One)
    } else if game.two_goalies_needed && game.goalie_two.is_none() {
        Some(Slot::Two)
    } else {
        None
    }
}

/// Slot currently held by `goalie`, slot one taking precedence.
pub fn slot_of(game: &GameEntity, goalie: Uuid) -> Option<Slot> {
    if game.goalie_one == Some(goalie) {
        Some(Slot::One)
    } else if game.goalie_two == Some(goalie) {
        Some(Slot::Two)
    } else {
        None
    }
}

/// Place `goalie` into the first open slot, first come first served.
pub fn assign(game: &mut GameEntity, goalie: Uuid) -> AssignOutcome {
    // TODO: reject a goalie who already holds slot one, and the renter applying to
    // their own game, once product confirms both rules.
    match open_slot(game) {
        Some(Slot::One) => {
            game.goalie_one = Some(goalie);
            AssignOutcome::Assigned(Slot::One)
        }
        Some(Slot::Two) => {
            game.goalie_two = Some(goalie);
            AssignOutcome::Assigned(Slot::Two)
        }
        None => AssignOutcome::Full,
    }
}

/// Add `goalie` to the waiting list. Returns `false` if they were already queued.
pub fn enqueue(game: &mut GameEntity, goalie: Uuid) -> bool {
    if game.applied_goalies.contains(&goalie) {
        return false;
    }
    game.applied_goalies.push(goalie);
    true
}

/// Clear the slot held by `goalie` and drop them from the waiting list.
///
/// Leaving the waiting list alone does not count as a release.
pub fn release(game: &mut GameEntity, goalie: Uuid) -> ReleaseOutcome {
    game.applied_goalies.retain(|queued| *queued != goalie);

    match slot_of(game, goalie) {
        Some(Slot::One) => {
            game.goalie_one = None;
            ReleaseOutcome::Released(Slot::One)
        }
        Some(Slot::Two) => {
            game.goalie_two = None;
            ReleaseOutcome::Released(Slot::Two)
        }
        None => ReleaseOutcome::NotAssigned,
    }
}

/// Check the stored slot state against the game rules.
pub fn check(game: &GameEntity) -> Result<(), SlotViolation> {
    if game.goalie_two.is_some() && !game.two_goalies_needed {
        return Err(SlotViolation::SecondSlotNotNeeded { game: game.id });
    }
    Ok(())
}
