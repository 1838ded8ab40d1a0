use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-game mutexes serialising read-modify-write cycles on a game.
#[derive(Default)]
pub struct GameLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl GameLocks {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the game `id`.
    ///
    /// The guard owns its mutex, so it stays valid even if the entry is forgotten meanwhile.
    pub async fn lock(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(id).or_default().clone();
        lock.lock_owned().await
    }

    /// Drop the mutex of a deleted game.
    pub fn forget(&self, id: Uuid) {
        self.locks.remove(&id);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no game currently has a mutex.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
