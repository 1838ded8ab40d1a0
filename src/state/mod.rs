/// Per-game locking.
pub mod locks;
/// Goalie slot rules.
pub mod slots;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::store::Store,
    error::ServiceError,
    services::{
        assignment::AssignmentService,
        notifier::{LogNotifier, Notifier},
    },
};

use self::locks::GameLocks;

/// Handle to the state shared by every handler and task.
pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle and cross-request coordination.
pub struct AppState {
    store: RwLock<Option<Arc<dyn Store>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    game_locks: GameLocks,
    assignment: AssignmentService,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    /// Same as [`AppState::new`] with a custom email channel.
    pub fn with_notifier(config: AppConfig, notifier: Arc<dyn Notifier>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            degraded: degraded_tx,
            assignment: AssignmentService::new(config.queue_window),
            config,
            game_locks: GameLocks::new(),
            notifier,
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn Store>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] while storage is unavailable.
    pub async fn require_store(&self) -> Result<Arc<dyn Store>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_store(&self, store: Arc<dyn Store>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Configuration loaded at start-up.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Per-game mutexes guarding slot changes.
    pub fn game_locks(&self) -> &GameLocks {
        &self.game_locks
    }

    /// Assignment workflow configured from [`AppConfig::queue_window`].
    pub fn assignment(&self) -> &AssignmentService {
        &self.assignment
    }

    /// Channel used for account emails.
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }
}
