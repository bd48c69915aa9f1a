pub mod game;
pub mod status;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::duel_store::DuelStore, error::ServiceError};

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle and runtime configuration.
pub struct AppState {
    duel_store: RwLock<Option<Arc<dyn DuelStore>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            duel_store: RwLock::new(None),
            degraded: degraded_tx,
            config,
        })
    }

    /// Runtime configuration (question bank seeds, questions per game).
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current duel store, if one is installed.
    pub async fn duel_store(&self) -> Option<Arc<dyn DuelStore>> {
        let guard = self.duel_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the duel store or fail with a degraded-mode error.
    pub async fn require_duel_store(&self) -> Result<Arc<dyn DuelStore>, ServiceError> {
        self.duel_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new duel store implementation and leave degraded mode.
    pub async fn install_duel_store(&self, store: Arc<dyn DuelStore>) {
        {
            let mut guard = self.duel_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current duel store and enter degraded mode.
    pub async fn clear_duel_store(&self) {
        {
            let mut guard = self.duel_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag. The flag can be raised while a store is still
    /// installed, when the supervisor sees failing health checks.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        if self.is_degraded() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }
}
