pub mod game;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::quiz_store::QuizStore, error::ServiceError,
    services::auth_service::TokenService,
};

/// Shared handle on the application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle, configuration and token service.
///
/// Games live in the store only; nothing about a game is cached here.
pub struct AppState {
    quiz_store: RwLock<Option<Arc<dyn QuizStore>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    tokens: TokenService,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Self::build(config, None)
    }

    /// Construct a state with `store` already installed (memory backend and tests).
    pub fn with_store(config: AppConfig, store: Arc<dyn QuizStore>) -> SharedState {
        Self::build(config, Some(store))
    }

    fn build(config: AppConfig, store: Option<Arc<dyn QuizStore>>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(store.is_none());
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
        Arc::new(Self {
            quiz_store: RwLock::new(store),
            degraded: degraded_tx,
            config,
            tokens,
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn quiz_store(&self) -> Option<Arc<dyn QuizStore>> {
        let guard = self.quiz_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] while none is installed.
    pub async fn require_store(&self) -> Result<Arc<dyn QuizStore>, ServiceError> {
        self.quiz_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn install_quiz_store(&self, store: Arc<dyn QuizStore>) {
        {
            let mut guard = self.quiz_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_quiz_store(&self) {
        {
            let mut guard = self.quiz_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.quiz_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Bearer token signer/verifier.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Update and broadcast the degraded flag when the value changes.
    fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::quiz_store::MemoryQuizStore;

    #[tokio::test]
    async fn new_state_starts_degraded() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_store().await,
            Err(ServiceError::Degraded)
        ));
    }

    #[tokio::test]
    async fn installing_and_clearing_store_toggles_degraded_flag() {
        let state = AppState::new(AppConfig::default());
        let watcher = state.degraded_watcher();

        state
            .install_quiz_store(Arc::new(MemoryQuizStore::new()))
            .await;
        assert!(!state.is_degraded().await);
        assert!(!*watcher.borrow());

        state.clear_quiz_store().await;
        assert!(state.is_degraded().await);
        assert!(*watcher.borrow());
    }

    #[tokio::test]
    async fn with_store_is_ready_immediately() {
        let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryQuizStore::new()));
        assert!(!state.is_degraded().await);
        assert!(state.require_store().await.is_ok());
    }
}
