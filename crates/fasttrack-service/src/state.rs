//! Application state.

use std::sync::Arc;

use fasttrack_engine::Engine;
use fasttrack_store::Store;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The booking engine.
    pub engine: Engine,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over an initialized store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        Self {
            engine: Engine::new(store),
            config,
        }
    }
}
