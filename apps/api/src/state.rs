use std::sync::Arc;

use crate::config::Config;
use crate::sessions::locks::SessionLocks;
use crate::store::AssetStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AssetStore>,
    pub config: Config,
    /// Per-session locks serializing upload, generation, and reset.
    pub sessions: SessionLocks,
}
