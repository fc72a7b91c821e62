//! services/api/src/web/state.rs
//!
//! The state every handler receives: the store, the chat router, uploads and config.

use crate::adapters::uploads::UploadStore;
use crate::config::Config;
use library_core::ports::DatabaseService;
use library_core::router::ChatRouter;
use std::sync::Arc;

/// Built once in `main` and shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub chat: Arc<ChatRouter>,
    pub uploads: UploadStore,
}
