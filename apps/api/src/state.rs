use std::sync::Arc;

use crate::llm_client::LlmClients;
use crate::profile::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres-backed when `DATABASE_URL` is set, in-memory otherwise.
    pub profiles: Arc<dyn ProfileStore>,
    pub llm: LlmClients,
}
