use std::sync::Arc;

use crate::config::Config;
use crate::interviews::store::InterviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record store chosen at startup: Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn InterviewStore>,
    pub config: Config,
}
