use std::sync::Arc;

use crate::auth::jwt::Authenticator;
use crate::config::ServerConfig;
use crate::services::index_sync::IndexSync;
use crate::services::project::ProjectService;
use crate::services::search::SearchService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: terraforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Bearer token verifier used by the auth extractors.
    pub authenticator: Arc<Authenticator>,
    /// Project lifecycle operations.
    pub projects: ProjectService,
    /// Index-backed search.
    pub search: SearchService,
    /// Pending search propagations; drained at shutdown.
    pub index_sync: IndexSync,
}
