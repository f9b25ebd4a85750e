pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// ```text
/// /projects                            search (public), create (auth)
/// /projects/{identifier}               get (optional auth), update, delete (auth)
/// /projects/{identifier}/members       list (optional auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/projects", project::router())
}
