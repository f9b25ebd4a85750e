//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                       -> search
/// POST   /                       -> create
/// GET    /{identifier}           -> get_by_identifier
/// PATCH  /{identifier}           -> update
/// DELETE /{identifier}           -> delete
/// GET    /{identifier}/members   -> list_members
/// ```
///
/// `{identifier}` is either the project id or its slug.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::search).post(project::create))
        .route(
            "/{identifier}",
            get(project::get_by_identifier)
                .patch(project::update)
                .delete(project::delete),
        )
        .route("/{identifier}/members", get(project::list_members))
}
