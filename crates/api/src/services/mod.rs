//! Domain services used by the HTTP handlers.
//!
//! - [`project::ProjectService`] -- transactional project lifecycle.
//! - [`search::SearchService`] -- index-backed project search.
//! - [`index_sync::IndexSync`] -- detached propagation of writes to the index.

pub mod index_sync;
pub mod project;
pub mod search;
