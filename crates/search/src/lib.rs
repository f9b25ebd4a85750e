//! Search index access for projects.
//!
//! The index is a best-effort, denormalised mirror of the `projects` table.
//! [`SearchRepository`] is the seam the API layer depends on; production
//! uses [`MeiliSearchRepo`], tests use [`InMemorySearchRepo`].

pub mod client;
pub mod document;
pub mod error;
pub mod memory;
pub mod repository;

pub use client::MeiliSearchClient;
pub use document::ProjectDocument;
pub use error::SearchError;
pub use memory::InMemorySearchRepo;
pub use repository::{MeiliSearchRepo, ProjectSearchResult, SearchRepository, PROJECTS_INDEX};
