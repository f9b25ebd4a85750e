//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async functions that
//! accept an executor (`&PgPool` or `&mut PgConnection`) as the first argument.

pub mod project_repo;

pub use project_repo::ProjectRepo;
