//! Terraforge domain primitives.
//!
//! This crate has zero internal dependencies so it can be shared by the
//! database, search and API layers alike.

pub mod error;
pub mod search;
pub mod types;
pub mod validation;
