//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- requires a valid bearer token.
//! - [`auth::MaybeAuthUser`] -- resolves to an anonymous requester when the
//!   token is absent or invalid.

pub mod auth;
