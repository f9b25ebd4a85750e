//! Authentication primitives.
//!
//! - [`jwt`] -- bearer token verification against JWKS or a shared secret.

pub mod jwt;
