//! Bearer token verification.
//!
//! Tokens are issued by the external authentication service. The verified
//! user id is taken from the `id` claim. Keys come either from the service's
//! JWKS endpoint, fetched once at startup, or from a shared HS256 secret for
//! development and tests.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use terraforge_core::types::UserId;

/// Allowed clock skew when checking `exp` / `nbf`.
pub const CLOCK_LEEWAY_SECS: u64 = 30;

/// Path of the JWKS document relative to `AUTH_URL`.
const JWKS_PATH: &str = "/api/auth/jwks";

/// Claims read from an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's id in the authentication service.
    pub id: UserId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Configuration for token verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the authentication service.
    pub auth_url: String,
    /// When set, tokens are verified as HS256 with this secret instead of
    /// against the JWKS endpoint.
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// | Env Var      | Required | Default                 |
    /// |--------------|----------|-------------------------|
    /// | `AUTH_URL`   | no       | `http://localhost:3001` |
    /// | `JWT_SECRET` | no       | unset                   |
    pub fn from_env() -> Self {
        let auth_url =
            std::env::var("AUTH_URL").unwrap_or_else(|_| "http://localhost:3001".into());
        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty());

        Self {
            auth_url,
            jwt_secret,
        }
    }

    /// URL of the authentication service's JWKS document.
    pub fn jwks_url(&self) -> String {
        format!("{}{JWKS_PATH}", self.auth_url.trim_end_matches('/'))
    }
}

/// Errors from token verification.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Signature, expiry or claim validation failed.
    #[error("Invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The JWKS document could not be fetched.
    #[error("Failed to fetch JWKS: {0}")]
    Jwks(#[from] reqwest::Error),

    /// No configured key matches the token's `kid`.
    #[error("No verification key for kid {0:?}")]
    UnknownKey(Option<String>),

    /// Symmetric algorithms are not accepted for JWKS-verified tokens.
    #[error("Algorithm {0:?} is not allowed")]
    DisallowedAlgorithm(Algorithm),

    /// The token verified but carries an empty `id` claim.
    #[error("Token has no user id")]
    MissingUserId,
}

struct PublicKey {
    kid: Option<String>,
    key: DecodingKey,
}

enum KeySource {
    Secret(DecodingKey),
    Jwks(Vec<PublicKey>),
}

/// Verifies bearer tokens and yields the caller's user id.
pub struct Authenticator {
    keys: KeySource,
}

impl Authenticator {
    /// Verify HS256 tokens signed with `secret`.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            keys: KeySource::Secret(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    /// Verify tokens against the keys of a JWKS document.
    ///
    /// Keys that cannot be converted into a decoding key are skipped.
    pub fn from_jwk_set(set: &JwkSet) -> Self {
        let keys = set
            .keys
            .iter()
            .filter_map(|jwk| match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some(PublicKey {
                    kid: jwk.common.key_id.clone(),
                    key,
                }),
                Err(e) => {
                    tracing::warn!(error = %e, kid = ?jwk.common.key_id, "Skipping unusable JWK");
                    None
                }
            })
            .collect();

        Self {
            keys: KeySource::Jwks(keys),
        }
    }

    /// Fetch the JWKS document at `url` and verify tokens against it.
    pub async fn from_jwks_url(client: &reqwest::Client, url: &str) -> Result<Self, AuthError> {
        let set: JwkSet = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::info!(url, keys = set.keys.len(), "Loaded JWKS");
        Ok(Self::from_jwk_set(&set))
    }

    /// Build from configuration: the shared secret when set, JWKS otherwise.
    pub async fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        match &config.jwt_secret {
            Some(secret) => Ok(Self::from_secret(secret)),
            None => Self::from_jwks_url(&reqwest::Client::new(), &config.jwks_url()).await,
        }
    }

    /// Validate `token` and return the user id from its `id` claim.
    ///
    /// Audience is not checked.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let (key, algorithm) = match &self.keys {
            KeySource::Secret(key) => (key, Algorithm::HS256),
            KeySource::Jwks(keys) => {
                let header = decode_header(token)?;
                let key = select_key(keys, header.kid.as_deref())
                    .ok_or(AuthError::UnknownKey(header.kid))?;
                if matches!(
                    header.alg,
                    Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
                ) {
                    return Err(AuthError::DisallowedAlgorithm(header.alg));
                }
                (key, header.alg)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_LEEWAY_SECS;
        validation.validate_aud = false;

        let claims = decode::<Claims>(token, key, &validation)?.claims;
        if claims.id.is_empty() {
            return Err(AuthError::MissingUserId);
        }
        Ok(claims.id)
    }
}

/// Match by `kid`; a token without one is accepted only when exactly one key exists.
fn select_key<'a>(keys: &'a [PublicKey], kid: Option<&str>) -> Option<&'a DecodingKey> {
    match kid {
        Some(kid) => keys
            .iter()
            .find(|k| k.kid.as_deref() == Some(kid))
            .map(|k| &k.key),
        None if keys.len() == 1 => keys.first().map(|k| &k.key),
        None => None,
    }
}
