//! Bearer session tokens.
//!
//! Sessions are HS256 JWTs signed with the platform's shared secret. Only
//! access tokens exist; there is no refresh flow.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::JwtSettings;

/// Signing secret and session lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret.
    pub secret: String,
    /// How long an issued token stays valid.
    pub access_token_ttl: Duration,
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        let secs = i64::try_from(settings.access_token_expiry_secs).unwrap_or(i64::MAX);
        Self {
            secret: settings.secret.clone(),
            access_token_ttl: Duration::try_seconds(secs).unwrap_or(Duration::days(365)),
        }
    }
}

/// Token issuance or verification failure.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// Bad signature, malformed token or wrong algorithm.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Signature is fine but `exp` has passed.
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct JwtService {
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Builds the signing and verification keys from the secret.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            ttl: config.access_token_ttl,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Signs a token for `user_id` that expires after the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Signing` if encoding fails.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email, Utc::now() + self.ttl);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Checks signature and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// `JwtError::Expired` for a past `exp`, `JwtError::Invalid` for anything else.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }

    /// Token lifetime in seconds, as reported to clients.
    #[must_use]
    pub fn expires_in(&self) -> i64 {
        self.ttl.num_seconds()
    }
}
