//! Argon2id credentials for the login flow.
//!
//! `users.password_hash` holds PHC strings from [`hash_password`]. Logins go
//! through [`verify_login`], which spends the same Argon2 work whether or not
//! the email matched a user.

use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash,
    password_hash::{Error as PhcError, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Hash checked against when the login email is unknown.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dealdesk-unknown-account").ok());

/// Password hashing or verification failure.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Argon2 could not produce a hash.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Argon2 failed for a reason other than a wrong password.
    #[error("failed to verify password: {0}")]
    Verify(String),

    /// Stored value is not a PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Hashes a new password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails.
///
/// # Example
///
/// ```
/// use dealdesk_core::auth::hash_password;
///
/// let hash = hash_password("correct horse battery").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Checks `password` against a stored PHC hash. A mismatch is `Ok(false)`.
///
/// # Errors
///
/// `PasswordError::MalformedHash` for a stored value that is not a PHC
/// string, `PasswordError::Verify` for any other Argon2 failure.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PhcError::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

/// Login check for a user that may not exist.
///
/// With `None` the password is still verified against a decoy hash and the
/// result is always `false`, so unknown emails cost the same as wrong
/// passwords.
///
/// # Errors
///
/// Same as [`verify_password`] for a stored hash.
///
/// # Example
///
/// ```
/// use dealdesk_core::auth::{hash_password, verify_login};
///
/// let hash = hash_password("s3cret-pass").unwrap();
/// assert!(verify_login("s3cret-pass", Some(&hash)).unwrap());
/// assert!(!verify_login("s3cret-pass", None).unwrap());
/// ```
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> Result<bool, PasswordError> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(decoy) = DECOY_HASH.as_deref() {
                verify_password(password, decoy)?;
            }
            Ok(false)
        }
    }
}
