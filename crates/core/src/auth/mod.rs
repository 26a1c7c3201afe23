//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - The admin email allow-list
//! - Rules for accounts created by admins

mod password;

pub use password::{PasswordError, hash_password, verify_login, verify_password};

/// Minimum length of a newly set password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Admin gate backed by a configured email allow-list.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: Vec<String>,
}

impl AdminPolicy {
    /// Build a policy from the configured admin emails.
    #[must_use]
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| normalize_email(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    /// Returns true if `email` is on the allow-list.
    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.emails.iter().any(|e| *e == email)
    }

    /// Number of configured admins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    /// Returns true if no admin is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Lower-case and trim an email for storage and comparison.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check the fields of a new user account.
///
/// # Errors
///
/// Returns a message describing the first rule the input breaks.
pub fn validate_new_user(email: &str, password: &str, full_name: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("email must be a valid address".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if full_name.trim().is_empty() {
        return Err("full_name is required".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_admin_policy_case_insensitive() {
        let policy = AdminPolicy::new(["Ops@Dealdesk.io", " founder@dealdesk.io "]);
        assert_eq!(policy.len(), 2);
        assert!(policy.is_admin("ops@dealdesk.io"));
        assert!(policy.is_admin("FOUNDER@DEALDESK.IO"));
        assert!(!policy.is_admin("sales@dealdesk.io"));
    }

    #[test]
    fn test_empty_policy_admits_nobody() {
        let policy = AdminPolicy::new(["", "  "]);
        assert!(policy.is_empty());
        assert!(!policy.is_admin(""));
    }

    #[rstest]
    #[case("rep@dealdesk.io", "longenough", "Sam Rep", true)]
    #[case("rep-at-dealdesk.io", "longenough", "Sam Rep", false)]
    #[case("rep@dealdesk.io", "short", "Sam Rep", false)]
    #[case("rep@dealdesk.io", "12345678", "Sam Rep", true)]
    #[case("rep@dealdesk.io", "longenough", "   ", false)]
    fn test_validate_new_user(
        #[case] email: &str,
        #[case] password: &str,
        #[case] name: &str,
        #[case] ok: bool,
    ) {
        assert_eq!(validate_new_user(email, password, name).is_ok(), ok);
    }
}
