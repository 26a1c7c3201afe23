//! Storage key derivation.
//!
//! Format: `{owner_id}/{timestamp}.{extension}`, or `{owner_id}/{timestamp}`
//! when the file name carries no usable extension.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_TOKEN: AtomicI64 = AtomicI64::new(0);

/// Current UTC time in microseconds, used as the per-upload key token.
///
/// Strictly increasing within the process: a call landing in the same
/// microsecond as the previous one, or after the clock stepped back, gets
/// the previous token plus one.
#[must_use]
pub fn timestamp_token() -> i64 {
    let now = Utc::now().timestamp_micros();
    let next = |last: i64| now.max(last.saturating_add(1));
    match LAST_TOKEN.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last))) {
        Ok(last) | Err(last) => next(last),
    }
}

/// Extension of a client-supplied file name.
///
/// Takes the substring after the last `.` of the final path segment and keeps
/// only ASCII alphanumerics. Returns `None` when nothing remains.
#[must_use]
pub fn file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (_, ext) = base.rsplit_once('.')?;
    let ext: String = ext.chars().filter(char::is_ascii_alphanumeric).collect();
    (!ext.is_empty()).then_some(ext)
}

/// Derive the storage key for an upload.
#[must_use]
pub fn derive_storage_key(owner_id: &str, file_name: &str, timestamp: i64) -> String {
    match file_extension(file_name) {
        Some(ext) => format!("{owner_id}/{timestamp}.{ext}"),
        None => format!("{owner_id}/{timestamp}"),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_key_is_owner_slash_digits_dot_ext(
            owner in "[a-z0-9-]{1,36}",
            stem in "[a-zA-Z0-9 _-]{0,30}",
            ext in "[a-z0-9]{1,5}",
            ts in 0i64..i64::MAX,
        ) {
            let key = derive_storage_key(&owner, &format!("{stem}.{ext}"), ts);
            prop_assert_eq!(key, format!("{owner}/{ts}.{ext}"));
        }

        #[test]
        fn prop_key_has_single_separator(
            owner in "[a-z0-9-]{1,36}",
            name in ".*",
            ts in 0i64..i64::MAX,
        ) {
            let key = derive_storage_key(&owner, &name, ts);
            prop_assert_eq!(key.matches('/').count(), 1);
            let prefix = format!("{}/{}", owner, ts);
            prop_assert!(key.starts_with(&prefix));
        }
    }
}
