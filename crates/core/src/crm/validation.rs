//! Field rules for CRM records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use dealdesk_shared::AppError;

/// A CRM field rule was broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrmValidationError {
    /// A required text field is empty or whitespace.
    #[error("{0} is required")]
    Required(&'static str),

    /// Event ends before it starts.
    #[error("ends_at must not be before starts_at")]
    EventEndsBeforeStart,

    /// Tier slots below zero.
    #[error("slots must be zero or more, got {0}")]
    NegativeSlots(i32),

    /// Tier price below zero.
    #[error("price must be zero or more, got {0}")]
    NegativePrice(Decimal),

    /// Counterpart quantity below one.
    #[error("quantity must be at least 1, got {0}")]
    QuantityTooSmall(i32),
}

impl From<CrmValidationError> for AppError {
    fn from(err: CrmValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Trim a required text field.
///
/// # Errors
///
/// Returns `Required(field)` if nothing is left after trimming.
pub fn require_text(field: &'static str, value: &str) -> Result<String, CrmValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CrmValidationError::Required(field));
    }
    Ok(trimmed.to_string())
}

/// Check that an event's end, when set, is not before its start.
///
/// # Errors
///
/// Returns `EventEndsBeforeStart` if `ends_at < starts_at`.
pub fn validate_event_window(
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), CrmValidationError> {
    match ends_at {
        Some(end) if end < starts_at => Err(CrmValidationError::EventEndsBeforeStart),
        _ => Ok(()),
    }
}

/// # Errors
///
/// Returns `NegativeSlots` if `slots < 0`.
pub fn validate_tier_slots(slots: i32) -> Result<(), CrmValidationError> {
    if slots < 0 {
        return Err(CrmValidationError::NegativeSlots(slots));
    }
    Ok(())
}

/// # Errors
///
/// Returns `NegativePrice` if `price < 0`.
pub fn validate_tier_price(price: Decimal) -> Result<(), CrmValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CrmValidationError::NegativePrice(price));
    }
    Ok(())
}

/// # Errors
///
/// Returns `QuantityTooSmall` if `quantity < 1`.
pub fn validate_counterpart_quantity(quantity: i32) -> Result<(), CrmValidationError> {
    if quantity < 1 {
        return Err(CrmValidationError::QuantityTooSmall(quantity));
    }
    Ok(())
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_slots_accept_iff_non_negative(slots in any::<i32>()) {
            prop_assert_eq!(validate_tier_slots(slots).is_ok(), slots >= 0);
        }

        #[test]
        fn prop_quantity_accept_iff_positive(quantity in any::<i32>()) {
            prop_assert_eq!(validate_counterpart_quantity(quantity).is_ok(), quantity >= 1);
        }

        #[test]
        fn prop_price_accept_iff_non_negative(cents in any::<i64>()) {
            let price = Decimal::new(cents, 2);
            prop_assert_eq!(validate_tier_price(price).is_ok(), cents >= 0);
        }
    }
}
