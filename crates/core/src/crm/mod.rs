//! CRM domain types and field rules.
//!
//! Pipeline stages, activity kinds, and the checks applied to deals, events,
//! sponsorship tiers and their counterparts before anything is written.

mod types;
mod validation;

pub use types::{ActivityKind, DealStage};
pub use validation::{
    CrmValidationError, require_text, validate_counterpart_quantity, validate_event_window,
    validate_tier_price, validate_tier_slots,
};
