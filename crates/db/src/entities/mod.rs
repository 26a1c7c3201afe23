//! `SeaORM` entities for the CRM schema.
//!
//! Hand-maintained against the managed Postgres schema; there is no
//! migration runner in this workspace.

pub mod activities;
pub mod contacts;
pub mod deal_tags;
pub mod deals;
pub mod documents;
pub mod events;
pub mod oauth_tokens;
pub mod organizations;
pub mod sponsorship_tiers;
pub mod tags;
pub mod tier_counterparts;
pub mod users;
