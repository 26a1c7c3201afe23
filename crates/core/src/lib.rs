//! Core business logic for Dealdesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Repositories are traits here and implemented by the db crate.
//!
//! # Modules
//!
//! - `storage` - Object storage over Apache OpenDAL
//! - `document` - Upload with compensating rollback, and deletion
//! - `auth` - Password hashing and the admin allow-list
//! - `crm` - Pipeline enums and field rules

pub mod auth;
pub mod crm;
pub mod document;
pub mod storage;
