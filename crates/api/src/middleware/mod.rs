//! Middleware for authentication and admin gating.

pub mod auth;

pub use auth::{AdminUser, AuthUser, auth_middleware};
