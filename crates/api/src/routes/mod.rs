//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod admin;
pub mod auth;
pub mod contacts;
pub mod deals;
pub mod documents;
pub mod events;
pub mod health;
pub mod integrations;
pub mod organizations;
pub mod sponsorship;
pub mod tags;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(admin::routes())
        .merge(organizations::routes())
        .merge(contacts::routes())
        .merge(deals::routes())
        .merge(tags::routes())
        .merge(events::routes())
        .merge(sponsorship::routes())
        .merge(documents::routes(state.max_file_size))
        .merge(integrations::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
