//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the CRM schema
//! - Repository abstractions for data access
//! - The `DocumentRepository` used by the upload coordinator

pub mod entities;
pub mod repositories;

pub use repositories::{
    ActivityRepository, ContactFilter, ContactRepository, CreateActivityInput,
    CreateContactInput, CreateCounterpartInput, CreateDealInput, CreateEventInput,
    CreateOrganizationInput, CreateTagInput, CreateTierInput, DealFilter, DealRepository,
    DocumentRepository, EventRepository, OAuthTokenRepository, OrganizationRepository,
    SponsorshipRepository, TagRepository, TierFilter, UpdateContactInput, UpdateDealInput,
    UpdateEventInput, UpdateOrganizationInput, UpdateTagInput, UpdateTierInput,
    UpsertOAuthTokenInput, UserRepository,
};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
