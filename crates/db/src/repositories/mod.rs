//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod activity;
pub mod contact;
pub mod deal;
pub mod document;
pub mod event;
pub mod oauth_token;
pub mod organization;
pub mod sponsorship;
pub mod tag;
pub mod user;

pub use activity::{ActivityRepository, CreateActivityInput};
pub use contact::{ContactFilter, ContactRepository, CreateContactInput, UpdateContactInput};
pub use deal::{CreateDealInput, DealFilter, DealRepository, UpdateDealInput};
pub use document::DocumentRepository;
pub use event::{CreateEventInput, EventRepository, UpdateEventInput};
pub use oauth_token::{OAuthTokenRepository, UpsertOAuthTokenInput};
pub use organization::{CreateOrganizationInput, OrganizationRepository, UpdateOrganizationInput};
pub use sponsorship::{
    CreateCounterpartInput, CreateTierInput, SponsorshipRepository, TierFilter, UpdateTierInput,
};
pub use tag::{CreateTagInput, TagRepository, UpdateTagInput};
pub use user::UserRepository;

use dealdesk_shared::types::PageRequest;
use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QuerySelect, Select,
};

/// Runs a count and a windowed fetch for one page of `query`.
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    page: &PageRequest,
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let total = query.clone().count(db).await?;
    let items = query
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;
    Ok((items, total))
}
