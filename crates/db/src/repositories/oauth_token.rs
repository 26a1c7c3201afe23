//! OAuth token repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::entities::oauth_tokens;

/// Token set returned by a provider's token endpoint.
#[derive(Debug, Clone)]
pub struct UpsertOAuthTokenInput {
    /// Owner of the grant.
    pub user_id: Uuid,
    /// Provider name, e.g. `google`.
    pub provider: String,
    /// Access token.
    pub access_token: String,
    /// Refresh token, if issued.
    pub refresh_token: Option<String>,
    /// Granted scopes.
    pub scope: Option<String>,
    /// Access token expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Repository for stored OAuth grants.
#[derive(Debug, Clone)]
pub struct OAuthTokenRepository {
    db: DatabaseConnection,
}

impl OAuthTokenRepository {
    /// Creates a new OAuth token repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts or replaces the grant for `(user_id, provider)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(&self, input: UpsertOAuthTokenInput) -> Result<oauth_tokens::Model, DbErr> {
        let now = Utc::now().into();
        let token = oauth_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            provider: Set(input.provider),
            access_token: Set(input.access_token),
            refresh_token: Set(input.refresh_token),
            scope: Set(input.scope),
            expires_at: Set(input.expires_at.map(Into::into)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        oauth_tokens::Entity::insert(token)
            .on_conflict(
                OnConflict::columns([oauth_tokens::Column::UserId, oauth_tokens::Column::Provider])
                    .update_columns([
                        oauth_tokens::Column::AccessToken,
                        oauth_tokens::Column::RefreshToken,
                        oauth_tokens::Column::Scope,
                        oauth_tokens::Column::ExpiresAt,
                        oauth_tokens::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
    }

    /// Finds the grant for `(user_id, provider)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        user_id: Uuid,
        provider: &str,
    ) -> Result<Option<oauth_tokens::Model>, DbErr> {
        oauth_tokens::Entity::find()
            .filter(oauth_tokens::Column::UserId.eq(user_id))
            .filter(oauth_tokens::Column::Provider.eq(provider))
            .one(&self.db)
            .await
    }
}
