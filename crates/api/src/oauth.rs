//! OAuth2 authorization-code client for calendar and mail integrations.
//!
//! Builds the consent URL and exchanges a returned code for tokens. There is
//! no refresh and no retry.

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use dealdesk_shared::config::OAuthProviderSettings;

/// OAuth client errors.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The provider has no client settings.
    #[error("{0} oauth is not configured")]
    NotConfigured(&'static str),

    /// A configured endpoint is not a valid URL.
    #[error("invalid oauth endpoint: {0}")]
    InvalidEndpoint(String),

    /// The request could not be sent or the response not read.
    #[error("oauth request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("oauth provider returned {status}: {body}")]
    Provider {
        /// HTTP status from the token endpoint.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    /// Access token.
    pub access_token: String,
    /// Refresh token, only on first consent.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Granted scopes, space separated.
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Absolute expiry computed from `expires_in`.
    #[must_use]
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| now + Duration::seconds(secs))
    }
}

/// Google OAuth2 client.
#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    settings: OAuthProviderSettings,
}

impl GoogleOAuthClient {
    /// Provider name stored in `oauth_tokens.provider`.
    pub const PROVIDER: &'static str = "google";

    /// Create a client from provider settings.
    #[must_use]
    pub fn new(settings: OAuthProviderSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Consent URL for the authorization-code flow.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEndpoint` if the configured auth URL does not parse.
    pub fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let scopes = self.settings.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scopes.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::InvalidEndpoint(e.to_string()))?;

        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns `Transport` on network failure and `Provider` on a non-2xx reply.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "OAuth code exchange rejected");
            return Err(OAuthError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let tokens: TokenSet = response.json().await?;
        debug!(has_refresh = tokens.refresh_token.is_some(), "OAuth code exchanged");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OAuthProviderSettings {
        OAuthProviderSettings {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: "shh".to_string(),
            redirect_uri: "https://crm.example.com/integrations/google/callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/calendar".to_string(),
                "openid".to_string(),
            ],
        }
    }

    #[test]
    fn test_authorize_url_carries_params() {
        let client = GoogleOAuthClient::new(settings());
        let url = Url::parse(&client.authorize_url("user-1").unwrap()).unwrap();

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-123.apps.googleusercontent.com");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "user-1");
        assert_eq!(
            params["scope"],
            "https://www.googleapis.com/auth/calendar openid"
        );
        assert!(!url.as_str().contains("shh"));
    }

    #[test]
    fn test_invalid_auth_url() {
        let mut s = settings();
        s.auth_url = "not a url".to_string();
        let client = GoogleOAuthClient::new(s);
        assert!(matches!(
            client.authorize_url("x"),
            Err(OAuthError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_token_set_expiry() {
        let tokens: TokenSet =
            serde_json::from_str(r#"{"access_token":"ya29","expires_in":3599,"token_type":"Bearer"}"#)
                .unwrap();
        let now = Utc::now();
        assert_eq!(tokens.expires_at(now), Some(now + Duration::seconds(3599)));
        assert!(tokens.refresh_token.is_none());
    }
}
