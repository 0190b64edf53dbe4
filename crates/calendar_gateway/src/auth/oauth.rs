//! OAuth client for the Microsoft identity platform.
//!
//! Two terminal operations against the provider's token endpoint: the
//! authorization-code exchange and the refresh-token exchange. Both are pure
//! request/response with no retry; a non-200 surfaces immediately as a typed
//! failure and the caller decides the user-facing response.

use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use super::token_store::TokenStore;
use crate::config::Settings;
use crate::error::{Error, Result};

/// Fixed anti-forgery value carried through the consent round-trip.
const OAUTH_STATE: &str = "outlookcalendarsync";

/// Microsoft identity platform endpoints for consumer accounts.
const AUTHORIZE_URL: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/authorize";
const TOKEN_URL: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/token";

/// OAuth provider configuration.
///
/// Endpoint URLs are plain fields so tests can point the client at a local
/// mock server.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub scopes: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl OAuthConfig {
    /// Provider configuration from runtime settings, using the Microsoft
    /// consumers endpoints.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            scopes: settings.scopes.clone(),
            redirect_uri: settings.redirect_url.clone(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
        }
    }
}

/// Token response body from the provider's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// Result of a successful authorization-code exchange. Transient; persisted
/// only through the token store.
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    pub access_token: String,
    pub refresh_token: String,
}

/// Client for the authorization-code and refresh-token flows.
///
/// Holds no state of its own beyond the shared HTTP client; successful
/// exchanges are persisted through the token store before returning.
#[derive(Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    store: TokenStore,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig, store: TokenStore) -> Self {
        Self {
            config,
            store,
            http: reqwest::Client::new(),
        }
    }

    /// Build the provider consent URL.
    pub fn authorization_url(&self) -> String {
        let mut url = Url::parse(&self.config.authorize_url).expect("Invalid authorize URL");

        url.query_pairs_mut()
            .append_pair("scope", &self.config.scopes)
            .append_pair("response_type", "code")
            .append_pair("response_mode", "query")
            .append_pair("state", OAUTH_STATE)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("client_id", &self.config.client_id);

        url.to_string()
    }

    /// Exchange an authorization code for an access/refresh token pair.
    ///
    /// On success both tokens are persisted before returning. Authorization
    /// codes are single-use: a failed exchange is surfaced immediately and
    /// must not be retried with the same code.
    pub async fn exchange_code(&self, code: &str) -> Result<AuthorizationResult> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("scope", self.config.scopes.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!("authorization code exchange rejected: HTTP {}", status);
            return Err(Error::TokenExchange { status, body });
        }

        let tokens: TokenResponse = response.json().await?;
        let refresh_token = tokens.refresh_token.ok_or_else(|| Error::TokenExchange {
            status: 200,
            body: "token response missing refresh_token".to_string(),
        })?;

        self.store.save(&tokens.access_token, &refresh_token)?;
        info!("authorization code exchanged, tokens persisted");

        Ok(AuthorizationResult {
            access_token: tokens.access_token,
            refresh_token,
        })
    }

    /// Obtain a new access token from a refresh token.
    ///
    /// The provider may rotate the refresh token on use: when the response
    /// carries a new one it is persisted, otherwise the presented token is
    /// kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("scope", self.config.scopes.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            // Prefer the provider's structured error body when it parses.
            let body = match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(parsed) => parsed.to_string(),
                Err(_) => text,
            };
            warn!("refresh token exchange rejected: HTTP {}", status);
            return Err(Error::Refresh { status, body });
        }

        let tokens: TokenResponse = response.json().await?;
        let kept_refresh = tokens.refresh_token.as_deref().unwrap_or(refresh_token);

        self.store.save(&tokens.access_token, kept_refresh)?;
        info!("access token refreshed");

        Ok(tokens.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_store::TokenRecord;
    use mockito::{Matcher, Server};
    use tempfile::tempdir;

    fn test_config(token_url: String) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            scopes: "Calendars.ReadWrite offline_access".to_string(),
            redirect_uri: "http://localhost:8000/oauth/callback".to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url,
        }
    }

    fn test_store() -> (tempfile::TempDir, TokenStore) {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        (dir, store)
    }

    #[test]
    fn authorization_url_carries_fixed_state() {
        let (_dir, store) = test_store();
        let client = OAuthClient::new(test_config("http://unused.invalid/token".into()), store);

        let url = client.authorization_url();

        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("response_mode=query"));
        assert!(url.contains("state=outlookcalendarsync"));
        assert!(url.contains("client_id=client-id"));
    }

    #[tokio::test]
    async fn exchange_code_persists_tokens_on_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "code1".into()),
                Matcher::UrlEncoded("client_id".into(), "client-id".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"A","refresh_token":"R","expires_in":3600}"#)
            .create_async()
            .await;

        let (_dir, store) = test_store();
        let client = OAuthClient::new(test_config(server.url() + "/token"), store.clone());

        let result = client.exchange_code("code1").await.unwrap();
        mock.assert_async().await;

        assert_eq!(result.access_token, "A");
        assert_eq!(result.refresh_token, "R");

        let record = store.load();
        assert_eq!(record.access_token.as_deref(), Some("A"));
        assert_eq!(record.refresh_token.as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn exchange_code_failure_leaves_store_untouched() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let (_dir, store) = test_store();
        let client = OAuthClient::new(test_config(server.url() + "/token"), store.clone());

        let err = client.exchange_code("used-code").await.unwrap_err();
        match err {
            Error::TokenExchange { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("expected TokenExchange error, got {:?}", other),
        }

        assert_eq!(store.load(), TokenRecord::default());
    }

    #[tokio::test]
    async fn refresh_keeps_presented_token_when_not_rotated() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "R".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"A2"}"#)
            .create_async()
            .await;

        let (_dir, store) = test_store();
        let client = OAuthClient::new(test_config(server.url() + "/token"), store.clone());

        let access = client.refresh("R").await.unwrap();
        assert_eq!(access, "A2");

        let record = store.load();
        assert_eq!(record.access_token.as_deref(), Some("A2"));
        assert_eq!(record.refresh_token.as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn refresh_persists_rotated_refresh_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"A2","refresh_token":"R2"}"#)
            .create_async()
            .await;

        let (_dir, store) = test_store();
        let client = OAuthClient::new(test_config(server.url() + "/token"), store.clone());

        client.refresh("R").await.unwrap();

        let record = store.load();
        assert_eq!(record.refresh_token.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn refresh_failure_carries_provider_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant","error_description":"expired"}"#)
            .create_async()
            .await;

        let (_dir, store) = test_store();
        let client = OAuthClient::new(test_config(server.url() + "/token"), store.clone());

        let err = client.refresh("stale").await.unwrap_err();
        match err {
            Error::Refresh { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("expected Refresh error, got {:?}", other),
        }

        // Failed refresh leaves whatever was stored before.
        assert_eq!(store.load(), TokenRecord::default());
    }
}
