//! OAuth flow handlers.
//!
//! HTTP handlers for the consent redirect, the provider callback, and
//! on-demand token refresh, plus the two plain pages. Failures from the
//! OAuth client arrive as typed errors; this layer alone maps them to HTTP
//! statuses and bodies.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::AppState;

/// Redirect the browser into the provider consent screen.
pub async fn oauth_redirect(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let url = state.oauth.authorization_url();
    (StatusCode::FOUND, [(header::LOCATION, url)])
}

/// Query parameters delivered to the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Receive the authorization-code callback from the provider.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackQuery>,
) -> impl IntoResponse {
    if let Some(error) = params.error {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": error, "description": params.error_description })),
        );
    }

    let Some(code) = params.code else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No authorization code received" })),
        );
    };

    let _guard = state.auth_guard.lock().await;
    match state.oauth.exchange_code(&code).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Token received successfully" })),
        ),
        Err(e) => {
            error!("authorization code exchange failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch tokens" })),
            )
        }
    }
}

/// Refresh the stored access token on demand.
pub async fn refresh_token(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let _guard = state.auth_guard.lock().await;

    let record = state.token_store.load();
    let Some(refresh) = record.refresh_token.filter(|t| !t.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Refresh token is missing" })),
        );
    };

    match state.oauth.refresh(&refresh).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Access token refreshed successfully" })),
        ),
        Err(e) => {
            error!("access token refresh failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to refresh access token" })),
            )
        }
    }
}

/// Landing page.
pub async fn index() -> &'static str {
    "Welcome to the Home Page"
}

#[derive(Debug, Deserialize)]
pub struct ErrorPageQuery {
    pub message: Option<String>,
}

/// Human-readable error page.
pub async fn error_page(Query(params): Query<ErrorPageQuery>) -> String {
    let message = params
        .message
        .unwrap_or_else(|| "An error occurred".to_string());
    format!("An error occurred: {}", message)
}
