//! Calendar Gateway Service
//!
//! Brokers OAuth2 authorization-code and refresh-token flows against the
//! Microsoft identity platform and forwards calendar CRUD requests to the
//! Microsoft Graph API with bearer tokens.
//!
//! # Features
//! - Authorization-code exchange and refresh-token flows
//! - File-backed token persistence
//! - HTTP server exposing the auth flow and calendar proxy endpoints

pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod server;

pub use auth::{AuthorizationResult, OAuthClient, OAuthConfig, TokenRecord, TokenStore};
pub use calendar::CalendarClient;
pub use config::Settings;
pub use error::{Error, Result};
pub use server::{start_server, AppState};
