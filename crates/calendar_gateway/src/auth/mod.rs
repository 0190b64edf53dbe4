//! OAuth authentication: provider flows and token persistence.

pub mod oauth;
pub mod token_store;

pub use oauth::{AuthorizationResult, OAuthClient, OAuthConfig};
pub use token_store::{TokenRecord, TokenStore};
