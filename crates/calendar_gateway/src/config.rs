use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Runtime configuration, read once at startup and immutable thereafter.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OAuth application (client) id from the provider app registration.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Space-delimited OAuth scope string.
    pub scopes: String,
    /// Redirect URI the provider sends the authorization code back to.
    pub redirect_url: String,
    /// Directory tenant from the app registration. The consumers endpoints
    /// are used regardless; the value is kept for parity with the registration.
    pub tenant_id: Option<String>,
    /// Override for the token file location.
    pub token_file: Option<PathBuf>,
    /// Listen address.
    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Load settings from the environment, reading `.env` if present.
    ///
    /// Missing any of CLIENT_ID, CLIENT_SECRET, SCOPES or REDIRECT_URL is a
    /// fatal startup error.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let client_id = require("CLIENT_ID")?;
        let client_secret = require("CLIENT_SECRET")?;
        let scopes = require("SCOPES")?;
        let redirect_url = require("REDIRECT_URL")?;

        let tenant_id = env::var("TENANT_ID").ok();
        let token_file = env::var("TOKEN_FILE").ok().map(PathBuf::from);
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        Ok(Self {
            client_id,
            client_secret,
            scopes,
            redirect_url,
            tenant_id,
            token_file,
            host,
            port,
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}
