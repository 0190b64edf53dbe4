use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} is missing")]
    MissingCredential(&'static str),

    #[error("Token exchange failed: {status} - {body}")]
    TokenExchange { status: u16, body: String },

    #[error("Token refresh failed: {status} - {body}")]
    Refresh { status: u16, body: String },

    #[error("Downstream API error: HTTP {status}")]
    Downstream { status: u16, body: serde_json::Value },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
