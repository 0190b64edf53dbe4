//! File-backed token persistence.
//!
//! A single JSON record holds the access/refresh token pair. The backing
//! file is the only source of truth: every load and save touches it
//! directly, so there is no in-memory state to fall out of sync.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// The persisted credential record.
///
/// Both fields are written together on every update. A missing or unreadable
/// backing file yields a record with both fields absent; callers that need a
/// credential check the fields explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Handle to the token file, cheap to clone into application state.
///
/// An internal lock serializes file access so concurrent handlers cannot
/// interleave partial read/write sequences.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
    file_lock: Arc<Mutex<()>>,
}

impl TokenStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Default token file location: `~/.calendar_gateway/tokens.json`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        Ok(home.join(".calendar_gateway").join("tokens.json"))
    }

    /// Read the persisted record.
    ///
    /// A missing file, or one that does not parse as the record shape,
    /// yields an all-absent record rather than an error.
    pub fn load(&self) -> TokenRecord {
        let _guard = self.file_lock.lock().unwrap();

        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        "token file at {:?} is not a valid record, treating as empty: {}",
                        self.path, e
                    );
                    TokenRecord::default()
                }
            },
            Err(_) => TokenRecord::default(),
        }
    }

    /// Persist both tokens, overwriting the previous record wholesale.
    ///
    /// The record is written to a temp sibling and renamed into place so a
    /// crash cannot leave a half-written file.
    pub fn save(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        let record = TokenRecord {
            access_token: Some(access_token.to_string()),
            refresh_token: Some(refresh_token.to_string()),
        };
        let content = serde_json::to_string_pretty(&record)?;

        let _guard = self.file_lock.lock().unwrap();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        // Token material: owner-only on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600));
        }

        debug!("saved token record to {:?}", self.path);
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
