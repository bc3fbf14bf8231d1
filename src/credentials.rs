use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{MailError, Result};

/// The persisted OAuth2 token set plus the client metadata needed to mint
/// new access tokens. This is the only state that outlives a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSet {
    pub access_token: String,
    pub refresh_token: String,
    pub expiry: DateTime<Utc>,
    pub scopes: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
}

impl CredentialSet {
    /// True when the access token expires within `margin` from now.
    /// Callers refresh proactively instead of racing the deadline.
    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expiry <= Utc::now() + margin
    }
}

/// Durable storage for the credential set at a fixed JSON path.
///
/// Holds no in-memory copy: every refresh re-persists immediately so a crash
/// mid-session cannot lose a valid token. The internal mutex serializes the
/// load-refresh-save sequence across concurrent invocations.
pub struct CredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Acquired by the refresher for the duration of a check-refresh-save
    /// cycle so a stale write cannot clobber a fresh token.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub fn load(&self) -> Result<CredentialSet> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MailError::NotFound(self.path.display().to_string()))
            }
            Err(e) => return Err(MailError::Storage(format!("{}: {e}", self.path.display()))),
        };
        serde_json::from_str(&raw)
            .map_err(|e| MailError::Storage(format!("{}: {e}", self.path.display())))
    }

    /// Atomically overwrites the persisted record: write to a temp file in
    /// the same directory, then rename over the target so readers never see
    /// a partial write.
    pub fn save(&self, credentials: &CredentialSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| MailError::Storage(format!("{}: {e}", parent.display())))?;
            }
        }
        let serialized = serde_json::to_string_pretty(credentials)
            .map_err(|e| MailError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialized)
            .map_err(|e| MailError::Storage(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| MailError::Storage(format!("{}: {e}", self.path.display())))
    }
}
