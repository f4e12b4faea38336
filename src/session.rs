// SPDX-License-Identifier: MIT
//! Client-side session persistence.
//!
//! An authenticated session is the triple the server hands back on login:
//! access token, refresh token, and the user snapshot. The browser build
//! of this UI kept the triple in local storage; here it lives in a single
//! JSON file at `{data_dir}/session.json`, written with user-only
//! permissions and cleared wholesale on logout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::ApiClient;
use crate::models::User;

/// One authenticated session. Treated as an immutable snapshot: token
/// refresh and login replace the whole value, they never patch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// Loads, saves, and clears the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("session.json"),
        }
    }

    /// Read the stored session. A missing or unreadable file means no
    /// session; a corrupt file is treated the same way, with a warning.
    pub fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), err = %e, "discarding corrupt session file");
                None
            }
        }
    }

    /// Persist `session`, restricting the file to owner read/write on Unix.
    /// The tokens inside are the only credentials this client holds.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating data dir {}", dir.display()))?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("writing {}", self.path.display()))?;

        // Restrict to owner read/write only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Delete the session file. Absent file is fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Best-effort server-side logout followed by an unconditional local clear.
///
/// The server call invalidates the refresh token; when it fails (network
/// down, token already dead) the local session is still removed, so the
/// client always ends up signed out.
pub async fn sign_out(api: &ApiClient, store: &SessionStore) -> Result<()> {
    if let Some(session) = store.load() {
        if let Err(e) = api.logout(&session.access, &session.refresh).await {
            warn!("server logout failed: {e}; clearing local session anyway");
        }
    }
    store.clear()
}
