use crate::models::User;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk credentials, keyed the same way the web client keyed local storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: Option<User>,
    pub saved_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Session {
        Session { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file reads as signed out.
    pub fn load(&self) -> StoredSession {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("ignoring corrupt session file {}: {}", self.path.display(), err);
                StoredSession::default()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => StoredSession::default(),
            Err(err) => {
                warn!("failed to read session file {}: {}", self.path.display(), err);
                StoredSession::default()
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.load().token.filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<User> {
        self.load().user
    }

    pub fn save(&self, token: &str, user: User) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let stored = StoredSession {
            token: Some(token.to_string()),
            user: Some(user),
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        let raw = serde_json::to_string_pretty(&stored).map_err(io::Error::other)?;
        fs::write(&self.path, raw)?;
        info!("session saved to {}", self.path.display());
        Ok(())
    }

    /// Drops the token only. Returns whether a token was present.
    pub fn clear_token(&self) -> io::Result<bool> {
        let mut stored = self.load();
        if stored.token.take().is_none() {
            return Ok(false);
        }
        let raw = serde_json::to_string_pretty(&stored).map_err(io::Error::other)?;
        fs::write(&self.path, raw)?;
        debug!("token removed from {}", self.path.display());
        Ok(true)
    }

    /// Sign out: removes token and user.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}
