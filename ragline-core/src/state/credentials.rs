//! Persisted credentials in the `~/.ragline` dot folder.
//!
//! The token is written on login/register, removed on logout, and read
//! once at startup by the composition root; the API layer never touches
//! this store directly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::AuthSession;
use crate::config::constants::dot_dir;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("could not determine home directory")]
    HomeDirNotFound,
    #[error("credential store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize credentials: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub token: String,
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl From<AuthSession> for StoredCredentials {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user_id: session.user_id,
            email: session.email,
            first_name: session.first_name,
            last_name: session.last_name,
        }
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
    file: PathBuf,
}

impl CredentialStore {
    /// Store under `~/.ragline/credentials.toml`.
    pub fn new() -> Result<Self, CredentialError> {
        let home = dirs::home_dir().ok_or(CredentialError::HomeDirNotFound)?;
        Ok(Self::at(home.join(dot_dir::DIR_NAME)))
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: PathBuf) -> Self {
        let file = dir.join(dot_dir::CREDENTIALS_FILE);
        Self { dir, file }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Load the stored credentials; `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<StoredCredentials>, CredentialError> {
        if !self.file.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.file)?;
        Ok(Some(toml::from_str(&content)?))
    }

    pub fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialError> {
        fs::create_dir_all(&self.dir)?;
        let content = toml::to_string_pretty(credentials)?;
        fs::write(&self.file, content)?;
        tracing::info!(path = %self.file.display(), "credentials saved");
        Ok(())
    }

    /// Remove the stored credentials. Idempotent.
    pub fn clear(&self) -> Result<(), CredentialError> {
        if self.file.exists() {
            fs::remove_file(&self.file)?;
            tracing::info!(path = %self.file.display(), "credentials cleared");
        }
        Ok(())
    }
}
