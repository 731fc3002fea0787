//! Session context and its persistence.
//!
//! The session is an explicit capability object passed to the client, not
//! ambient global state: the pagination/toggle core stays testable without
//! any real credential storage behind it. Persistence across CLI
//! invocations uses OS-backed secure storage:
//! - macOS/iOS: Keychain
//! - Linux: Secret Service API (gnome-keyring, KWallet, etc.)
//! - Windows: Credential Manager
//!
//! A plain-file backend exists for environments without a keyring.

use std::fs;
use std::path::PathBuf;

use keyring::Entry;
use serde::{Deserialize, Serialize};

const SERVICE_NAME: &str = "com.tapro.cli";
const SESSION_KEY: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
}

/// Bearer credentials plus the profile they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

impl Session {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.full_name.as_deref())
            .unwrap_or("You")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub enum SessionStore {
    Keyring,
    File(PathBuf),
}

impl SessionStore {
    pub fn keyring() -> Self {
        SessionStore::Keyring
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        SessionStore::File(path.into())
    }

    /// Default file location, for use when no keyring service is available.
    pub fn default_file() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        SessionStore::File(base.join("tapro").join("session.json"))
    }

    pub fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let raw = match self {
            SessionStore::Keyring => {
                let entry = Entry::new(SERVICE_NAME, SESSION_KEY)?;
                match entry.get_password() {
                    Ok(value) => value,
                    Err(keyring::Error::NoEntry) => return Ok(None),
                    Err(e) => return Err(e.into()),
                }
            }
            SessionStore::File(path) => {
                if !path.exists() {
                    return Ok(None);
                }
                fs::read_to_string(path)?
            }
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_string(session)?;
        match self {
            SessionStore::Keyring => {
                let entry = Entry::new(SERVICE_NAME, SESSION_KEY)?;
                entry.set_password(&raw)?;
            }
            SessionStore::File(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, raw)?;
            }
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionStoreError> {
        match self {
            SessionStore::Keyring => {
                let entry = Entry::new(SERVICE_NAME, SESSION_KEY)?;
                match entry.delete_credential() {
                    Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
            SessionStore::File(path) => {
                if path.exists() {
                    fs::remove_file(path)?;
                }
                Ok(())
            }
        }
    }
}
