use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::{AuthResponse, User};

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "auth_user";

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String key-value persistence, shaped after browser local storage.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove_item(&self, key: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.entries.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().map_err(|_| SessionError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().map_err(|_| SessionError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Keeps every entry in one JSON object at `<data_dir>/session.json`.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, SessionError> {
        fs::create_dir_all(data_dir.as_ref())?;
        Ok(Self {
            path: data_dir.as_ref().join(SESSION_FILE),
            lock: Mutex::new(()),
        })
    }

    /// Opens the store under `PROJECTHUB_DATA_DIR` (via [`ClientConfig::data_dir`]).
    pub fn from_config(config: &ClientConfig) -> Result<Self, SessionError> {
        Self::new(&config.data_dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), SessionError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Credentials handed explicitly to the API client.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Reads the `exp` claim without checking the signature; only the backend can verify.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    Utc.timestamp_opt(data.claims.exp?, 0).single()
}

pub struct TokenManager<S: Storage> {
    storage: S,
}

impl<S: Storage> TokenManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn set_token(&self, token: &str) -> Result<(), SessionError> {
        self.storage.set_item(TOKEN_KEY, token)
    }

    pub fn get_token(&self) -> Result<Option<String>, SessionError> {
        self.storage.get_item(TOKEN_KEY)
    }

    /// Drops the token together with the cached user.
    pub fn remove_token(&self) -> Result<(), SessionError> {
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(USER_KEY)
    }

    pub fn set_user(&self, user: &User) -> Result<(), SessionError> {
        let encoded = serde_json::to_string(user)?;
        self.storage.set_item(USER_KEY, &encoded)
    }

    pub fn get_user(&self) -> Result<Option<User>, SessionError> {
        match self.storage.get_item(USER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Presence check only; see [`TokenManager::has_live_session`] for expiry.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.get_token(), Ok(Some(token)) if !token.is_empty())
    }

    pub fn token_expiry(&self) -> Result<Option<DateTime<Utc>>, SessionError> {
        Ok(self.get_token()?.as_deref().and_then(token_expiry))
    }

    /// A token is stored and, when it carries `exp`, that moment is still ahead of `now`.
    pub fn has_live_session(&self, now: DateTime<Utc>) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        match self.token_expiry() {
            Ok(Some(expiry)) => expiry > now,
            Ok(None) => true,
            Err(_) => false,
        }
    }

    pub fn store_login(&self, response: &AuthResponse) -> Result<Session, SessionError> {
        self.set_token(&response.access_token)?;
        self.set_user(&response.user)?;
        tracing::info!(user_id = %response.user.id, "session stored");
        Ok(Session {
            token: response.access_token.clone(),
            user: Some(response.user.clone()),
        })
    }

    pub fn session(&self) -> Result<Option<Session>, SessionError> {
        let token = match self.get_token()? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };
        Ok(Some(Session {
            token,
            user: self.get_user()?,
        }))
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.remove_token()?;
        tracing::info!("session cleared");
        Ok(())
    }
}
