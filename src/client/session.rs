// src/client/session.rs
use crate::client::ClientError;
use crate::models::UserOut;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Everything a signed-in client remembers between calls.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Session {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserOut>,
    // Share link opened while signed out; survives sign-out
    #[serde(default)]
    pub pending_share_token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Session, ClientError>;
    fn save(&self, session: &Session) -> Result<(), ClientError>;

    /// Read, change and write back the session under the store's lock, so
    /// concurrent updates never see each other's half-applied state.
    fn update(&self, change: &mut dyn FnMut(&mut Session)) -> Result<Session, ClientError>;

    // Drop tokens and identity; the pending share token is kept
    fn clear(&self) -> Result<(), ClientError> {
        self.update(&mut |session| {
            *session = Session {
                pending_share_token: session.pending_share_token.take(),
                ..Session::default()
            }
        })?;
        Ok(())
    }

    fn set_pending_share_token(&self, token: &str) -> Result<(), ClientError> {
        self.update(&mut |session| session.pending_share_token = Some(token.to_string()))?;
        Ok(())
    }

    /// Returns the pending share token and forgets it, so it is used once.
    fn take_pending_share_token(&self) -> Result<Option<String>, ClientError> {
        let mut token = None;
        self.update(&mut |session| token = session.pending_share_token.take())?;
        Ok(token)
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, ClientError> {
        self.inner
            .lock()
            .map(|session| session.clone())
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        self.update(&mut |current| *current = session.clone())?;
        Ok(())
    }

    fn update(&self, change: &mut dyn FnMut(&mut Session)) -> Result<Session, ClientError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        change(&mut guard);
        Ok(guard.clone())
    }
}

// Session persisted as one JSON file
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileSessionStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, ()>, ClientError> {
        self.guard
            .lock()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))
    }

    // Callers hold `guard`
    fn read_file(&self) -> Result<Session, ClientError> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(session),
            Err(e) => {
                // A corrupt file reads as signed out
                error!("❌ Ignoring unreadable session file {:?}: {}", self.path, e);
                Ok(Session::default())
            }
        }
    }

    fn write_file(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(session)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Session saved to {:?}", self.path);
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, ClientError> {
        let _guard = self.locked()?;
        self.read_file()
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        let _guard = self.locked()?;
        self.write_file(session)
    }

    fn update(&self, change: &mut dyn FnMut(&mut Session)) -> Result<Session, ClientError> {
        let _guard = self.locked()?;
        let mut session = self.read_file()?;
        change(&mut session);
        self.write_file(&session)?;
        Ok(session)
    }
}
