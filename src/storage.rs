use crate::errors::ClientError;
use crate::models::{Session, StoredSession};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tokio::fs;
use tracing::error;

/// Client-side persistence for the teacher session.
pub trait SessionStore {
    /// Unreadable or malformed state counts as no session.
    fn load(&self) -> impl Future<Output = Option<Session>> + Send;
    fn save(&self, session: &Session) -> impl Future<Output = Result<(), ClientError>> + Send;
    fn clear(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> Option<Session> {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<StoredSession>(&bytes) {
                Ok(stored) => stored.into_session(),
                Err(err) => {
                    error!("failed to parse session file: {err}");
                    None
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                error!("failed to read session file: {err}");
                None
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(&StoredSession::from(session))?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local store; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<StoredSession>>,
}

impl MemorySessionStore {
    pub fn with_session(token: &str, username: &str) -> Self {
        let store = Self::default();
        store.put(StoredSession {
            auth_token: Some(token.to_string()),
            current_user: Some(username.to_string()),
        });
        store
    }

    pub fn snapshot(&self) -> StoredSession {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or_default()
    }

    fn put(&self, stored: StoredSession) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = stored;
        }
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Option<Session> {
        self.snapshot().into_session()
    }

    async fn save(&self, session: &Session) -> Result<(), ClientError> {
        self.put(StoredSession::from(session));
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        self.put(StoredSession::default());
        Ok(())
    }
}
