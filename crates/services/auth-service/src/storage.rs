//! Session persistence between runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use common::{AppError, AppResult};
use domain::Session;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Where the session store keeps the current session.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// The persisted session, if any
    async fn load(&self) -> AppResult<Option<Session>>;

    async fn save(&self, session: &Session) -> AppResult<()>;

    /// Forget the persisted session; a no-op when nothing is stored
    async fn clear(&self) -> AppResult<()>;
}

/// JSON file on local disk.
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> AppError {
    AppError::storage(format!("failed to {} {}: {}", action, path.display(), err))
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> AppResult<Option<Session>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &self.path, e)),
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // Unreadable file is treated as signed out
                warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create", parent, e))?;
        }

        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| AppError::storage(format!("failed to encode session: {}", e)))?;

        let temp = self.temp_path();
        match fs::remove_file(&temp).await {
            Ok(()) => debug!("Removed stale {}", temp.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(storage_error("remove", &temp, e)),
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        // Tokens are readable by the owner only, from the first byte
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&temp)
            .await
            .map_err(|e| storage_error("create", &temp, e))?;
        file.write_all(&json)
            .await
            .map_err(|e| storage_error("write", &temp, e))?;
        file.sync_all()
            .await
            .map_err(|e| storage_error("write", &temp, e))?;
        drop(file);

        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| storage_error("replace", &self.path, e))?;
        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Default)]
pub struct MemorySessionStorage {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> AppResult<Option<Session>> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.session.lock().await = None;
        Ok(())
    }
}
