//! Session context and gate
//!
//! The token pair lives in exactly one place, a [`SessionContext`], which
//! is handed to the API client. Only the context creates or destroys it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};
use crate::account::types::TokenPair;
use crate::error::ClientError;

/// Where the token pair is persisted between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<TokenPair>, ClientError>;
    fn save(&self, tokens: &TokenPair) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// JSON file holding `{"access": ..., "refresh": ...}`.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, ClientError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<TokenPair>(&text) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                warn!("Ignoring unreadable session file '{}': {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, tokens: &TokenPair) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let text = serde_json::to_string_pretty(tokens)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        write_private(&self.path, text.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Token file is readable by its owner only, also when it already existed.
#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenPair>, ClientError> {
        Ok(self.tokens.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, tokens: &TokenPair) -> Result<(), ClientError> {
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.tokens.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

pub struct SessionContext {
    store: Box<dyn TokenStore>,
    tokens: RwLock<Option<TokenPair>>,
}

impl SessionContext {
    /// Reads whatever the store holds; an empty store is a logged-out session.
    pub fn open(store: Box<dyn TokenStore>) -> Result<Arc<Self>, ClientError> {
        let tokens = store.load()?;
        debug!("Session opened (active: {})", tokens.is_some());
        Ok(Arc::new(Self {
            store,
            tokens: RwLock::new(tokens),
        }))
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Result<Arc<Self>, ClientError> {
        Self::open(Box::new(FileTokenStore::new(path)))
    }

    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self {
            store: Box::new(MemoryTokenStore::default()),
            tokens: RwLock::new(None),
        })
    }

    pub fn is_active(&self) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or(false, |t| !t.access.is_empty())
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|t| t.access.clone())
            .filter(|t| !t.is_empty())
    }

    /// Stores a fresh pair after a successful login.
    pub fn create(&self, tokens: TokenPair) -> Result<(), ClientError> {
        self.store.save(&tokens)?;
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = Some(tokens);
        info!("Session created");
        Ok(())
    }

    /// Drops both tokens. Used on logout and on any authorization failure;
    /// never fails, a store error is only logged.
    pub fn destroy(&self) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Err(e) = self.store.clear() {
            warn!("Could not clear stored session: {}", e);
        }
        info!("Session destroyed");
    }
}

/// Outcome of entering a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Enter,
    Redirect,
}

/// Checked before any protected content is fetched or rendered.
pub fn gate(session: &SessionContext) -> Gate {
    if session.is_active() {
        Gate::Enter
    } else {
        Gate::Redirect
    }
}
