//! Session lifecycle: login, token persistence and the current user.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use agora_config_and_utils::Paths;
use agora_types::{
    AuthToken, Credentials, DataError, DataResult, SignupRequest, User, UserId,
    VerificationRequest,
};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::StorageResult;
use crate::remote::AuthRemote;

/// Persistence for the bearer token.
pub trait TokenStore: Send + Sync {
    /// Load the stored token, if any.
    fn load(&self) -> StorageResult<Option<AuthToken>>;

    /// Store a token, replacing any previous one.
    fn save(&self, token: &AuthToken) -> StorageResult<()>;

    /// Forget the token. Returns whether one was stored.
    fn clear(&self) -> StorageResult<bool>;
}

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<AuthToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StorageResult<Option<AuthToken>> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &AuthToken) -> StorageResult<()> {
        *self.token.lock() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> StorageResult<bool> {
        Ok(self.token.lock().take().is_some())
    }
}

/// Token store backed by a JSON file, `~/.agora/session.json` by default.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(paths: &Paths) -> Self {
        Self::with_path(paths.session_file())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> StorageResult<Option<AuthToken>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, token: &AuthToken) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write to a sibling and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string(token)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> StorageResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Read-only view of who is logged in.
#[derive(Debug, Clone)]
pub struct AuthState {
    rx: watch::Receiver<Option<User>>,
}

impl AuthState {
    pub fn user(&self) -> Option<User> {
        self.rx.borrow().clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.rx.borrow().as_ref().map(|user| user.id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Fails with `Unauthorized` when nobody is logged in.
    pub fn require(&self) -> DataResult<User> {
        self.user().ok_or(DataError::Unauthorized)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.rx.clone()
    }
}

/// Owns the session: the token and the current user.
pub struct SessionRepository {
    remote: Arc<dyn AuthRemote>,
    store: Arc<dyn TokenStore>,
    user_tx: watch::Sender<Option<User>>,
}

impl SessionRepository {
    pub fn new(remote: Arc<dyn AuthRemote>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            remote,
            store,
            user_tx: watch::Sender::new(None),
        }
    }

    /// Handle other repositories use for the auth precondition.
    pub fn auth(&self) -> AuthState {
        AuthState {
            rx: self.user_tx.subscribe(),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user_tx.borrow().clone()
    }

    /// Log in, persist the token and publish the current user.
    ///
    /// The token is persisted only once the profile fetch succeeds; if it
    /// fails the session ends up fully anonymous.
    pub async fn login(&self, username: &str, password: &str) -> DataResult<User> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let token = self.remote.login(&credentials).await?;
        self.remote.set_token(token.clone()).await;

        let user = match self.remote.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Profile fetch after login failed");
                self.forget().await;
                return Err(e);
            }
        };

        if let Err(e) = self.store.save(&token) {
            warn!(error = %e, "Failed to persist session token");
        }
        info!(user_id = %user.id, "Logged in");
        self.user_tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Register an account. A 409 comes back as `UsernameTaken` or
    /// `EmailTaken`.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> DataResult<()> {
        let request = SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.remote.signup(&request).await?;
        info!("Signup accepted, awaiting verification");
        Ok(())
    }

    /// Confirm the emailed verification code.
    pub async fn verify(&self, email: &str, code: &str) -> DataResult<()> {
        let request = VerificationRequest {
            email: email.to_string(),
            code: code.to_string(),
        };
        self.remote.verify(&request).await
    }

    /// Resume a persisted session at startup.
    ///
    /// Returns `Ok(None)` when there is no usable token. A token the server
    /// rejects is discarded; any other failure keeps it for a later retry.
    pub async fn restore(&self) -> DataResult<Option<User>> {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted session");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                return Ok(None);
            }
        };

        self.remote.set_token(token).await;

        match self.remote.current_user().await {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                self.user_tx.send_replace(Some(user.clone()));
                Ok(Some(user))
            }
            Err(DataError::Unauthorized) => {
                info!("Persisted session expired");
                self.forget().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the token everywhere and clear the current user.
    pub async fn logout(&self) {
        self.forget().await;
        info!("Logged out");
    }

    async fn forget(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.remote.clear_token().await;
        self.user_tx.send_replace(None);
    }

    /// Public profile of another user.
    pub async fn user_profile(&self, username: &str) -> DataResult<User> {
        self.remote.user_profile(username).await
    }
}
