//! Session store - authentication lifecycle and the signed-in profile.
//!
//! One store per client instance. State moves `Loading -> Authenticated |
//! Anonymous` and back to `Anonymous` on sign-out or when the backend
//! revokes the refresh token. Token refreshes run on a background task
//! and do not change the published state.

use std::sync::{Arc, Weak};
use std::time::Duration as StdDuration;

use chrono::Utc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::{AppResult, AuthError};
use data_client::AccessToken;
use domain::{
    validate_email_address, Credentials, ProfileUpdate, Session, SignUpRequest, UserProfile,
    Validated,
};
use marketplace_service::ProfileService;

use crate::client::{AuthApi, SignUpOutcome};
use crate::config::SessionConfig;
use crate::storage::SessionStorage;

/// Floor for the delay between two refreshes
const MIN_REFRESH_DELAY: StdDuration = StdDuration::from_secs(1);

/// Published authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Authenticated { identity_id: Uuid, email: String },
    Anonymous,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn identity_id(&self) -> Option<Uuid> {
        match self {
            AuthState::Authenticated { identity_id, .. } => Some(*identity_id),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Loading => write!(f, "loading"),
            AuthState::Authenticated { email, .. } => write!(f, "signed in as {}", email),
            AuthState::Anonymous => write!(f, "signed out"),
        }
    }
}

enum RefreshOutcome {
    Refreshed(StdDuration),
    Retry,
    Stopped,
}

/// A refresh failure that means the session is gone for good.
fn revokes_session(err: &AuthError) -> bool {
    err.ends_session() || matches!(err, AuthError::InvalidCredentials)
}

/// Holds the current session, keeps it fresh and persists it.
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
    profiles: Arc<dyn ProfileService>,
    token: AccessToken,
    config: SessionConfig,
    session: RwLock<Option<Session>>,
    profile: RwLock<Option<UserProfile>>,
    state: watch::Sender<AuthState>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    /// Create a store in the `Loading` state; call `initialize` next.
    ///
    /// `token` is the cell the data client reads its bearer from.
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn SessionStorage>,
        profiles: Arc<dyn ProfileService>,
        token: AccessToken,
        config: SessionConfig,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(AuthState::Loading);
        Arc::new(Self {
            api,
            storage,
            profiles,
            token,
            config,
            session: RwLock::new(None),
            profile: RwLock::new(None),
            state,
            refresh_task: Mutex::new(None),
        })
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Profile of the signed-in identity, once loaded
    pub async fn profile(&self) -> Option<UserProfile> {
        self.profile.read().await.clone()
    }

    pub async fn current_identity(&self) -> Option<Uuid> {
        self.session.read().await.as_ref().map(|s| s.identity_id)
    }

    /// Identity of the signed-in user, or `NotAuthenticated`
    pub async fn require_identity(&self) -> AppResult<Uuid> {
        self.current_identity()
            .await
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }

    fn publish(&self, next: AuthState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            debug!("Auth state: {} -> {}", current, next);
            *current = next;
            true
        });
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore the persisted session, refreshing it first when it is due.
    pub async fn initialize(self: &Arc<Self>) -> AppResult<AuthState> {
        let stored = match self.storage.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Could not read persisted session: {}", e);
                None
            }
        };

        let Some(session) = stored else {
            self.publish(AuthState::Anonymous);
            return Ok(self.state());
        };

        if !session.expires_within(self.config.refresh_margin, Utc::now()) {
            let delay = session.refresh_delay(self.config.refresh_margin, Utc::now());
            info!("Restored session for {}", session.identity_id);
            self.establish(session, delay).await;
            return Ok(self.state());
        }

        match self.api.refresh(&session.refresh_token).await {
            Ok(fresh) => {
                info!("Restored and refreshed session for {}", fresh.identity_id);
                let delay = self.next_refresh_delay(&fresh);
                self.establish(fresh, delay).await;
            }
            Err(e) if revokes_session(&e) => {
                warn!("Persisted session was revoked: {}", e);
                self.discard_local().await;
            }
            Err(e) => {
                warn!("Could not refresh restored session, will retry: {}", e);
                let retry = self.config.retry_delay;
                self.establish(session, retry).await;
            }
        }
        Ok(self.state())
    }

    pub async fn sign_in(self: &Arc<Self>, email: &str, password: &str) -> AppResult<Session> {
        let credentials = Credentials::new(email, password).validated()?;
        let session = self.api.sign_in(&credentials).await?;

        info!("Signed in as {}", session.identity_id);
        let delay = self.next_refresh_delay(&session);
        self.establish(session.clone(), delay).await;
        Ok(session)
    }

    /// Register; signs in straight away when the backend issues tokens.
    pub async fn sign_up(self: &Arc<Self>, request: SignUpRequest) -> AppResult<SignUpOutcome> {
        let request = request.validated()?;
        let outcome = self.api.sign_up(&request).await?;

        match &outcome {
            SignUpOutcome::SignedIn(session) => {
                info!("Registered and signed in as {}", session.identity_id);
                let delay = self.next_refresh_delay(session);
                self.establish(session.clone(), delay).await;
            }
            SignUpOutcome::ConfirmationPending { identity_id, .. } => {
                info!("Registered {}, awaiting email confirmation", identity_id);
            }
        }
        Ok(outcome)
    }

    /// Clear the session locally; the remote revoke is best-effort.
    pub async fn sign_out(&self) -> AppResult<()> {
        if let Some(handle) = self.refresh_task.lock().await.take() {
            handle.abort();
        }

        let session = self.session.read().await.clone();
        if let Some(session) = session {
            if let Err(e) = self.api.sign_out(&session.access_token).await {
                warn!("Remote sign-out failed, clearing local session anyway: {}", e);
            }
        }

        self.discard_local().await;
        info!("Signed out");
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> AppResult<()> {
        validate_email_address(email)?;
        self.api.reset_password(email.trim()).await?;
        info!("Password reset requested");
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Fetch a profile; the signed-in identity's profile is also cached.
    pub async fn get_user_profile(&self, identity_id: Uuid) -> AppResult<UserProfile> {
        let profile = self.profiles.get_user_profile(identity_id).await?;
        self.cache_profile(&profile).await;
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        identity_id: Uuid,
        update: ProfileUpdate,
    ) -> AppResult<UserProfile> {
        let profile = self
            .profiles
            .update_user_profile(identity_id, update)
            .await?;
        self.cache_profile(&profile).await;
        info!("Profile updated for {}", identity_id);
        Ok(profile)
    }

    async fn cache_profile(&self, profile: &UserProfile) {
        if self.current_identity().await == Some(profile.id) {
            *self.profile.write().await = Some(profile.clone());
        }
    }

    async fn load_profile(&self, identity_id: Uuid) {
        if let Err(e) = self.get_user_profile(identity_id).await {
            warn!("Profile for {} not loaded: {}", identity_id, e);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn next_refresh_delay(&self, session: &Session) -> StdDuration {
        session
            .refresh_delay(self.config.refresh_margin, Utc::now())
            .max(MIN_REFRESH_DELAY)
    }

    async fn establish(self: &Arc<Self>, session: Session, first_refresh: StdDuration) {
        let identity_id = session.identity_id;
        self.apply_session(session).await;
        self.start_refresh(first_refresh).await;
        self.load_profile(identity_id).await;
    }

    /// Install `session` as current: bearer token, persisted copy, state.
    async fn apply_session(&self, session: Session) {
        self.token.set(session.access_token.clone()).await;
        if let Err(e) = self.storage.save(&session).await {
            warn!("Session not persisted: {}", e);
        }

        let state = AuthState::Authenticated {
            identity_id: session.identity_id,
            email: session.email.clone(),
        };
        let previous = self.session.write().await.replace(session);
        if previous.as_ref().map(|s| s.identity_id) != state.identity_id() {
            *self.profile.write().await = None;
        }
        self.publish(state);
    }

    async fn discard_local(&self) {
        *self.session.write().await = None;
        *self.profile.write().await = None;
        self.token.clear().await;
        if let Err(e) = self.storage.clear().await {
            warn!("Persisted session not removed: {}", e);
        }
        self.publish(AuthState::Anonymous);
    }

    async fn start_refresh(self: &Arc<Self>, delay: StdDuration) {
        debug!("Next token refresh in {}s", delay.as_secs());
        let handle = tokio::spawn(refresh_loop(Arc::downgrade(self), delay));
        if let Some(previous) = self.refresh_task.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Whether `refresh_token` still belongs to the installed session
    async fn holds_refresh_token(&self, refresh_token: &str) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.refresh_token == refresh_token)
    }

    async fn refresh_cycle(&self) -> RefreshOutcome {
        let Some(current) = self.session.read().await.clone() else {
            return RefreshOutcome::Stopped;
        };

        let result = self.api.refresh(&current.refresh_token).await;
        if !self.holds_refresh_token(&current.refresh_token).await {
            debug!("Session replaced during refresh, dropping result");
            return RefreshOutcome::Stopped;
        }

        match result {
            Ok(fresh) => {
                let next = self.next_refresh_delay(&fresh);
                self.apply_session(fresh).await;
                info!("Session refreshed");
                RefreshOutcome::Refreshed(next)
            }
            Err(e) if revokes_session(&e) => {
                warn!("Session revoked during refresh: {}", e);
                self.discard_local().await;
                RefreshOutcome::Stopped
            }
            Err(e) => {
                warn!(
                    "Session refresh failed, retrying in {}s: {}",
                    self.config.retry_delay.as_secs(),
                    e
                );
                RefreshOutcome::Retry
            }
        }
    }
}

/// Background refresh timer. Holds only a weak reference so a dropped
/// store ends the loop.
async fn refresh_loop(store: Weak<SessionStore>, mut delay: StdDuration) {
    loop {
        tokio::time::sleep(delay).await;
        let Some(store) = store.upgrade() else {
            return;
        };
        delay = match store.refresh_cycle().await {
            RefreshOutcome::Refreshed(next) => next,
            RefreshOutcome::Retry => store.config.retry_delay,
            RefreshOutcome::Stopped => return,
        };
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_task.get_mut().take() {
            handle.abort();
        }
    }
}
