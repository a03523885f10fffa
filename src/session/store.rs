use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::api::{AuthService, LoginRequest, RegisterRequest};
use crate::error::{AppError, AppResult};
use crate::storage::{KeyValueStorage, ACTIVE_WORKSPACE_KEY, CREDENTIAL_KEY};
use crate::tprintln;

use super::identity::{Identity, RegisterRole};

/// Session lifecycle. `Authenticated` is reached through login, registration
/// or the single startup resolution attempt; it leaves only through explicit
/// logout or credential-resolution failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Resolving,
    Authenticated(Identity),
    Anonymous,
}

/// Owns the identity and the persisted bearer credential. Constructed by the
/// application entry point and passed to everything that needs it; there is
/// no ambient singleton.
pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<SessionState>,
    initialized: AtomicBool,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthService>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            auth,
            storage,
            state: RwLock::new(SessionState::Uninitialized),
            initialized: AtomicBool::new(false),
        }
    }

    /// Resolve a persisted credential into an identity, once per application
    /// lifetime. Every outcome ends the loading phase: a valid credential
    /// authenticates, anything else (absent, invalid, or unreachable backend)
    /// lands in `Anonymous` with the stale credential discarded. Errors are
    /// consumed here; none escape.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            tprintln!("session.initialize called twice; ignoring");
            return;
        }

        let token = match self.storage.get(CREDENTIAL_KEY) {
            Ok(t) => t,
            Err(e) => {
                warn!(target: "agendo::session", "credential read failed: {}", e);
                None
            }
        };
        let Some(token) = token else {
            *self.state.write() = SessionState::Anonymous;
            return;
        };

        *self.state.write() = SessionState::Resolving;
        match self.auth.resolve_identity(&token).await {
            Ok(identity) => {
                info!(target: "agendo::session", "session restored user={} role={}", identity.id, identity.role);
                *self.state.write() = SessionState::Authenticated(identity);
            }
            Err(e) => {
                // Conservative: a credential we cannot resolve right now is a
                // credential we do not keep.
                warn!(target: "agendo::session", "credential resolution failed, logging out locally: {}", e);
                if let Err(e) = self.storage.remove(CREDENTIAL_KEY) {
                    warn!(target: "agendo::session", "failed to discard credential: {}", e);
                }
                *self.state.write() = SessionState::Anonymous;
            }
        }
    }

    /// Exchange email/password for a session. On success the credential is
    /// persisted and the identity becomes current; on failure neither state
    /// nor storage changes.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Identity> {
        let req = LoginRequest { email: email.to_string(), password: password.to_string() };
        let resp = self.auth.login(&req).await?;
        self.storage.set(CREDENTIAL_KEY, &resp.token)?;
        info!(target: "agendo::session", "login user={} role={}", resp.user.id, resp.user.role);
        *self.state.write() = SessionState::Authenticated(resp.user.clone());
        Ok(resp.user)
    }

    /// Create a new identity. The role is fixed at creation and immutable
    /// from this client's perspective.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: RegisterRole,
    ) -> AppResult<Identity> {
        let req = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        };
        let resp = self.auth.register(&req).await?;
        self.storage.set(CREDENTIAL_KEY, &resp.token)?;
        info!(target: "agendo::session", "registered user={} role={}", resp.user.id, resp.user.role);
        *self.state.write() = SessionState::Authenticated(resp.user.clone());
        Ok(resp.user)
    }

    /// End the session locally: drop the in-memory identity first so no
    /// caller can observe an authenticated state with a half-cleared store,
    /// then remove the credential and active-workspace keys.
    pub fn logout(&self) -> AppResult<()> {
        *self.state.write() = SessionState::Anonymous;
        let cred = self.storage.remove(CREDENTIAL_KEY);
        let ws = self.storage.remove(ACTIVE_WORKSPACE_KEY);
        info!(target: "agendo::session", "logout");
        cred?;
        ws
    }

    /// True while the single startup resolution has not completed.
    pub fn is_loading(&self) -> bool {
        matches!(*self.state.read(), SessionState::Uninitialized | SessionState::Resolving)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.read(), SessionState::Authenticated(_))
    }

    pub fn identity(&self) -> Option<Identity> {
        match &*self.state.read() {
            SessionState::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Guard helper for callers that must not issue requests with a stale
    /// credential.
    pub fn require_identity(&self) -> AppResult<Identity> {
        self.identity()
            .ok_or_else(|| AppError::auth("not_authenticated".to_string(), "no active session".to_string()))
    }
}
