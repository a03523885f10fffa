//! Session store integration tests: startup credential resolution, login,
//! registration and logout against an in-memory authentication fake.
//! These exercise positive and negative paths of the session state machine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use parking_lot::Mutex;

use agendo::api::{AuthResponse, AuthService, LoginRequest, RegisterRequest};
use agendo::error::{AppError, AppResult};
use agendo::session::{Identity, RegisterRole, Role, SessionState, SessionStore};
use agendo::storage::{KeyValueStorage, MemoryStorage, ACTIVE_WORKSPACE_KEY, CREDENTIAL_KEY};

fn gen_token() -> String {
    // 128-bit random token base64url without padding
    let mut buf = [0u8; 32];
    let _ = getrandom::getrandom(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

fn identity(email: &str, role: Role) -> Identity {
    Identity {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: email.split('@').next().unwrap_or("user").to_string(),
        role,
        avatar: None,
    }
}

/// In-memory authentication service: email -> (password, identity), plus a
/// token table for `resolve_identity`.
#[derive(Default)]
struct FakeAuth {
    users: Mutex<HashMap<String, (String, Identity)>>,
    tokens: Mutex<HashMap<String, Identity>>,
    unreachable: AtomicBool,
}

impl FakeAuth {
    fn with_user(email: &str, password: &str, role: Role) -> Self {
        let auth = Self::default();
        auth.users
            .lock()
            .insert(email.to_string(), (password.to_string(), identity(email, role)));
        auth
    }

    /// Pre-issue a token as if a previous run had logged in.
    fn issue_token_for(&self, email: &str) -> String {
        let users = self.users.lock();
        let (_, id) = users.get(email).expect("unknown user");
        let token = gen_token();
        self.tokens.lock().insert(token.clone(), id.clone());
        token
    }

    fn check_reachable(&self) -> AppResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::network("transport".to_string(), "connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn login(&self, req: &LoginRequest) -> AppResult<AuthResponse> {
        self.check_reachable()?;
        let users = self.users.lock();
        match users.get(&req.email) {
            Some((password, id)) if *password == req.password => {
                let token = gen_token();
                self.tokens.lock().insert(token.clone(), id.clone());
                Ok(AuthResponse { token, user: id.clone() })
            }
            _ => Err(AppError::auth(
                "invalid_credentials".to_string(),
                "email or password is incorrect".to_string(),
            )),
        }
    }

    async fn register(&self, req: &RegisterRequest) -> AppResult<AuthResponse> {
        self.check_reachable()?;
        let mut users = self.users.lock();
        if users.contains_key(&req.email) {
            return Err(AppError::conflict("email_taken".to_string(), "email already registered".to_string()));
        }
        let id = identity(&req.email, req.role.into());
        users.insert(req.email.clone(), (req.password.clone(), id.clone()));
        let token = gen_token();
        self.tokens.lock().insert(token.clone(), id.clone());
        Ok(AuthResponse { token, user: id })
    }

    async fn resolve_identity(&self, credential: &str) -> AppResult<Identity> {
        self.check_reachable()?;
        self.tokens
            .lock()
            .get(credential)
            .cloned()
            .ok_or_else(|| AppError::auth("invalid_token".to_string(), "token is invalid or expired".to_string()))
    }
}

fn store_with(auth: FakeAuth) -> (Arc<FakeAuth>, Arc<MemoryStorage>, SessionStore) {
    let auth = Arc::new(auth);
    let storage = Arc::new(MemoryStorage::new());
    let session = SessionStore::new(auth.clone(), storage.clone());
    (auth, storage, session)
}

#[tokio::test]
async fn startup_without_credential_ends_anonymous() {
    let (_auth, _storage, session) = store_with(FakeAuth::default());
    assert!(session.is_loading());
    session.initialize().await;
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!session.is_loading());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn startup_with_valid_credential_restores_identity() {
    let auth = FakeAuth::with_user("owner@example.com", "s3cr3t!", Role::Owner);
    let token = auth.issue_token_for("owner@example.com");
    let (_auth, storage, session) = store_with(auth);
    storage.set(CREDENTIAL_KEY, &token).unwrap();

    session.initialize().await;
    let id = session.identity().expect("identity restored");
    assert_eq!(id.email, "owner@example.com");
    assert_eq!(id.role, Role::Owner);
    // Credential stays persisted on success
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap().as_deref(), Some(token.as_str()));
}

#[tokio::test]
async fn startup_with_rejected_credential_discards_it() {
    let (_auth, storage, session) = store_with(FakeAuth::default());
    storage.set(CREDENTIAL_KEY, "stale-token").unwrap();

    // Must not panic or propagate: ends anonymous with the credential gone.
    session.initialize().await;
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap(), None);
}

#[tokio::test]
async fn startup_network_failure_logs_out_locally() {
    let auth = FakeAuth::with_user("owner@example.com", "s3cr3t!", Role::Owner);
    let token = auth.issue_token_for("owner@example.com");
    auth.unreachable.store(true, Ordering::SeqCst);
    let (_auth, storage, session) = store_with(auth);
    storage.set(CREDENTIAL_KEY, &token).unwrap();

    session.initialize().await;
    // Conservative: unreachable backend is treated like an invalid credential.
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap(), None);
}

#[tokio::test]
async fn initialize_runs_exactly_once() {
    let auth = FakeAuth::with_user("owner@example.com", "s3cr3t!", Role::Owner);
    let (_auth, storage, session) = store_with(auth);
    session.initialize().await;
    assert_eq!(session.state(), SessionState::Anonymous);

    // A credential appearing later must not trigger silent re-authentication.
    storage.set(CREDENTIAL_KEY, "anything").unwrap();
    session.initialize().await;
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn login_persists_credential_and_sets_identity() {
    let auth = FakeAuth::with_user("owner@example.com", "s3cr3t!", Role::Owner);
    let (_auth, storage, session) = store_with(auth);
    session.initialize().await;

    let id = session.login("owner@example.com", "s3cr3t!").await.unwrap();
    assert_eq!(id.role, Role::Owner);
    assert!(session.is_authenticated());
    let token = storage.get(CREDENTIAL_KEY).unwrap().expect("credential persisted");
    assert!(!token.is_empty());
}

#[tokio::test]
async fn failed_login_leaves_state_and_storage_untouched() {
    let auth = FakeAuth::with_user("owner@example.com", "s3cr3t!", Role::Owner);
    let (_auth, storage, session) = store_with(auth);
    session.initialize().await;

    let err = session.login("owner@example.com", "wrong").await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap(), None);
}

#[tokio::test]
async fn register_fixes_role_at_creation() {
    let (_auth, _storage, session) = store_with(FakeAuth::default());
    session.initialize().await;

    let id = session
        .register("Ana", "ana@example.com", "pw", RegisterRole::Client)
        .await
        .unwrap();
    assert_eq!(id.role, Role::Client);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn logout_clears_identity_and_both_durable_keys() {
    let auth = FakeAuth::with_user("owner@example.com", "s3cr3t!", Role::Owner);
    let (_auth, storage, session) = store_with(auth);
    session.initialize().await;
    session.login("owner@example.com", "s3cr3t!").await.unwrap();
    storage.set(ACTIVE_WORKSPACE_KEY, "ws-1").unwrap();

    session.logout().unwrap();
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(session.identity(), None);
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap(), None);
    assert_eq!(storage.get(ACTIVE_WORKSPACE_KEY).unwrap(), None);
}
