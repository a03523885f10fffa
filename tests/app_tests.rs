//! End-to-end startup tests over the composed application context, with
//! file-backed storage standing in for the browser's durable storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use agendo::api::{AuthResponse, AuthService, LoginRequest, RegisterRequest, WorkspaceDirectory};
use agendo::app::App;
use agendo::config::Config;
use agendo::error::{AppError, AppResult};
use agendo::routing::Resolution;
use agendo::session::{Identity, Role};
use agendo::storage::{FileStorage, KeyValueStorage, CREDENTIAL_KEY};
use agendo::workspace::{CreateWorkspaceRequest, Workspace};

struct FakeBackend {
    tokens: Mutex<HashMap<String, Identity>>,
    workspaces: Mutex<Vec<Workspace>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self { tokens: Mutex::new(HashMap::new()), workspaces: Mutex::new(Vec::new()) }
    }

    fn seed_session(&self, token: &str, role: Role) {
        let identity = Identity {
            id: "u-1".to_string(),
            email: "owner@example.com".to_string(),
            name: "Owner".to_string(),
            role,
            avatar: None,
        };
        self.tokens.lock().insert(token.to_string(), identity);
    }

    fn seed_workspace(&self, id: &str) {
        self.workspaces.lock().push(Workspace {
            id: id.to_string(),
            name: "Studio".to_string(),
            slug: "studio".to_string(),
            description: None,
            logo: None,
            address: None,
            phone: None,
            email: None,
            segment: "salon".to_string(),
            city: None,
            owner_id: "u-1".to_string(),
            plan_id: "plan-basic".to_string(),
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn login(&self, _req: &LoginRequest) -> AppResult<AuthResponse> {
        Err(AppError::auth("invalid_credentials".to_string(), "not under test".to_string()))
    }

    async fn register(&self, _req: &RegisterRequest) -> AppResult<AuthResponse> {
        Err(AppError::internal("unused".to_string(), "not under test".to_string()))
    }

    async fn resolve_identity(&self, credential: &str) -> AppResult<Identity> {
        self.tokens
            .lock()
            .get(credential)
            .cloned()
            .ok_or_else(|| AppError::auth("invalid_token".to_string(), "token is invalid or expired".to_string()))
    }
}

#[async_trait]
impl WorkspaceDirectory for FakeBackend {
    async fn list_workspaces(&self) -> AppResult<Vec<Workspace>> {
        Ok(self.workspaces.lock().clone())
    }

    async fn create_workspace(&self, _req: &CreateWorkspaceRequest) -> AppResult<Workspace> {
        Err(AppError::internal("unused".to_string(), "not under test".to_string()))
    }
}

fn app_with(backend: Arc<FakeBackend>, storage: Arc<dyn KeyValueStorage>) -> App {
    App::with_services(Config::default(), storage, backend.clone(), backend)
}

#[tokio::test]
async fn startup_restores_session_and_workspace_then_routes() {
    let tmp = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStorage> =
        Arc::new(FileStorage::open(tmp.path().join("session.json")).unwrap());
    storage.set(CREDENTIAL_KEY, "tok-live").unwrap();

    let backend = Arc::new(FakeBackend::new());
    backend.seed_session("tok-live", Role::Owner);
    backend.seed_workspace("ws-1");

    let app = app_with(backend, storage);
    app.initialize().await.unwrap();

    assert!(app.session.is_authenticated());
    assert_eq!(app.workspaces.active().unwrap().id, "ws-1");
    assert_eq!(app.landing().as_deref(), Some("/app/ws-1/dashboard"));
    assert!(matches!(app.resolve("/app/ws-1/dashboard"), Resolution::Render(_)));
}

#[tokio::test]
async fn startup_with_dead_token_routes_to_login() {
    let tmp = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStorage> =
        Arc::new(FileStorage::open(tmp.path().join("session.json")).unwrap());
    storage.set(CREDENTIAL_KEY, "tok-dead").unwrap();

    let app = app_with(Arc::new(FakeBackend::new()), storage.clone());
    app.initialize().await.unwrap();

    assert!(!app.session.is_authenticated());
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap(), None);
    assert_eq!(app.landing(), None);
    match app.resolve("/app") {
        Resolution::Redirect(target) => assert_eq!(target, "/login"),
        other => panic!("expected login redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn teardown_drops_volatile_state_but_keeps_durable_session() {
    let tmp = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStorage> =
        Arc::new(FileStorage::open(tmp.path().join("session.json")).unwrap());
    storage.set(CREDENTIAL_KEY, "tok-live").unwrap();

    let backend = Arc::new(FakeBackend::new());
    backend.seed_session("tok-live", Role::Owner);
    backend.seed_workspace("ws-1");

    let app = app_with(backend, storage.clone());
    app.initialize().await.unwrap();
    assert!(app.workspaces.active().is_some());

    app.teardown();
    assert_eq!(app.workspaces.active(), None);
    // The credential survives teardown; only logout clears it.
    assert_eq!(storage.get(CREDENTIAL_KEY).unwrap().as_deref(), Some("tok-live"));
}
