//!
//! agendo application composition
//! -------------------------------
//! Wires durable storage, the REST client, the session store and the
//! workspace resolver into one explicitly-constructed context. Lifecycle is
//! owned by the entry point: `new` builds, `initialize` resolves the
//! persisted session and loads workspaces, `teardown` drops volatile state.
//! Nothing here is a module-level singleton.

use std::sync::Arc;

use crate::api::{AuthService, HttpApi, WorkspaceDirectory};
use crate::config::Config;
use crate::error::AppResult;
use crate::routing::{self, Resolution};
use crate::session::SessionStore;
use crate::storage::{FileStorage, KeyValueStorage};
use crate::workspace::WorkspaceResolver;

pub struct App {
    pub config: Config,
    pub storage: Arc<dyn KeyValueStorage>,
    pub directory: Arc<dyn WorkspaceDirectory>,
    pub session: Arc<SessionStore>,
    pub workspaces: Arc<WorkspaceResolver>,
}

impl App {
    /// Build the production wiring: file-backed storage and the HTTP API.
    pub fn new(config: Config) -> AppResult<Self> {
        let storage: Arc<dyn KeyValueStorage> =
            Arc::new(FileStorage::open(config.state_dir.join("session.json"))?);
        let api = Arc::new(HttpApi::new(&config.api_url, storage.clone())?);
        Ok(Self::with_services(config, storage, api.clone(), api))
    }

    /// Wiring seam for tests and alternative transports.
    pub fn with_services(
        config: Config,
        storage: Arc<dyn KeyValueStorage>,
        auth: Arc<dyn AuthService>,
        directory: Arc<dyn WorkspaceDirectory>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(auth, storage.clone()));
        let workspaces =
            Arc::new(WorkspaceResolver::new(directory.clone(), storage.clone(), session.clone()));
        Self { config, storage, directory, session, workspaces }
    }

    /// Startup sequence: session resolution completes (success or failure)
    /// before the first workspace load, which is only meaningful for an
    /// authenticated identity.
    pub async fn initialize(&self) -> AppResult<()> {
        self.session.initialize().await;
        if self.session.is_authenticated() {
            self.workspaces.load().await?;
        }
        Ok(())
    }

    /// Drop volatile state. Durable keys stay: a torn-down app restarts into
    /// the same session.
    pub fn teardown(&self) {
        self.workspaces.reset();
    }

    /// Route a path for the current identity snapshot.
    pub fn resolve(&self, path: &str) -> Resolution {
        let identity = self.session.identity();
        routing::resolve(path, identity.as_ref())
    }

    /// Landing target after the authenticated index, once workspaces are
    /// known. `None` while unauthenticated.
    pub fn landing(&self) -> Option<String> {
        let identity = self.session.identity()?;
        let active = self.workspaces.active();
        Some(routing::landing_path(&identity, active.as_ref()))
    }
}
