//! External collaborator interfaces consumed by the session and workspace
//! layers. Keep request/response shapes here so fakes in tests and the HTTP
//! implementation agree on one contract.

mod http;

pub use http::HttpApi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::session::{Identity, RegisterRole};
use crate::workspace::{CreateWorkspaceRequest, Workspace};

/// Opaque bearer token proving an identity.
pub type Credential = String;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: RegisterRole,
}

/// Credential + identity pair returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: Credential,
    pub user: Identity,
}

/// Authentication service: exchanges credentials for identities.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> AppResult<AuthResponse>;
    async fn register(&self, req: &RegisterRequest) -> AppResult<AuthResponse>;
    /// Resolve the identity a bearer credential proves. An `Auth` error means
    /// the credential is invalid or expired; a `Network` error means nothing
    /// about the credential.
    async fn resolve_identity(&self, credential: &str) -> AppResult<Identity>;
}

/// Workspace directory service, scoped server-side to the calling identity.
#[async_trait]
pub trait WorkspaceDirectory: Send + Sync {
    async fn list_workspaces(&self) -> AppResult<Vec<Workspace>>;
    async fn create_workspace(&self, req: &CreateWorkspaceRequest) -> AppResult<Workspace>;
}
