use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};
use crate::session::Identity;
use crate::storage::{KeyValueStorage, CREDENTIAL_KEY};
use crate::workspace::{CreateWorkspaceRequest, Workspace};

use super::{AuthResponse, AuthService, LoginRequest, RegisterRequest, WorkspaceDirectory};

/// REST client for the scheduling backend. Tenant-scoped calls pick up the
/// bearer credential from durable storage at request time, so the client
/// never holds a token that outlives the session store's.
#[derive(Clone)]
pub struct HttpApi {
    base: Url,
    client: reqwest::Client,
    storage: Arc<dyn KeyValueStorage>,
}

impl HttpApi {
    pub fn new(base: &str, storage: Arc<dyn KeyValueStorage>) -> AppResult<Self> {
        let base = Url::parse(base)
            .map_err(|e| AppError::user("invalid_api_url".to_string(), format!("{}: {}", base, e)))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(AppError::from)?;
        Ok(Self { base, client, storage })
    }

    fn url(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path)
            .map_err(|e| AppError::internal("invalid_api_path".to_string(), format!("{}: {}", path, e)))
    }

    fn bearer_headers(&self) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.storage.get(CREDENTIAL_KEY)? {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::internal("invalid_credential".to_string(), e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Decode a JSON body, or map a non-success status into the error
    /// taxonomy, carrying the backend's `message` field when present.
    async fn decode<T: DeserializeOwned>(resp: Response) -> AppResult<T> {
        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(|e| {
                AppError::internal("malformed_response".to_string(), e.to_string())
            });
        }
        Err(Self::error_from(status, resp).await)
    }

    async fn error_from(status: StatusCode, resp: Response) -> AppError {
        let message = match resp.json::<serde_json::Value>().await {
            Ok(v) => v
                .get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .unwrap_or("request failed")
                .to_string(),
            Err(_) => "request failed".to_string(),
        };
        AppError::from_http_status(status.as_u16(), message)
    }
}

#[async_trait]
impl AuthService for HttpApi {
    async fn login(&self, req: &LoginRequest) -> AppResult<AuthResponse> {
        let resp = self
            .client
            .post(self.url("/api/auth/login")?)
            .json(req)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn register(&self, req: &RegisterRequest) -> AppResult<AuthResponse> {
        let resp = self
            .client
            .post(self.url("/api/auth/register")?)
            .json(req)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn resolve_identity(&self, credential: &str) -> AppResult<Identity> {
        // Explicit credential: at startup this runs before the session store
        // has accepted the persisted token as valid.
        let value = HeaderValue::from_str(&format!("Bearer {}", credential))
            .map_err(|e| AppError::auth("invalid_credential".to_string(), e.to_string()))?;
        let resp = self
            .client
            .get(self.url("/api/auth/me")?)
            .header(AUTHORIZATION, value)
            .send()
            .await?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl WorkspaceDirectory for HttpApi {
    async fn list_workspaces(&self) -> AppResult<Vec<Workspace>> {
        let resp = self
            .client
            .get(self.url("/api/workspaces")?)
            .headers(self.bearer_headers()?)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn create_workspace(&self, req: &CreateWorkspaceRequest) -> AppResult<Workspace> {
        let resp = self
            .client
            .post(self.url("/api/workspaces")?)
            .headers(self.bearer_headers()?)
            .json(req)
            .send()
            .await?;
        Self::decode(resp).await
    }
}
