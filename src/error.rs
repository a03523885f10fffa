//! Unified application error model and mapping helpers.
//! This module provides a common error enum used across the session,
//! workspace and API layers, along with a mapper from backend HTTP statuses.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Auth { code: String, message: String },
    Forbidden { code: String, message: String },
    Network { code: String, message: String },
    Storage { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::Network { code, .. }
            | AppError::Storage { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::Network { message, .. }
            | AppError::Storage { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn network<S: Into<String>>(code: S, msg: S) -> Self { AppError::Network { code: code.into(), message: msg.into() } }
    pub fn storage<S: Into<String>>(code: S, msg: S) -> Self { AppError::Storage { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// True for failures that should end the local session (invalid or
    /// expired credential). Transport failures are NOT authentication
    /// failures, but callers resolving a persisted credential treat both
    /// conservatively.
    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth { .. })
    }

    /// Map a backend HTTP status into the local taxonomy. The body message,
    /// when the backend supplied one, is carried through verbatim.
    pub fn from_http_status(status: u16, message: String) -> Self {
        match status {
            400 => AppError::UserInput { code: "bad_request".into(), message },
            401 => AppError::Auth { code: "unauthorized".into(), message },
            403 => AppError::Forbidden { code: "forbidden".into(), message },
            404 => AppError::NotFound { code: "not_found".into(), message },
            409 => AppError::Conflict { code: "conflict".into(), message },
            500..=599 => AppError::Network { code: format!("http_{}", status), message },
            _ => AppError::Internal { code: format!("http_{}", status), message },
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures: timeouts, connection refusal, TLS.
        AppError::Network { code: "transport".into(), message: err.to_string() }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage { code: "io".into(), message: err.to_string() }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal".into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert!(matches!(AppError::from_http_status(400, "x".into()), AppError::UserInput { .. }));
        assert!(matches!(AppError::from_http_status(401, "x".into()), AppError::Auth { .. }));
        assert!(matches!(AppError::from_http_status(403, "x".into()), AppError::Forbidden { .. }));
        assert!(matches!(AppError::from_http_status(404, "x".into()), AppError::NotFound { .. }));
        assert!(matches!(AppError::from_http_status(409, "x".into()), AppError::Conflict { .. }));
        assert!(matches!(AppError::from_http_status(503, "x".into()), AppError::Network { .. }));
    }

    #[test]
    fn display_carries_code_and_message() {
        let e = AppError::auth("invalid_credentials", "email or password is incorrect");
        assert_eq!(e.to_string(), "invalid_credentials: email or password is incorrect");
        assert!(e.is_auth());
        assert!(!AppError::network("transport", "timed out").is_auth());
    }
}
