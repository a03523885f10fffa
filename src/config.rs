//! Runtime configuration sourced from environment variables.
//! Defaults keep the shell usable against a local backend with no setup.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:4000";
pub const DEFAULT_STATE_DIR: &str = ".agendo";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend REST API.
    pub api_url: String,
    /// Directory holding durable client state (credential, active workspace).
    pub state_dir: PathBuf,
}

impl Config {
    pub fn new(api_url: impl Into<String>, state_dir: impl Into<PathBuf>) -> Self {
        Self { api_url: api_url.into(), state_dir: state_dir.into() }
    }

    /// Read `AGENDO_API_URL` and `AGENDO_STATE_DIR`, falling back to defaults.
    pub fn from_env() -> Self {
        let api_url = std::env::var("AGENDO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let state_dir = std::env::var("AGENDO_STATE_DIR").unwrap_or_else(|_| DEFAULT_STATE_DIR.to_string());
        Self { api_url, state_dir: PathBuf::from(state_dir) }
    }
}

impl Default for Config {
    fn default() -> Self { Self::new(DEFAULT_API_URL, DEFAULT_STATE_DIR) }
}
