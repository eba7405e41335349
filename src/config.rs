use crate::error::{Error, Result};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub base_url: String,
    pub concurrency_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let github_token = env::var("GITHUB_TOKEN")
            .map_err(|_| Error::Config("GITHUB_TOKEN environment variable not set".to_string()))?;

        let base_url = env::var("GITHUB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let concurrency_limit = env::var("GITDASH_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        Ok(Self {
            github_token,
            base_url,
            concurrency_limit,
        })
    }
}

// The session identity every query is gated on: no handle or no token means
// no requests at all, so construction refuses empty values.
#[derive(Debug, Clone)]
pub struct SessionContext {
    login: String,
    token: String,
}

impl SessionContext {
    pub fn new(login: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let login = login.into();
        let token = token.into();
        if login.trim().is_empty() {
            return Err(Error::Config("account handle must not be empty".to_string()));
        }
        if token.trim().is_empty() {
            return Err(Error::Config("access token must not be empty".to_string()));
        }
        Ok(Self { login, token })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
