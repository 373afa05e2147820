//! Runtime configuration for the Oura MCP server.
//!
//! Everything is read once from the environment at startup and then handed
//! explicitly to the pieces that need it:
//! - `OuraConfig`: bearer token, API base and timeout for the Oura API
//! - `GithubAuthConfig`: optional GitHub OAuth settings guarding the tool surface

use std::{env, time::Duration};

/// Base of every Oura v2 user collection endpoint.
pub const OURA_API_BASE: &str = "https://api.ouraring.com/v2/usercollection";

/// Hard ceiling for a single Oura API call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Scopes a GitHub token must carry to reach the tools.
pub const GITHUB_REQUIRED_SCOPES: &[&str] = &["user"];

/// Reads an environment variable, treating an empty value as unset.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Clone)]
pub struct OuraConfig {
    pub api_token: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

impl OuraConfig {
    #[must_use]
    pub fn new(api_token: Option<String>) -> Self {
        Self {
            api_token: api_token.filter(|token| !token.is_empty()),
            api_base: OURA_API_BASE.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Loads the bearer token from `OURA_API_TOKEN`. A missing token is not an
    /// error here; every tool call reports it instead.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(non_empty_var("OURA_API_TOKEN"))
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    #[cfg(test)]
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Clone)]
pub struct GithubAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Public URL of this server, used to build the OAuth callback.
    pub base_url: String,
    pub required_scopes: Vec<String>,
}

impl GithubAuthConfig {
    /// Returns `Some` only when `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET` and
    /// `BASE_URL` are all set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Some(Self::new(
            non_empty_var("GITHUB_CLIENT_ID")?,
            non_empty_var("GITHUB_CLIENT_SECRET")?,
            non_empty_var("BASE_URL")?,
        ))
    }

    #[must_use]
    pub fn new(client_id: String, client_secret: String, base_url: impl Into<String>) -> Self {
        Self {
            client_id,
            client_secret,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            required_scopes: GITHUB_REQUIRED_SCOPES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    #[must_use]
    pub fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.base_url)
    }
}
