mod auth;
mod store;

pub use auth::TokenAuthProvider;
pub use store::RestDocumentStore;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:6689";
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub api_url: String,
    pub log_level: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self {
            api_url: read_env(&["API_URL", "api_url"])
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            log_level: read_env(&["LOG_LEVEL", "log_level"])
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// First string value among `keys` on `window.ENV`.
#[cfg(target_arch = "wasm32")]
fn read_env(keys: &[&str]) -> Option<String> {
    let env = web_sys::window()?.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }
    keys.iter().find_map(|key| {
        js_sys::Reflect::get(&env, &(*key).into())
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.trim().is_empty())
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn read_env(_keys: &[&str]) -> Option<String> {
    None
}

/// HTTP plumbing shared by the REST adapters. Clones share the bearer token.
#[derive(Clone)]
pub(crate) struct ApiClient {
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    /// Sends one request. Status handling is left to the caller.
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let client = reqwest::Client::new();
        let mut req = client.request(method, self.url(path));
        req = Self::with_auth_headers(req, self.token());

        if let Some(b) = body {
            req = req.json(b);
        }

        req.send().await
    }
}

/// Status code and body text of a failed response.
pub(crate) async fn failure_parts(res: reqwest::Response) -> (u16, String) {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    (status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_defaults_off_browser() {
        let config = EnvConfig::new();
        assert_eq!(config.api_url, "http://localhost:6689");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_client_joins_paths_without_double_slash() {
        let client = ApiClient::new("http://api.test/");
        assert_eq!(client.url("/login/web-login"), "http://api.test/login/web-login");
    }

    #[test]
    fn test_clones_share_token() {
        let client = ApiClient::new("http://api.test");
        let other = client.clone();
        client.set_token(Some("t-1".to_string()));
        assert_eq!(other.token(), Some("t-1".to_string()));
        other.set_token(None);
        assert_eq!(client.token(), None);
    }
}
