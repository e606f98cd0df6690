use super::{failure_parts, ApiClient};
use crate::collab::{AuthListener, AuthListeners, AuthProvider, AuthSubscription};
use crate::error::AuthError;
use crate::models::AuthUser;
use crate::storage;
use async_trait::async_trait;
use log::{info, warn};
use parking_lot::Mutex;
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct LoginResponse {
    pub token: String,
    #[serde(alias = "account")]
    pub user: AuthUser,
}

pub(crate) fn parse_login_response(data: serde_json::Value) -> Result<LoginResponse, AuthError> {
    let response: LoginResponse =
        serde_json::from_value(data).map_err(|e| AuthError::Parse(e.to_string()))?;
    if response.token.trim().is_empty() || response.user.uid.trim().is_empty() {
        return Err(AuthError::Parse("response is missing token or uid".to_string()));
    }
    Ok(response)
}

/// Token-based [`AuthProvider`] backed by the login endpoints.
pub struct TokenAuthProvider {
    client: ApiClient,
    listeners: AuthListeners,
    current: Mutex<Option<AuthUser>>,
}

impl TokenAuthProvider {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self {
            client,
            listeners: AuthListeners::default(),
            current: Mutex::new(None),
        }
    }

    /// Picks up a session persisted by an earlier visit.
    pub(crate) fn restore(client: ApiClient) -> Self {
        let provider = Self::new(client);
        if let (Some(token), Some(user)) =
            (storage::load_token(), storage::load_user_from_storage())
        {
            provider.client.set_token(Some(token));
            *provider.current.lock() = Some(user);
            info!("event=session_restore module=api status=ok");
        }
        provider
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.current.lock().clone()
    }

    fn transition(&self, user: Option<AuthUser>) {
        *self.current.lock() = user.clone();
        self.listeners.notify(user);
    }

    async fn login(&self, path: &str, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .map_err(|e| AuthError::Parse(e.to_string()))?;

        let res = self
            .client
            .send(Method::POST, path, Some(&body))
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !res.status().is_success() {
            let (status, body) = failure_parts(res).await;
            warn!("event=sign_in module=api status=rejected code={status}");
            return Err(AuthError::Rejected { status, body });
        }

        let data: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;
        let LoginResponse { token, user } = parse_login_response(data)?;

        self.client.set_token(Some(token.clone()));
        storage::save_token(&token);
        storage::save_user_to_storage(&user);
        info!("event=sign_in module=api status=ok");
        self.transition(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.login("/login/web-login", email, password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.login("/login/web-signup", email, password).await
    }
}

#[async_trait(?Send)]
impl AuthProvider for TokenAuthProvider {
    fn subscribe(&self, listener: AuthListener) -> AuthSubscription {
        let current = self.current_user();
        let subscription = self.listeners.add(listener.clone());
        listener(current);
        subscription
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let res = self
            .client
            .send(Method::POST, "/login/web-logout", None)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !res.status().is_success() {
            let (status, body) = failure_parts(res).await;
            return Err(AuthError::Rejected { status, body });
        }

        self.client.set_token(None);
        storage::clear_session();
        self.transition(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_parse_login_response_contract() {
        let parsed = parse_login_response(json!({
            "token": "t-1",
            "user": { "uid": "u-1", "email": "a@example.com" }
        }))
        .expect("valid");
        assert_eq!(parsed.token, "t-1");
        assert_eq!(parsed.user.uid, "u-1");

        let aliased = parse_login_response(json!({
            "token": "t-2",
            "account": { "uid": "u-2" }
        }))
        .expect("valid");
        assert_eq!(aliased.user.email, None);
    }

    #[test]
    fn test_parse_login_response_rejects_incomplete_bodies() {
        assert!(matches!(
            parse_login_response(json!({ "token": "", "user": { "uid": "u-1" } })),
            Err(AuthError::Parse(_))
        ));
        assert!(matches!(
            parse_login_response(json!({ "token": "t" })),
            Err(AuthError::Parse(_))
        ));
    }

    #[test]
    fn test_subscribe_delivers_current_then_transitions() {
        let provider = TokenAuthProvider::new(ApiClient::new("http://api.test"));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let subscription = provider.subscribe(Arc::new(move |user: Option<AuthUser>| {
            sink.lock().push(user.map(|u| u.uid));
        }));

        provider.transition(Some(AuthUser {
            uid: "u-1".to_string(),
            email: None,
        }));
        subscription.cancel();
        provider.transition(None);

        assert_eq!(*seen.lock(), vec![None, Some("u-1".to_string())]);
        assert_eq!(provider.current_user(), None);
    }
}
