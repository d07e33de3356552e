//! Session management: credential persistence and Basic-auth header derivation

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tokio::sync::watch;

use super::storage::KeyValueStore;
use crate::{
    error::{AppError, AppResult},
    models::Credentials,
    repository::AuthProvider,
};

/// Storage key of the persisted credential document
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Checks a candidate `Authorization` value against a protected endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginProbe: Send + Sync {
    async fn probe(&self, authorization: &str) -> AppResult<()>;
}

/// Owns the persisted credential and the authenticated flag.
///
/// Cloning is cheap; clones share the same store and flag.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    probe: Arc<dyn LoginProbe>,
    authenticated: Arc<watch::Sender<bool>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>, probe: Arc<dyn LoginProbe>) -> Self {
        let initial = read_credential(store.as_ref()).ok().flatten().is_some();
        let (tx, _rx) = watch::channel(initial);
        Self {
            store,
            probe,
            authenticated: Arc::new(tx),
        }
    }

    /// Probe the API with the given credentials and persist them on success
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Credentials> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::invalid("Username and password are required"));
        }

        let credentials = Credentials::new(username, password);
        if let Err(e) = self.probe.probe(&credentials.basic_auth()).await {
            tracing::warn!("Login failed for user {}: {}", username, e);
            return Err(e);
        }

        let document = serde_json::to_string(&credentials)?;
        self.store.set(CURRENT_USER_KEY, &document)?;
        self.authenticated.send_replace(true);
        tracing::info!("User {} logged in", username);

        Ok(credentials)
    }

    /// Forget the stored credential. The flag is cleared even if the store fails.
    pub fn logout(&self) -> AppResult<()> {
        let result = self.store.remove(CURRENT_USER_KEY);
        self.authenticated.send_replace(false);
        match &result {
            Ok(()) => tracing::info!("Logged out"),
            Err(e) => tracing::error!("Failed to clear stored credential: {}", e),
        }
        result
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.current_credential(), Ok(Some(_)))
    }

    pub fn current_credential(&self) -> AppResult<Option<Credentials>> {
        read_credential(self.store.as_ref())
    }

    /// Headers for an authenticated request; empty when logged out
    pub fn auth_header(&self) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(credentials) = self.current_credential()? {
            let value = HeaderValue::from_str(&credentials.basic_auth())
                .map_err(|_| AppError::invalid("Stored credential is not a valid header value"))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Observe the authenticated flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }
}

impl AuthProvider for SessionManager {
    fn auth_headers(&self) -> AppResult<HeaderMap> {
        self.auth_header()
    }
}

/// Unparseable documents count as logged out
fn read_credential(store: &dyn KeyValueStore) -> AppResult<Option<Credentials>> {
    let Some(raw) = store.get(CURRENT_USER_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<Credentials>(&raw) {
        Ok(credentials) => Ok(Some(credentials)),
        Err(e) => {
            tracing::warn!("Ignoring unreadable stored credential: {}", e);
            Ok(None)
        }
    }
}
