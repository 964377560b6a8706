//! Token and session lifecycle
//!
//! Owns the current-user state: decodes token payloads, schedules
//! expiration, performs silent refresh and logout, and broadcasts state
//! changes to subscribers.
//!
//! Session state is tri-state: unknown until the first refresh attempt
//! resolves it, then `None` (unauthenticated) or `Some(User)`. Interleaved
//! transitions apply last-write-wins; there is no serialization across
//! concurrent attempts and no retry logic anywhere in this module.

use std::sync::Arc;
use std::time::Duration;

use av_types::{AuthError, AuthResult};
use parking_lot::Mutex;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::jwt::decode_jwt;
use crate::listener::{ListenerId, ListenerManager};
use crate::options::api_endpoint;
use crate::types::{TokenResponse, User};

/// Handle returned by `on_auth_state_change`.
pub struct AuthSubscription {
    listeners: Arc<ListenerManager<Option<User>>>,
    id: ListenerId,
}

impl AuthSubscription {
    /// Deregister the callback; it will never be invoked again by this
    /// manager.
    pub fn unsubscribe(self) {
        self.listeners.unsubscribe(self.id);
    }
}

/// Token/session manager.
///
/// Cheap to clone: clones share the listener set, the HTTP client, and the
/// single expiration timer slot.
#[derive(Clone)]
pub struct TokenManager {
    backend_url: Url,
    http: Client,
    listeners: Arc<ListenerManager<Option<User>>>,
    expiration_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TokenManager {
    /// Create a manager for the backend at `backend_url`.
    ///
    /// The HTTP client keeps a cookie store: the refresh token travels as an
    /// HTTP-only cookie set by the backend.
    pub fn new(backend_url: Url) -> AuthResult<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(backend_url, http))
    }

    /// Create a manager sharing an existing HTTP client.
    ///
    /// The client must keep a cookie store, and must be the same one that
    /// performed the code exchange: the refresh cookie set by that response
    /// has to be visible here.
    pub fn with_client(backend_url: Url, http: Client) -> Self {
        Self {
            backend_url,
            http,
            listeners: Arc::new(ListenerManager::new()),
            expiration_timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Install `token` as the current session.
    ///
    /// The JWT payload is decoded without signature verification (see
    /// `jwt`): display-only claims, short-lived token, TLS transport.
    /// Notifies subscribers with the decoded user and replaces any pending
    /// expiration timer.
    pub fn set_session(&self, token: &TokenResponse) -> AuthResult<()> {
        if token.access_token.is_empty() {
            return Err(AuthError::Protocol(
                "Session must contain an access token".to_string(),
            ));
        }

        let user: User = decode_jwt(&token.access_token)?;
        debug!("Session set for user {}", user.id);
        self.listeners.notify(&Some(user));
        self.schedule_expiration(token.expires_in);

        Ok(())
    }

    /// Cancel any pending expiration timer and, when `expires_in` is given,
    /// schedule a `None` notification for when the token lapses. Expiry does
    /// not trigger an automatic refresh.
    ///
    /// Abort-then-install happens under one lock, so a superseded session
    /// can never double-fire.
    fn schedule_expiration(&self, expires_in: Option<u64>) {
        let mut timer = self.expiration_timer.lock();
        if let Some(handle) = timer.take() {
            handle.abort();
        }

        if let Some(secs) = expires_in {
            let listeners = Arc::clone(&self.listeners);
            *timer = Some(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                debug!("Access token expired after {} seconds", secs);
                listeners.notify(&None);
            }));
        }
    }

    /// Silently refresh the access token.
    ///
    /// Credentialed request with no body; the refresh token rides along as a
    /// cookie. A non-success response notifies subscribers with `None`
    /// before failing. Success re-installs the session, restarting the
    /// expiration timer.
    pub async fn get_access_token(&self) -> AuthResult<String> {
        let url = api_endpoint(&self.backend_url, "oauth/refresh-token");
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Failed to send refresh request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Access token refresh failed with status {}", status);
            self.listeners.notify(&None);
            return Err(AuthError::Network(format!(
                "Failed to refresh access token: {}",
                status
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Decode(format!("Failed to parse token response: {}", e)))?;

        self.set_session(&token)?;
        Ok(token.access_token)
    }

    /// Log out via the backend and notify subscribers with `None`.
    ///
    /// A pending expiration timer is left alone: logout and expiration
    /// converge on the same unauthenticated notification.
    pub async fn logout(&self) -> AuthResult<()> {
        let url = api_endpoint(&self.backend_url, "oauth/logout");
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Failed to send logout request: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Network(format!(
                "Failed to sign out: {}",
                response.status()
            )));
        }

        info!("Logged out");
        self.listeners.notify(&None);
        Ok(())
    }

    /// Subscribe to authentication state changes.
    ///
    /// Registration immediately spawns one silent refresh attempt so the
    /// initial unknown state resolves to whatever the backend reports. A
    /// rejected refresh has already notified `None`; transport errors are
    /// logged and dropped, retrying is the caller's business.
    pub fn on_auth_state_change<F>(&self, callback: F) -> AuthSubscription
    where
        F: Fn(&Option<User>) + Send + Sync + 'static,
    {
        let id = self.listeners.subscribe(callback);

        let manager = self.clone();
        tokio::spawn(async move {
            if let Err(e) = manager.get_access_token().await {
                debug!("Initial session resolution failed: {}", e);
            }
        });

        AuthSubscription {
            listeners: Arc::clone(&self.listeners),
            id,
        }
    }
}
