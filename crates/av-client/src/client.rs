//! AuthVisage client: authorization-flow orchestration
//!
//! Composes the CSRF state handler, PKCE handler, and token manager into the
//! full Authorization Code + PKCE flow: `login` runs the outbound leg up to
//! the redirect, `resume_session` picks the flow back up when the identity
//! provider redirects to the application with `code` and `state`.

use std::sync::Arc;

use av_types::{AuthError, AuthResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::options::{api_endpoint, ClientOptions};
use crate::pkce::PkceHandler;
use crate::platform::Platform;
use crate::state::OAuthStateHandler;
use crate::storage::KeyValueStorage;
use crate::token_manager::TokenManager;
use crate::types::TokenResponse;

/// Outcome of `resume_session`.
#[derive(Debug)]
pub enum ResumeOutcome {
    /// Current URL carries no `code`/`state` pair; nothing to do.
    NoCallback,

    /// A callback was detected but failed a protocol check (state mismatch,
    /// missing verifier, or a token response without an access token). The
    /// attempt is abandoned and the session left unset.
    Rejected,

    /// Code exchange succeeded. The session was handed to the token manager
    /// only when the response carried a refresh token; without one the
    /// access token here is a transient value.
    Established { access_token: String },
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest {
    project_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
    code_verifier: &'a str,
}

/// Main AuthVisage client.
pub struct AuthVisageClient {
    options: ClientOptions,
    http: Client,
    platform: Arc<dyn Platform>,
    state: OAuthStateHandler,
    pkce: PkceHandler,

    /// Token/session manager; hosts subscribe to auth-state changes and
    /// drive refresh/logout through it.
    pub auth: TokenManager,
}

impl AuthVisageClient {
    /// Create a client from validated options.
    ///
    /// Construction is synchronous and performs no network I/O. Callback
    /// processing is not started here: the host calls `resume_session` when
    /// it is ready to observe the result.
    pub fn new(
        options: ClientOptions,
        storage: Arc<dyn KeyValueStorage>,
        platform: Arc<dyn Platform>,
    ) -> AuthResult<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        // One client, one cookie jar: the refresh cookie set by the code
        // exchange must be visible to the token manager's requests.
        let auth = TokenManager::with_client(options.backend_url.clone(), http.clone());

        Ok(Self {
            state: OAuthStateHandler::new(Arc::clone(&storage), Arc::clone(&platform)),
            pkce: PkceHandler::new(storage, Arc::clone(&platform)),
            options,
            http,
            platform,
            auth,
        })
    }

    /// Create a client from raw JSON options (strict schema: all fields
    /// required, unknown fields rejected).
    pub fn from_json(
        options: serde_json::Value,
        storage: Arc<dyn KeyValueStorage>,
        platform: Arc<dyn Platform>,
    ) -> AuthResult<Self> {
        Self::new(ClientOptions::from_json(options)?, storage, platform)
    }

    /// Start the face-login flow.
    ///
    /// Creates a backend session, generates CSRF state and a PKCE pair,
    /// builds the authorize URL, and asks the platform for a full
    /// navigation. Every failure rejects this call; nothing is retried.
    pub async fn login(&self) -> AuthResult<()> {
        let session_id = self.create_session().await?;
        let state = self.state.generate()?;
        let pkce = self.pkce.generate()?;

        let authorize_url = self.build_authorize_url(&state, &pkce.code_challenge, &session_id);
        let url = Url::parse(&authorize_url)
            .map_err(|e| AuthError::Internal(format!("Invalid authorize URL: {}", e)))?;

        info!("Redirecting to AuthVisage authorize page");
        self.platform.redirect(&url)
    }

    /// Process the OAuth callback, if the current URL carries one.
    ///
    /// Explicit second phase of the client lifecycle: the host decides when
    /// to resume and sees the outcome, instead of a fire-and-forget task at
    /// construction. A missing `code` or `state` is a silent no-op. A state
    /// mismatch or missing verifier abandons the attempt without ever
    /// issuing the exchange request.
    pub async fn resume_session(&self) -> AuthResult<ResumeOutcome> {
        let Some(current) = self.platform.current_url() else {
            return Ok(ResumeOutcome::NoCallback);
        };

        let mut code = None;
        let mut returned_state = None;
        for (key, value) in current.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => returned_state = Some(value.into_owned()),
                _ => {}
            }
        }
        let (Some(code), Some(returned_state)) = (code, returned_state) else {
            return Ok(ResumeOutcome::NoCallback);
        };

        if !self.state.validate(&returned_state) {
            error!("State validation failed! Possible CSRF attack.");
            return Ok(ResumeOutcome::Rejected);
        }

        let code_verifier = match self.pkce.code_verifier() {
            Ok(verifier) => verifier,
            Err(e) => {
                warn!("Callback without a stored code verifier: {}", e);
                return Ok(ResumeOutcome::Rejected);
            }
        };

        let token = self.exchange_code(&code, &code_verifier).await?;

        if token.access_token.is_empty() {
            warn!("Token response missing access_token");
            return Ok(ResumeOutcome::Rejected);
        }

        if token.refresh_token.is_some() {
            self.auth.set_session(&token)?;
        } else {
            debug!("Token response carried no refresh token; session not persisted");
        }

        Ok(ResumeOutcome::Established {
            access_token: token.access_token,
        })
    }

    /// Request a flow session identifier from the backend.
    async fn create_session(&self) -> AuthResult<String> {
        let url = api_endpoint(&self.options.backend_url, "oauth/create-session");
        let response = self
            .http
            .post(&url)
            .json(&CreateSessionRequest {
                project_id: self.options.project_id,
            })
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Failed to send session request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Session creation failed with status {}", status);
            return Err(AuthError::Network(format!(
                "Session creation failed with status {}",
                status
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Decode(format!("Failed to parse session response: {}", e)))?;
        Ok(session.id)
    }

    /// Build the authorize URL for a fresh flow attempt.
    fn build_authorize_url(&self, state: &str, code_challenge: &str, session_id: &str) -> String {
        format!(
            "{}/authorize?state={}&project_id={}&redirect_uri={}&code_challenge={}&code_challenge_method=S256&oauth_session_id={}",
            self.options.platform_url.as_str().trim_end_matches('/'),
            urlencoding::encode(state),
            self.options.project_id,
            urlencoding::encode(self.options.redirect_url.as_str()),
            urlencoding::encode(code_challenge),
            urlencoding::encode(session_id),
        )
    }

    /// Exchange the authorization code for tokens.
    ///
    /// A non-success status is fatal for this attempt; the caller decides
    /// whether to start over.
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> AuthResult<TokenResponse> {
        let url = api_endpoint(&self.options.backend_url, "oauth/token");
        let response = self
            .http
            .post(&url)
            .json(&ExchangeRequest {
                code,
                code_verifier,
            })
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Failed to send token request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Token exchange failed with status {}: {}", status, body);
            return Err(AuthError::Network(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Decode(format!("Failed to parse token response: {}", e)))
    }
}
