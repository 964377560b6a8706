//! Client-side OAuth 2.0 Authorization Code flow with PKCE for the
//! AuthVisage face-recognition identity provider
//!
//! # Features
//! - Authorization Code flow with PKCE (S256) against the AuthVisage backend
//! - CSRF protection with a single-use `state` parameter
//! - Token/session lifecycle: unverified JWT payload decoding, expiration
//!   scheduling, silent refresh, logout
//! - Auth-state change notifications with subscribe/unsubscribe
//! - Host seams for storage and platform capabilities (navigation, crypto),
//!   so the core runs on browser and native hosts alike
//!
//! # Usage Example
//! ```no_run
//! use std::sync::Arc;
//! use av_client::{AuthVisageClient, ClientOptions, MemoryPlatform, MemoryStorage};
//!
//! # async fn run() -> av_types::AuthResult<()> {
//! let options = ClientOptions::new(
//!     "5e27e696-7ed2-4ebb-980f-a0b57ae3f134",
//!     "https://platform.example.com",
//!     "https://api.example.com",
//!     "https://app.example.com/callback",
//! )?;
//! let client = AuthVisageClient::new(
//!     options,
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(MemoryPlatform::new()),
//! )?;
//!
//! // On page load: pick up a pending callback, if any
//! client.resume_session().await?;
//!
//! // On user action: run the outbound leg up to the redirect
//! client.login().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod jwt;
pub mod listener;
pub mod options;
pub mod pkce;
pub mod platform;
pub mod state;
pub mod storage;
pub mod token_manager;
pub mod types;

pub use client::{AuthVisageClient, ResumeOutcome};
pub use listener::{ListenerId, ListenerManager};
pub use options::{ClientOptions, RawClientOptions};
pub use pkce::{PkceHandler, PkcePair};
pub use platform::{MemoryPlatform, Platform};
pub use state::OAuthStateHandler;
pub use storage::{KeyValueStorage, MemoryStorage, PKCE_STORAGE_KEY, STATE_STORAGE_KEY};
pub use token_manager::{AuthSubscription, TokenManager};
pub use types::{TokenResponse, User};
