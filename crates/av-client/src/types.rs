//! Wire and session types

use serde::{Deserialize, Serialize};

/// Token response from the AuthVisage backend.
///
/// Nothing beyond the presence of `access_token` is validated here; callers
/// check for emptiness where the protocol requires it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token (JWT)
    #[serde(default)]
    pub access_token: String,

    /// Refresh token. On browser hosts the backend also sets it as an
    /// HTTP-only cookie; its presence in the body marks a renewable session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access-token lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// Claims decoded from the access-token payload.
///
/// Decoded without signature verification; display-only, not authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "sub")]
    pub id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub fullname: String,
}
