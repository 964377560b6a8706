//! Client configuration
//!
//! Options are validated strictly and synchronously: a bad configuration
//! never produces a client instance.

use av_types::{AuthError, AuthResult};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

/// Validated, immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// AuthVisage project identifier
    pub project_id: Uuid,

    /// Base URL of the AuthVisage platform (hosts the authorize page)
    pub platform_url: Url,

    /// Base URL of the project backend (hosts the `/oauth/*` endpoints)
    pub backend_url: Url,

    /// URL the identity provider redirects back to after authorization
    pub redirect_url: Url,
}

/// Raw options as provided by the host, prior to validation. Unknown fields
/// are rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawClientOptions {
    pub project_id: String,
    pub platform_url: String,
    pub backend_url: String,
    pub redirect_url: String,
}

impl ClientOptions {
    /// Validate raw string options.
    pub fn new(
        project_id: &str,
        platform_url: &str,
        backend_url: &str,
        redirect_url: &str,
    ) -> AuthResult<Self> {
        let project_id = Uuid::parse_str(project_id)
            .map_err(|_| AuthError::Config("Project ID must be a valid UUID".to_string()))?;

        Ok(Self {
            project_id,
            platform_url: parse_web_url(platform_url, "Platform URL")?,
            backend_url: parse_web_url(backend_url, "Backend URL")?,
            redirect_url: parse_web_url(redirect_url, "Redirect URL")?,
        })
    }

    /// Parse and validate options from JSON, rejecting unknown fields.
    pub fn from_json(value: serde_json::Value) -> AuthResult<Self> {
        let raw: RawClientOptions = serde_json::from_value(value)
            .map_err(|e| AuthError::Config(format!("Invalid client options: {}", e)))?;
        Self::new(
            &raw.project_id,
            &raw.platform_url,
            &raw.backend_url,
            &raw.redirect_url,
        )
    }
}

impl TryFrom<RawClientOptions> for ClientOptions {
    type Error = AuthError;

    fn try_from(raw: RawClientOptions) -> AuthResult<Self> {
        Self::new(
            &raw.project_id,
            &raw.platform_url,
            &raw.backend_url,
            &raw.redirect_url,
        )
    }
}

fn parse_web_url(input: &str, field: &str) -> AuthResult<Url> {
    let url =
        Url::parse(input).map_err(|_| AuthError::Config(format!("{} must be a valid URL", field)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AuthError::Config(format!(
            "{} must be a valid web URL",
            field
        )));
    }

    Ok(url)
}

/// Join `path` onto a base URL without doubling slashes.
pub(crate) fn api_endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT_ID: &str = "5e27e696-7ed2-4ebb-980f-a0b57ae3f134";

    #[test]
    fn test_canonical_options_accepted() {
        let options = ClientOptions::new(
            PROJECT_ID,
            "https://platform.example.com",
            "https://api.example.com",
            "https://app.example.com/callback",
        )
        .unwrap();

        assert_eq!(options.project_id.to_string(), PROJECT_ID);
        assert_eq!(options.platform_url.as_str(), "https://platform.example.com/");
        assert_eq!(options.redirect_url.as_str(), "https://app.example.com/callback");
    }

    #[test]
    fn test_rejects_non_uuid_project_id() {
        let result = ClientOptions::new(
            "not-a-uuid",
            "https://platform.example.com",
            "https://api.example.com",
            "https://app.example.com/callback",
        );
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_url() {
        let result = ClientOptions::new(
            PROJECT_ID,
            "not a url",
            "https://api.example.com",
            "https://app.example.com/callback",
        );
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_rejects_non_web_scheme() {
        let result = ClientOptions::new(
            PROJECT_ID,
            "ftp://platform.example.com",
            "https://api.example.com",
            "https://app.example.com/callback",
        );
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_from_json_canonical() {
        let options = ClientOptions::from_json(serde_json::json!({
            "projectId": PROJECT_ID,
            "platformUrl": "https://platform.example.com",
            "backendUrl": "https://api.example.com",
            "redirectUrl": "https://app.example.com/callback"
        }))
        .unwrap();

        assert_eq!(options.backend_url.as_str(), "https://api.example.com/");
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let result = ClientOptions::from_json(serde_json::json!({
            "projectId": PROJECT_ID,
            "platformUrl": "https://platform.example.com",
            "backendUrl": "https://api.example.com",
            "redirectUrl": "https://app.example.com/callback",
            "extra": true
        }));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_from_json_rejects_missing_field() {
        let result = ClientOptions::from_json(serde_json::json!({
            "projectId": PROJECT_ID,
            "platformUrl": "https://platform.example.com",
            "backendUrl": "https://api.example.com"
        }));
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_api_endpoint_join() {
        let base = Url::parse("https://api.example.com").unwrap();
        assert_eq!(
            api_endpoint(&base, "oauth/token"),
            "https://api.example.com/oauth/token"
        );

        let with_path = Url::parse("https://api.example.com/v1/").unwrap();
        assert_eq!(
            api_endpoint(&with_path, "oauth/token"),
            "https://api.example.com/v1/oauth/token"
        );
    }
}
