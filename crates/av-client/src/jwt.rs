//! Unverified JWT payload decoding
//!
//! The payload is decoded without verifying the signature: tokens are
//! short-lived and delivered over TLS, and decoded claims are used for
//! display only. They must not be treated as authoritative; any access
//! decision belongs to the backend.

use av_types::{AuthError, AuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::de::DeserializeOwned;

/// Decode the payload segment of `token` as JSON.
pub fn decode_jwt<T: DeserializeOwned>(token: &str) -> AuthResult<T> {
    let mut segments = token.split('.');
    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(AuthError::Decode(
                "Token is not a three-segment JWT".to_string(),
            ))
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::Decode(format!("Failed to decode token payload: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::Decode(format!("Token payload is not valid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::User;

    fn encode_segment(json: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(json.to_string())
    }

    fn make_token(payload: serde_json::Value) -> String {
        let header = encode_segment(&serde_json::json!({"alg": "RS256", "typ": "JWT"}));
        format!("{}.{}.signature", header, encode_segment(&payload))
    }

    #[test]
    fn test_decode_user_claims() {
        let token = make_token(serde_json::json!({
            "id": "user-1",
            "email": "user@example.com",
            "fullname": "Test User"
        }));

        let user: User = decode_jwt(&token).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.fullname, "Test User");
    }

    #[test]
    fn test_extra_claims_are_ignored() {
        let token = make_token(serde_json::json!({
            "id": "user-1",
            "email": "user@example.com",
            "fullname": "Test User",
            "iat": 1700000000,
            "exp": 1700003600
        }));

        let user: User = decode_jwt(&token).unwrap();
        assert_eq!(user.id, "user-1");
    }

    #[test]
    fn test_rejects_two_segment_token() {
        let result: AuthResult<User> = decode_jwt("header.payload");
        assert!(matches!(result, Err(AuthError::Decode(_))));
    }

    #[test]
    fn test_rejects_four_segment_token() {
        let result: AuthResult<User> = decode_jwt("a.b.c.d");
        assert!(matches!(result, Err(AuthError::Decode(_))));
    }

    #[test]
    fn test_rejects_invalid_base64_payload() {
        let result: AuthResult<User> = decode_jwt("header.!!!.signature");
        assert!(matches!(result, Err(AuthError::Decode(_))));
    }

    #[test]
    fn test_rejects_non_json_payload() {
        let payload = URL_SAFE_NO_PAD.encode("not json");
        let token = format!("header.{}.signature", payload);
        let result: AuthResult<User> = decode_jwt(&token);
        assert!(matches!(result, Err(AuthError::Decode(_))));
    }
}
