//! Application token signing
//!
//! Every call to the Workflow service carries a fresh RS256 token that
//! identifies the calling application.

use crate::error::WorkflowError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Token type claim for application-issued tokens
pub const APP_TOKEN_TYPE: &str = "app";

/// Claims carried by an application token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppClaims {
    /// Subject: the application id
    pub sub: i64,
    /// Always `"app"`
    #[serde(rename = "type")]
    pub token_type: String,
    /// Issued-at time (UTC Unix timestamp)
    pub iat: i64,
}

/// Standard alphabet, accepting keys with or without `=` padding
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode Base64 key material into PEM text
///
/// Whitespace inside the Base64 text (line breaks from copy-pasted keys) is
/// ignored, and trailing `=` padding is optional.
fn decode_private_key(private_key_b64: &str) -> Result<String, WorkflowError> {
    let compact: String = private_key_b64
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let bytes = KEY_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| WorkflowError::Signing(format!("private key is not valid Base64: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|_| WorkflowError::Signing("decoded private key is not PEM text".to_string()))
}

/// Sign an RS256 application token for `app_id`
///
/// # Arguments
/// * `app_id` - Application id placed in the `sub` claim
/// * `private_key_b64` - Base64 encoding of the PEM private key
///
/// # Returns
/// * `Ok(String)` - Compact signed token
/// * `Err(WorkflowError::Signing)` - If the key material is unusable
pub fn sign_app_token(app_id: i64, private_key_b64: &str) -> Result<String, WorkflowError> {
    let pem = decode_private_key(private_key_b64)?;

    let key = EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| WorkflowError::Signing(format!("private key rejected: {}", e)))?;

    let claims = AppClaims {
        sub: app_id,
        token_type: APP_TOKEN_TYPE.to_string(),
        iat: chrono::Utc::now().timestamp(),
    };

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| WorkflowError::Signing(format!("failed to encode token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    const PRIVATE_PEM: &str = include_str!("../tests/fixtures/workflow_test_private.pem");
    const PUBLIC_PEM: &str = include_str!("../tests/fixtures/workflow_test_public.pem");

    fn encoded_key() -> String {
        base64::engine::general_purpose::STANDARD.encode(PRIVATE_PEM)
    }

    fn verify(token: &str) -> AppClaims {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        decode::<AppClaims>(
            token,
            &DecodingKey::from_rsa_pem(PUBLIC_PEM.as_bytes()).unwrap(),
            &validation,
        )
        .expect("token should verify against the public key")
        .claims
    }

    #[test]
    fn test_sign_app_token_verifies() {
        let token = sign_app_token(42, &encoded_key()).expect("signing should succeed");

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);

        let claims = verify(&token);
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.token_type, "app");
        assert!(claims.iat > 0);
    }

    #[test]
    fn test_sign_app_token_has_no_expiry() {
        let token = sign_app_token(1, &encoded_key()).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let json = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert!(value.get("exp").is_none());
        assert_eq!(value["type"], "app");
    }

    #[test]
    fn test_sign_app_token_ignores_line_breaks() {
        let wrapped: String = encoded_key()
            .as_bytes()
            .chunks(64)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let token = sign_app_token(5, &wrapped).expect("wrapped key should sign");
        assert_eq!(verify(&token).sub, 5);
    }

    #[test]
    fn test_sign_app_token_accepts_unpadded_key() {
        let padded = encoded_key();
        assert!(padded.ends_with('='), "fixture length should need padding");
        let unpadded = padded.trim_end_matches('=');

        let token = sign_app_token(9, unpadded).expect("unpadded key should sign");
        assert_eq!(verify(&token).sub, 9);

        // Without its trailing newline the PEM needs one `=` instead of two
        let pem = PRIVATE_PEM.trim_end();
        assert_eq!(pem.len() % 3, 1);
        let other = base64::engine::general_purpose::STANDARD_NO_PAD.encode(pem);
        let token = sign_app_token(10, &other).expect("unpadded key should sign");
        assert_eq!(verify(&token).sub, 10);
    }

    #[test]
    fn test_sign_app_token_rejects_non_base64() {
        let err = sign_app_token(1, "this is *not* base64!").unwrap_err();
        assert!(matches!(err, WorkflowError::Signing(_)));
        assert!(err.to_string().contains("Base64"));
    }

    #[test]
    fn test_sign_app_token_rejects_non_pem() {
        let not_pem = base64::engine::general_purpose::STANDARD.encode("hello world");
        let err = sign_app_token(1, &not_pem).unwrap_err();
        assert!(matches!(err, WorkflowError::Signing(_)));
    }
}
