//! Session management
//!
//! Uses HMAC-signed tokens stored in cookies.
//! No server-side session storage needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::User;

/// User session data
///
/// Stored in a signed cookie. Contains minimal user info
/// from the identity provider's userinfo response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque subject identifier issued by the provider
    pub subject: String,
    /// Display name from the provider
    pub name: String,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for a provider identity, valid for `max_age` seconds
    pub fn new(subject: String, name: String, max_age: i64) -> Self {
        let now = Utc::now();
        Self {
            subject,
            name,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(max_age),
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// The per-request user identity handed to the page renderer
    pub fn user(&self) -> User {
        User {
            name: self.name.clone(),
            identifier: self.subject.clone(),
        }
    }
}

/// Create a signed session token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
///
/// # Arguments
/// * `session` - Session data to encode
/// * `secret` - HMAC secret key
///
/// # Returns
/// Signed token string
pub fn create_session_token(
    session: &Session,
    secret: &str,
) -> Result<String, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    // 1. Serialize session to JSON
    let payload =
        serde_json::to_string(session).map_err(|e| crate::error::AppError::Internal(e.into()))?;

    // 2. Base64 encode the payload
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    // 3. Create HMAC-SHA256 signature
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(&signature);

    // 4. Return "{payload}.{signature}"
    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a session token
///
/// # Arguments
/// * `token` - Token string to verify
/// * `secret` - HMAC secret key
///
/// # Returns
/// Decoded session if valid
///
/// # Errors
/// Returns error if signature is invalid, token is malformed,
/// or the session is expired
pub fn verify_session_token(token: &str, secret: &str) -> Result<Session, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    // 1. Split token into payload and signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(crate::error::AppError::Unauthorized);
    }

    let payload_b64 = parts[0];
    let signature_b64 = parts[1];

    // 2. Verify HMAC signature
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());

    let expected_signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    mac.verify_slice(&expected_signature)
        .map_err(|_| crate::error::AppError::InvalidSignature)?;

    // 3. Decode and deserialize payload
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    let payload_str =
        String::from_utf8(payload_bytes).map_err(|_| crate::error::AppError::Unauthorized)?;

    let session: Session =
        serde_json::from_str(&payload_str).map_err(|_| crate::error::AppError::Unauthorized)?;

    // 4. Check if session is expired
    if session.is_expired() {
        return Err(crate::error::AppError::Unauthorized);
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-session-secret-32-bytes-ok!";

    fn sample_session() -> Session {
        Session::new("auth0|abc123".to_string(), "Ana".to_string(), 3600)
    }

    #[test]
    fn round_trip_preserves_session_fields() {
        let session = sample_session();
        let token = create_session_token(&session, SECRET).unwrap();

        let decoded = verify_session_token(&token, SECRET).unwrap();
        assert_eq!(decoded.subject, "auth0|abc123");
        assert_eq!(decoded.name, "Ana");
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let session = sample_session();
        let token = create_session_token(&session, SECRET).unwrap();

        let (payload, signature) = token.split_once('.').unwrap();
        let mut forged_payload = payload.to_string();
        forged_payload.push('A');
        let forged = format!("{}.{}", forged_payload, signature);

        assert!(verify_session_token(&forged, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let session = sample_session();
        let token = create_session_token(&session, SECRET).unwrap();

        let error = verify_session_token(&token, "another-session-secret-32-bytes!")
            .expect_err("signature must not verify under a different secret");
        assert!(matches!(
            error,
            crate::error::AppError::InvalidSignature
        ));
    }

    #[test]
    fn expired_session_is_rejected() {
        let mut session = sample_session();
        session.expires_at = Utc::now() - chrono::Duration::seconds(1);
        let token = create_session_token(&session, SECRET).unwrap();

        let error = verify_session_token(&token, SECRET)
            .expect_err("expired session must not verify");
        assert!(matches!(error, crate::error::AppError::Unauthorized));
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(verify_session_token("not-a-token", SECRET).is_err());
        assert!(verify_session_token("a.b.c", SECRET).is_err());
        assert!(verify_session_token("", SECRET).is_err());
    }

    #[test]
    fn session_user_carries_name_and_identifier() {
        let user = sample_session().user();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.identifier, "auth0|abc123");
    }
}
