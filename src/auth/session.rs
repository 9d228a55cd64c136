//! Session management
//!
//! Uses HMAC-signed tokens carried in a cookie or bearer header.
//! No server-side session storage needed.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::data::Role;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// User session data
///
/// Contains only what handlers need to authorize a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Account ID of the acting user
    pub account_id: String,
    pub role: Role,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a session valid for `max_age_seconds`
    pub fn new(account_id: impl Into<String>, role: Role, max_age_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            account_id: account_id.into(),
            role,
            created_at: now,
            expires_at: now + Duration::seconds(max_age_seconds),
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn signer(secret: &str) -> Result<HmacSha256, AppError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| AppError::Encryption(e.to_string()))
}

/// Create a signed session token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
///
/// # Arguments
/// * `session` - Session data to encode
/// * `secret` - HMAC secret key
pub fn create_session_token(session: &Session, secret: &str) -> Result<String, AppError> {
    let payload = serde_json::to_string(session).map_err(|e| AppError::Internal(e.into()))?;
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    let mut mac = signer(secret)?;
    mac.update(payload_b64.as_bytes());
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a session token
///
/// # Errors
/// - `InvalidSignature` if the signature does not match
/// - `Unauthorized` if the token is malformed or expired
pub fn verify_session_token(token: &str, secret: &str) -> Result<Session, AppError> {
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::Unauthorized)?;
    if signature_b64.contains('.') {
        return Err(AppError::Unauthorized);
    }

    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::Unauthorized)?;

    let mut mac = signer(secret)?;
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AppError::InvalidSignature)?;

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::Unauthorized)?;
    let session: Session =
        serde_json::from_slice(&payload).map_err(|_| AppError::Unauthorized)?;

    if session.is_expired() {
        return Err(AppError::Unauthorized);
    }

    Ok(session)
}
