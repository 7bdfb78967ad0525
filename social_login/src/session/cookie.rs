//! Signed session-id cookie values
//!
//! The browser only ever holds `<session_id>.<signature>`, where the signature is the
//! base64url HMAC-SHA256 of the session id under a server-side secret. Session data
//! itself never leaves the server.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::errors::SessionError;
use crate::utils::{base64url_decode, base64url_encode, gen_random_string};

type HmacSha256 = Hmac<Sha256>;

/// Generates a fresh random session id (32 bytes of entropy).
pub fn new_session_id() -> Result<String, SessionError> {
    Ok(gen_random_string(32)?)
}

fn mac_for(secret: &[u8], session_id: &str) -> Result<HmacSha256, SessionError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SessionError::Cookie(format!("Invalid signing key: {e}")))?;
    mac.update(session_id.as_bytes());
    Ok(mac)
}

/// Produces the cookie value for `session_id`.
pub fn sign_session_id(secret: &[u8], session_id: &str) -> Result<String, SessionError> {
    let signature = mac_for(secret, session_id)?.finalize().into_bytes();
    Ok(format!("{session_id}.{}", base64url_encode(&signature)))
}

/// Returns the session id carried by a cookie value if its signature is valid.
pub fn verify_signed_session_id(secret: &[u8], value: &str) -> Option<String> {
    let (session_id, signature) = value.rsplit_once('.')?;
    if session_id.is_empty() {
        return None;
    }
    let signature = base64url_decode(signature).ok()?;
    let mac = mac_for(secret, session_id).ok()?;
    match mac.verify_slice(&signature) {
        Ok(()) => Some(session_id.to_string()),
        Err(_) => {
            tracing::debug!("Rejected session cookie with invalid signature");
            None
        }
    }
}
