//! Shared-secret request signing for the read endpoint and the cache
//! purge: hex(HMAC-SHA256(pathname + timestamp)), 5-second validity.
//! The verifying side lives in the kv-service / web worker; both sides
//! must agree on this scheme byte for byte.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_EXPIRY_SECS: i64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid signature")]
    Invalid,
}

/// Current unix time as the string that goes into both the query and
/// the signed input.
pub fn unix_timestamp() -> String {
    Utc::now().timestamp().to_string()
}

pub fn sign(pathname: &str, timestamp: &str, secret: &str) -> String {
    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(pathname.as_bytes());
    mac.update(timestamp.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify(
    pathname: &str,
    token: &str,
    timestamp: &str,
    secret: &str,
) -> Result<(), TokenError> {
    let ts: i64 = timestamp.parse().map_err(|_| TokenError::Invalid)?;
    if Utc::now().timestamp() > ts + TOKEN_EXPIRY_SECS {
        return Err(TokenError::Expired);
    }

    let raw = hex::decode(token).map_err(|_| TokenError::Invalid)?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(pathname.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.verify_slice(&raw).map_err(|_| TokenError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn sign_then_verify_round_trips() {
        let ts = unix_timestamp();
        let token = sign("/tasks/t-1", &ts, SECRET);
        assert_eq!(verify("/tasks/t-1", &token, &ts, SECRET), Ok(()));
    }

    #[test]
    fn signature_is_deterministic_hex() {
        let a = sign("/tasks/t-1", "1700000000", SECRET);
        let b = sign("/tasks/t-1", "1700000000", SECRET);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn tampered_path_token_or_secret_is_rejected() {
        let ts = unix_timestamp();
        let token = sign("/tasks/t-1", &ts, SECRET);

        assert_eq!(
            verify("/tasks/t-2", &token, &ts, SECRET),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            verify("/tasks/t-1", &token, &ts, "other-secret"),
            Err(TokenError::Invalid)
        );

        let mut bad = token.clone();
        bad.replace_range(0..1, if token.starts_with('0') { "1" } else { "0" });
        assert_eq!(
            verify("/tasks/t-1", &bad, &ts, SECRET),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let ts = (Utc::now().timestamp() - TOKEN_EXPIRY_SECS - 5).to_string();
        let token = sign("/tasks/t-1", &ts, SECRET);
        assert_eq!(
            verify("/tasks/t-1", &token, &ts, SECRET),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn garbage_token_is_invalid_not_a_panic() {
        let ts = unix_timestamp();
        assert_eq!(
            verify("/tasks/t-1", "not-hex!", &ts, SECRET),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            verify("/tasks/t-1", "", "not-a-number", SECRET),
            Err(TokenError::Invalid)
        );
    }
}
