//! Claims decoding for compact three-segment bearer tokens.
//!
//! Every function here is total: malformed input is logged and reported as
//! `None` (or as expired), never as an error.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::Utc;
use tracing::warn;

use super::claims::Claims;

/// Standard alphabet, padding optional. URL-safe input is mapped onto the
/// standard alphabet before decoding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes the claims of `token` without verifying its signature.
///
/// Returns `None` unless the token has exactly three `.`-separated segments
/// and the middle one is base64url-encoded JSON claims.
pub fn decode(token: &str) -> Option<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        warn!(segments = segments.len(), "Malformed token: expected 3 segments");
        return None;
    }

    let payload = segments[1].replace('-', "+").replace('_', "/");
    let bytes = match PAYLOAD_ENGINE.decode(payload.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Malformed token: payload is not base64");
            return None;
        }
    };

    match serde_json::from_slice::<Claims>(&bytes) {
        Ok(claims) => Some(claims),
        Err(e) => {
            warn!(error = %e, "Malformed token: payload is not a claims object");
            None
        }
    }
}

/// Whether `token` is expired (or undecodable, or has no expiry).
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, now_ms())
}

/// [`is_expired`] against an explicit clock.
pub fn is_expired_at(token: &str, now_ms: i64) -> bool {
    decode(token).is_none_or(|claims| claims.is_expired_at(now_ms))
}

/// Whether `token` expires within `buffer_minutes` (or cannot be read).
pub fn is_expiring_soon(token: &str, buffer_minutes: u64) -> bool {
    is_expiring_soon_at(token, buffer_minutes, now_ms())
}

/// [`is_expiring_soon`] against an explicit clock.
pub fn is_expiring_soon_at(token: &str, buffer_minutes: u64, now_ms: i64) -> bool {
    decode(token).is_none_or(|claims| claims.is_expiring_soon_at(buffer_minutes, now_ms))
}

/// Whole seconds until `token` expires; `None` if expired or unreadable.
pub fn time_remaining(token: &str) -> Option<u64> {
    time_remaining_at(token, now_ms())
}

/// [`time_remaining`] against an explicit clock.
pub fn time_remaining_at(token: &str, now_ms: i64) -> Option<u64> {
    decode(token)?.time_remaining_at(now_ms)
}

/// Wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
