//! Claims carried in the payload segment of an access token.

use serde::{Deserialize, Deserializer, Serialize};

/// Decoded token payload. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID. Expiry checks do not depend on it.
    #[serde(default, alias = "user_id")]
    pub sub: Option<String>,
    /// Token type discriminator.
    #[serde(rename = "type", default)]
    pub token_type: TokenType,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub iat: Option<i64>,
    /// Expiration timestamp (seconds since epoch).
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub exp: Option<i64>,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token for API requests.
    #[default]
    Access,
    /// Long-lived refresh token for obtaining new access tokens.
    Refresh,
}

impl Claims {
    /// Expiry in epoch milliseconds, if the token carries one.
    pub fn expires_at_ms(&self) -> Option<i64> {
        self.exp.map(|exp| exp.saturating_mul(1000))
    }

    /// Whether the token has expired at `now_ms`. A token without an
    /// expiry claim counts as expired.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.expires_at_ms() {
            Some(expires_at) => now_ms >= expires_at,
            None => true,
        }
    }

    /// Whether the token expires within `buffer_minutes` of `now_ms`.
    pub fn is_expiring_soon_at(&self, buffer_minutes: u64, now_ms: i64) -> bool {
        let buffer_ms = i64::try_from(buffer_minutes)
            .unwrap_or(i64::MAX)
            .saturating_mul(60_000);
        match self.expires_at_ms() {
            Some(expires_at) => expires_at.saturating_sub(now_ms) <= buffer_ms,
            None => true,
        }
    }

    /// Whole seconds left until expiry, or `None` once expired.
    pub fn time_remaining_at(&self, now_ms: i64) -> Option<u64> {
        let remaining = self.expires_at_ms()?.saturating_sub(now_ms).div_euclid(1000);
        if remaining > 0 {
            Some(remaining as u64)
        } else {
            None
        }
    }
}

/// Accepts a timestamp as a JSON number (integer or float) or a numeric string.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.floor() as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom("timestamp out of range")),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.floor() as i64))
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: '{s}'")))
        }
        Some(other) => Err(D::Error::custom(format!("invalid timestamp: {other}"))),
    }
}
