//! Expiry checks for held credentials.
//!
//! Two interchangeable strategies exist, picked once per deployment: the
//! login response carries an `expiresAt` alongside the token (external), or
//! the token itself embeds an `exp` claim in its payload segment (embedded).
//! Both fail closed: no retrievable expiry means expired.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Where this deployment finds a credential's expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStrategy {
    /// The login response carries an `expiresAt` timestamp with the token.
    #[default]
    External,
    /// The token embeds an `exp` claim (epoch seconds) in its payload.
    Embedded,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Whether the held credential is expired at `now`.
///
/// A credential with no retrievable expiry by the configured strategy is
/// always expired; "unknown" must never read as "valid".
pub fn is_expired(
    strategy: ExpiryStrategy,
    token: &str,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let expiry = match strategy {
        ExpiryStrategy::External => expires_at,
        ExpiryStrategy::Embedded => decode_embedded_expiry(token),
    };
    match expiry {
        Some(at) => now > at,
        None => true,
    }
}

/// Decode the `exp` claim from a dot-delimited token's payload segment.
///
/// The signature is not checked; this is a local UX hint only and the
/// server's own validation remains authoritative for every request.
pub fn decode_embedded_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claim: ExpiryClaim = serde_json::from_slice(&bytes).ok()?;
    Utc.timestamp_opt(claim.exp, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// Build a structurally valid token whose payload carries `exp`.
    fn token_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"alice","exp":{}}}"#, exp));
        format!("{}.{}.sig", header, payload)
    }

    #[test]
    fn test_embedded_expiry_in_the_past() {
        let now = Utc::now();
        let token = token_with_exp((now - Duration::seconds(1)).timestamp());
        assert!(is_expired(ExpiryStrategy::Embedded, &token, None, now));
    }

    #[test]
    fn test_embedded_expiry_in_the_future() {
        let now = Utc::now();
        let token = token_with_exp((now + Duration::seconds(3600)).timestamp());
        assert!(!is_expired(ExpiryStrategy::Embedded, &token, None, now));
    }

    #[test]
    fn test_undecodable_token_fails_closed() {
        let now = Utc::now();
        assert!(is_expired(ExpiryStrategy::Embedded, "not-a-token", None, now));
        assert!(is_expired(ExpiryStrategy::Embedded, "a.!!!.c", None, now));
        assert!(is_expired(ExpiryStrategy::Embedded, "", None, now));
    }

    #[test]
    fn test_token_without_exp_claim_fails_closed() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"alice"}"#);
        let token = format!("{}.{}.sig", header, payload);
        assert!(is_expired(ExpiryStrategy::Embedded, &token, None, Utc::now()));
    }

    #[test]
    fn test_external_expiry_comparison() {
        let now = Utc::now();
        assert!(!is_expired(
            ExpiryStrategy::External,
            "opaque",
            Some(now + Duration::hours(1)),
            now
        ));
        assert!(is_expired(
            ExpiryStrategy::External,
            "opaque",
            Some(now - Duration::seconds(1)),
            now
        ));
    }

    #[test]
    fn test_external_strategy_without_expiry_fails_closed() {
        // Even a token that carries a decodable future claim is expired
        // under the external strategy when no out-of-band expiry is held.
        let now = Utc::now();
        let token = token_with_exp((now + Duration::hours(1)).timestamp());
        assert!(is_expired(ExpiryStrategy::External, &token, None, now));
    }
}
