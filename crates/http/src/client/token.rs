//! Access token expiry decoding
//!
//! The token payload is read without verifying the signature. The result is
//! only used to decide when to refresh; it is not an authentication check,
//! the backend remains the only judge of whether a token is valid.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    /// NumericDate, which may carry a fractional part
    #[serde(default)]
    exp: Option<f64>,
}

/// Read the `exp` claim of a JWT, in milliseconds since the Unix epoch.
///
/// Returns `None` when the token is not a decodable JWT or carries no `exp`.
pub fn decode_expiry_millis(token: &str) -> Option<i64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp.and_then(seconds_to_millis),
        Err(err) => {
            debug!(error = %err, "Access token expiry is unreadable");
            None
        }
    }
}

/// Whole seconds to milliseconds; the fractional part is dropped.
#[allow(clippy::cast_possible_truncation)]
fn seconds_to_millis(exp: f64) -> Option<i64> {
    if !exp.is_finite() {
        return None;
    }
    // `as` saturates at the i64 bounds
    Some((exp.trunc() as i64).saturating_mul(1000))
}

/// Whether a token expiring at `expiry_ms` should be renewed at `now_ms`.
///
/// An unknown expiry never counts as expiring.
pub fn is_expiring_soon(expiry_ms: Option<i64>, now_ms: i64, horizon: Duration) -> bool {
    let horizon_ms = i64::try_from(horizon.as_millis()).unwrap_or(i64::MAX);
    expiry_ms.is_some_and(|expiry| expiry.saturating_sub(now_ms) < horizon_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    const HORIZON: Duration = Duration::from_secs(300);

    fn token_with(claims: &serde_json::Value) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decodes_exp_without_knowing_the_secret() {
        let token = token_with(&json!({"sub": "e1", "exp": 1_700_000_000}));
        assert_eq!(decode_expiry_millis(&token), Some(1_700_000_000_000));
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let token = token_with(&json!({"sub": "e1", "exp": 10}));
        assert_eq!(decode_expiry_millis(&token), Some(10_000));
    }

    #[test]
    fn test_fractional_exp_is_truncated() {
        let token = token_with(&json!({"sub": "e1", "exp": 1_700_000_000.5}));
        assert_eq!(decode_expiry_millis(&token), Some(1_700_000_000_000));

        let token = token_with(&json!({"sub": "e1", "exp": 1_700_000_000.999}));
        assert_eq!(decode_expiry_millis(&token), Some(1_700_000_000_000));
    }

    #[test]
    fn test_non_numeric_exp_is_unknown() {
        let token = token_with(&json!({"sub": "e1", "exp": "tomorrow"}));
        assert_eq!(decode_expiry_millis(&token), None);
    }

    #[test]
    fn test_token_with_audience_decodes() {
        let token = token_with(&json!({"aud": "jobboard", "exp": 1_700_000_000}));
        assert_eq!(decode_expiry_millis(&token), Some(1_700_000_000_000));
    }

    #[test]
    fn test_missing_exp_is_unknown() {
        let token = token_with(&json!({"sub": "e1"}));
        assert_eq!(decode_expiry_millis(&token), None);
    }

    #[test]
    fn test_garbage_is_unknown() {
        assert_eq!(decode_expiry_millis("not-a-jwt"), None);
        assert_eq!(decode_expiry_millis("a.b.c"), None);
        assert_eq!(decode_expiry_millis(""), None);
    }

    #[test]
    fn test_expiring_within_horizon() {
        let now = 1_000_000;
        // exp = now + 60s
        assert!(is_expiring_soon(Some(now + 60_000), now, HORIZON));
        // already expired
        assert!(is_expiring_soon(Some(now - 1), now, HORIZON));
    }

    #[test]
    fn test_not_expiring_outside_horizon() {
        let now = 1_000_000;
        assert!(!is_expiring_soon(Some(now + 3_600_000), now, HORIZON));
        assert!(!is_expiring_soon(Some(now + 300_000), now, HORIZON));
    }

    #[test]
    fn test_unknown_expiry_is_not_expiring() {
        assert!(!is_expiring_soon(None, 0, HORIZON));
    }
}
