//! Stripe webhook signature verification.
//!
//! Implements Stripe's signing scheme: the `Stripe-Signature` header
//! carries `t=<unix seconds>,v1=<hex hmac>[,v1=...]`; the expected MAC is
//! HMAC-SHA256 over `"{t}.{payload}"` keyed by the endpoint secret. The
//! MAC comparison is constant-time, and timestamps older than the
//! tolerance window are rejected to blunt replay.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Malformed Stripe-Signature header")]
    MalformedHeader,

    #[error("Signature timestamp outside the tolerance window")]
    TimestampOutOfTolerance,

    #[error("No signature matched the payload")]
    NoMatch,
}

/// Verify a webhook payload against its `Stripe-Signature` header.
///
/// `now` is the caller's clock in unix seconds, passed in so tests can
/// pin it.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            return Err(SignatureError::MalformedHeader);
        };
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                );
            }
            "v1" => {
                let bytes = hex::decode(value).map_err(|_| SignatureError::MalformedHeader)?;
                signatures.push(bytes);
            }
            // Stripe also sends v0 signatures for legacy endpoints.
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let signed_payload = [timestamp.to_string().as_bytes(), b".", payload].concat();
    for signature in &signatures {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::MalformedHeader)?;
        mac.update(&signed_payload);
        // verify_slice is constant-time.
        if mac.verify_slice(signature).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::NoMatch)
}
