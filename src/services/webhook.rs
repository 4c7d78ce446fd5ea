//! Payment webhook authentication and parsing.
//!
//! The signature header has the form `t=<unix>,v1=<hex hmac>[,v1=...]` and
//! the MAC covers `"<t>.<raw body>"` keyed with the endpoint secret.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Missing signature header")]
    MissingSignature,

    #[error("Malformed signature header")]
    MalformedSignature,

    #[error("Signature timestamp outside tolerance")]
    StaleTimestamp,

    #[error("Signature mismatch")]
    SignatureMismatch,

    #[error("Webhook secret is not usable")]
    InvalidSecret,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    pub data: WebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub object: Value,
}

impl WebhookEvent {
    /// `data.object.metadata.booking_id`, given either as a string or a number.
    #[must_use]
    pub fn booking_id(&self) -> Option<i32> {
        match self.data.object.get("metadata")?.get("booking_id")? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            _ => None,
        }
    }
}

fn mac_hex(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Builds a header value the way the gateway does.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
    Ok(format!("t={timestamp},v1={}", mac_hex(secret, timestamp, payload)?))
}

pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now_secs: i64,
    tolerance_secs: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => {
                timestamp = Some(v.parse::<i64>().map_err(|_| WebhookError::MalformedSignature)?);
            }
            Some(("v1", v)) => signatures.push(v),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedSignature)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedSignature);
    }

    if now_secs.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(WebhookError::StaleTimestamp);
    }

    let expected = mac_hex(secret, timestamp, payload)?;
    let matched = signatures
        .iter()
        .any(|sig| bool::from(sig.as_bytes().ct_eq(expected.as_bytes())));

    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
    serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_1","metadata":{"booking_id":"12"}}}}"#;

    #[test]
    fn test_valid_signature() {
        let now = 1_700_000_000;
        let header = signature_header(SECRET, now, BODY).unwrap();
        assert_eq!(verify_signature(BODY, &header, SECRET, now + 10, 300), Ok(()));
    }

    #[test]
    fn test_any_v1_signature_may_match() {
        let now = 1_700_000_000;
        let good = mac_hex(SECRET, now, BODY).unwrap();
        let header = format!("t={now},v1=deadbeef,v1={good}");
        assert_eq!(verify_signature(BODY, &header, SECRET, now, 300), Ok(()));
    }

    #[test]
    fn test_rejects_stale_timestamp() {
        let now = 1_700_000_000;
        let header = signature_header(SECRET, now, BODY).unwrap();
        assert_eq!(
            verify_signature(BODY, &header, SECRET, now + 301, 300),
            Err(WebhookError::StaleTimestamp)
        );
    }

    #[test]
    fn test_extreme_timestamps_are_stale() {
        let now = 1_760_000_000;
        for t in [i64::MIN, i64::MAX, -1] {
            let header = format!("t={t},v1=00");
            assert_eq!(
                verify_signature(b"{}", &header, SECRET, now, 300),
                Err(WebhookError::StaleTimestamp),
                "t={t}"
            );
        }
    }

    #[test]
    fn test_rejects_bad_mac() {
        let now = 1_700_000_000;
        let header = signature_header("whsec_other", now, BODY).unwrap();
        assert_eq!(
            verify_signature(BODY, &header, SECRET, now, 300),
            Err(WebhookError::SignatureMismatch)
        );

        let header = signature_header(SECRET, now, BODY).unwrap();
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, now, 300),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_rejects_malformed_header() {
        assert_eq!(
            verify_signature(BODY, "garbage", SECRET, 0, 300),
            Err(WebhookError::MalformedSignature)
        );
        assert_eq!(
            verify_signature(BODY, "t=abc,v1=00", SECRET, 0, 300),
            Err(WebhookError::MalformedSignature)
        );
        assert_eq!(
            verify_signature(BODY, "t=10", SECRET, 10, 300),
            Err(WebhookError::MalformedSignature)
        );
    }

    #[test]
    fn test_parse_event_booking_id() {
        let event = parse_event(BODY).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.booking_id(), Some(12));

        let numeric = parse_event(
            br#"{"id":"evt_2","type":"x","data":{"object":{"metadata":{"booking_id":5}}}}"#,
        )
        .unwrap();
        assert_eq!(numeric.booking_id(), Some(5));

        let missing = parse_event(br#"{"id":"evt_3","type":"x","data":{"object":{}}}"#).unwrap();
        assert_eq!(missing.booking_id(), None);
    }
}
