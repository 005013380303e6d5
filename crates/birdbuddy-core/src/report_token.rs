//! Decoding of sighting report tokens.
//!
//! A report token is either a plain JSON document or a signed three-part
//! token `<header>.<payload>.<signature>` whose base64 payload nests the
//! plain JSON token under `reportToken`. Decoding never fails from the
//! caller's point of view: anything unreadable yields an empty report.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::{debug, warn, Level};

/// Decoded confidence report. Empty when the token could not be decoded.
pub type DecodedReport = Map<String, JsonValue>;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

const NESTED_TOKEN_FIELD: &str = "reportToken";

/// Reasons a report token could not be decoded.
#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("invalid base64 segment: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("signed payload has no reportToken")]
    MissingReportToken,
}

/// Decode a report token, returning an empty report on any failure.
pub fn decode_report_token(token: Option<&str>) -> DecodedReport {
    let token = match token {
        Some(token) if !token.is_empty() => token,
        _ => return DecodedReport::new(),
    };
    let decoded = if is_signed(token) {
        decode_signed_token(token)
    } else {
        decode_plain_token(token)
    };
    decoded.unwrap_or_else(|err| {
        warn!(error = %err, "Unable to decode report token");
        DecodedReport::new()
    })
}

/// A signed token has exactly two `.` separators.
pub fn is_signed(token: &str) -> bool {
    token.matches('.').count() == 2
}

/// Decode a plain JSON report token.
pub fn decode_plain_token(token: &str) -> Result<DecodedReport, TokenDecodeError> {
    match serde_json::from_str(token)? {
        JsonValue::Object(report) => Ok(report),
        other => Err(TokenDecodeError::NotAnObject(json_kind(&other))),
    }
}

/// Decode a signed `<header>.<payload>.<signature>` token.
///
/// Header and signature are not verified.
pub fn decode_signed_token(token: &str) -> Result<DecodedReport, TokenDecodeError> {
    let mut parts = token.splitn(3, '.');
    let header = parts.next().unwrap_or_default();
    let payload = parts.next().unwrap_or_default();

    if tracing::enabled!(Level::DEBUG) {
        if let Ok(bytes) = decode_segment(header) {
            debug!(header = %String::from_utf8_lossy(&bytes), "Got signed report token");
        }
    }

    let bytes = decode_segment(payload)?;
    let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
    let mut outer = match serde_json::from_str(&text)? {
        JsonValue::Object(outer) => outer,
        other => return Err(TokenDecodeError::NotAnObject(json_kind(&other))),
    };

    match outer.remove(NESTED_TOKEN_FIELD) {
        Some(JsonValue::String(nested)) if !nested.is_empty() => decode_plain_token(&nested),
        Some(JsonValue::Object(nested)) if !nested.is_empty() => Ok(nested),
        _ => Err(TokenDecodeError::MissingReportToken),
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let segment = segment.trim().trim_end_matches('=');
    STANDARD_LENIENT
        .decode(segment)
        .or_else(|_| URL_SAFE_LENIENT.decode(segment))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
