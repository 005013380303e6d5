//! Structured logging conventions and helpers for the Bird Buddy client.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and the caller sees an error |
//! | WARN  | Recoverable issue, fallback applied (token decode, unknown enum) |
//! | INFO  | Login, refresh, postcard finished, strategy not honored |
//! | DEBUG | Request summaries, strategy decisions, report replacement |
//! | TRACE | Full response payloads |
//!
//! ## Span fields
//!
//! Remote-call spans carry `subsystem = "birdbuddy"`, a `component`
//! (`transport`, `auth`, `client`, `finish`) and the `op` name. Events use
//! `feed_item_id`, `sighting_id`, `feeder_id` and `error` for entities and
//! failures.

use serde_json::Value as JsonValue;

/// Replacement text for credentials in logged variables.
pub const REDACTED: &str = "**REDACTED**";

/// Copy of `variables` with every string leaf replaced by [`REDACTED`].
pub fn redact_variables(variables: &JsonValue) -> JsonValue {
    match variables {
        JsonValue::String(_) => JsonValue::String(REDACTED.to_string()),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(redact_variables).collect()),
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), redact_variables(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_nested_strings() {
        let redacted = redact_variables(&json!({
            "emailSignInInput": {"email": "me@example.com", "password": "hunter2"},
            "attempt": 1
        }));
        assert_eq!(
            redacted,
            json!({
                "emailSignInInput": {"email": REDACTED, "password": REDACTED},
                "attempt": 1
            })
        );
    }

    #[test]
    fn test_redact_keeps_shape() {
        let redacted = redact_variables(&json!({
            "refreshTokenInput": {"token": "secret"},
            "mediaIds": ["m1", "m2"],
            "share": true,
            "after": null
        }));
        assert_eq!(redacted["refreshTokenInput"]["token"], REDACTED);
        assert_eq!(redacted["mediaIds"], json!([REDACTED, REDACTED]));
        assert_eq!(redacted["share"], true);
        assert!(redacted["after"].is_null());
    }
}
