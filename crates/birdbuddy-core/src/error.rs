//! Error types for the Bird Buddy client.

use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Result type alias using the Bird Buddy `Error` type.
pub type Result<T> = std::result::Result<T, Error>;

/// Server error code signalling a stale access token.
pub const AUTH_TOKEN_EXPIRED_ERROR: &str = "AUTH_TOKEN_EXPIRED_ERROR";

/// A single entry from a GraphQL response's `errors` list.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlError {
    /// Machine-readable code from `extensions.code`, when present.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// The raw error object as returned by the server.
    pub response: JsonValue,
}

impl GraphqlError {
    /// Build from a raw error object.
    pub fn from_value(response: JsonValue) -> Self {
        let code = response
            .get("extensions")
            .and_then(|ext| ext.get("code"))
            .and_then(|code| match code {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Number(n) => Some(n.to_string()),
                _ => None,
            });
        let message = response
            .get("message")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            code,
            message,
            response,
        }
    }

    /// Whether this error reports an expired access token.
    pub fn is_auth_expired(&self) -> bool {
        self.code.as_deref() == Some(AUTH_TOKEN_EXPIRED_ERROR)
    }
}

impl fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Core error type for Bird Buddy operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The GraphQL request produced no parseable response.
    #[error("No response from GraphQL endpoint")]
    NoResponse,

    /// The server reported a GraphQL error.
    #[error("GraphQL error: {0}")]
    Graphql(GraphqlError),

    /// The access token has expired.
    #[error("Auth token expired: {0}")]
    AuthTokenExpired(GraphqlError),

    /// Login or token refresh was rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The response did not contain the expected fields.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// More than one GraphQL error in a single response.
    #[error("{} GraphQL errors: {}", .0.len(), display_all(.0))]
    Composite(Vec<Error>),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn display_all(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Convert a GraphQL `errors` list into an error.
    ///
    /// Returns `None` when the list is empty. Expired-token errors are
    /// classified as [`Error::AuthTokenExpired`].
    pub fn from_graphql_errors(errors: &[JsonValue]) -> Option<Self> {
        let mut converted: Vec<Error> = errors
            .iter()
            .cloned()
            .map(|raw| {
                let err = GraphqlError::from_value(raw);
                if err.is_auth_expired() {
                    Error::AuthTokenExpired(err)
                } else {
                    Error::Graphql(err)
                }
            })
            .collect();
        match converted.len() {
            0 => None,
            1 => converted.pop(),
            _ => Some(Error::Composite(converted)),
        }
    }

    /// The server error code, if this error came from a GraphQL response.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Error::Graphql(err) | Error::AuthTokenExpired(err) => err.code.as_deref(),
            Error::Composite(errors) => errors.iter().find_map(Error::error_code),
            _ => None,
        }
    }

    /// Whether this error (or any error within a composite) is an expired token.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Error::AuthTokenExpired(_) => true,
            Error::Composite(errors) => errors.iter().any(Error::is_auth_expired),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graphql_error_code_extracted() {
        let err = GraphqlError::from_value(json!({
            "message": "already claimed",
            "extensions": {"code": "SIGHTING_POSTCARD_ALREADY_CLAIMED"}
        }));
        assert_eq!(err.code.as_deref(), Some("SIGHTING_POSTCARD_ALREADY_CLAIMED"));
        assert_eq!(err.message, "already claimed");
        assert_eq!(err.to_string(), "SIGHTING_POSTCARD_ALREADY_CLAIMED: already claimed");
    }

    #[test]
    fn test_graphql_error_numeric_code() {
        let err = GraphqlError::from_value(json!({
            "message": "Not Implemented",
            "extensions": {"code": 501}
        }));
        assert_eq!(err.code.as_deref(), Some("501"));
    }

    #[test]
    fn test_graphql_error_without_extensions() {
        let err = GraphqlError::from_value(json!({"message": "boom"}));
        assert!(err.code.is_none());
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_from_graphql_errors_empty() {
        assert!(Error::from_graphql_errors(&[]).is_none());
    }

    #[test]
    fn test_from_graphql_errors_auth_expired() {
        let err = Error::from_graphql_errors(&[json!({
            "message": "expired",
            "extensions": {"code": AUTH_TOKEN_EXPIRED_ERROR}
        })])
        .unwrap();
        assert!(matches!(err, Error::AuthTokenExpired(_)));
        assert!(err.is_auth_expired());
        assert_eq!(err.error_code(), Some(AUTH_TOKEN_EXPIRED_ERROR));
    }

    #[test]
    fn test_from_graphql_errors_single() {
        let err = Error::from_graphql_errors(&[json!({
            "message": "nope",
            "extensions": {"code": "FORBIDDEN"}
        })])
        .unwrap();
        assert!(matches!(err, Error::Graphql(_)));
        assert!(!err.is_auth_expired());
        assert_eq!(err.error_code(), Some("FORBIDDEN"));
    }

    #[test]
    fn test_from_graphql_errors_composite() {
        let err = Error::from_graphql_errors(&[
            json!({"message": "first", "extensions": {"code": "A"}}),
            json!({"message": "second", "extensions": {"code": AUTH_TOKEN_EXPIRED_ERROR}}),
        ])
        .unwrap();
        match &err {
            Error::Composite(errors) => assert_eq!(errors.len(), 2),
            other => panic!("Expected Composite error, got {:?}", other),
        }
        assert!(err.is_auth_expired());
        assert_eq!(err.error_code(), Some("A"));
        assert!(err.to_string().starts_with("2 GraphQL errors:"));
    }

    #[test]
    fn test_error_display_no_response() {
        assert_eq!(Error::NoResponse.to_string(), "No response from GraphQL endpoint");
    }

    #[test]
    fn test_error_display_authentication_failed() {
        let err = Error::AuthenticationFailed("bad password".to_string());
        assert_eq!(err.to_string(), "Authentication failed: bad password");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
