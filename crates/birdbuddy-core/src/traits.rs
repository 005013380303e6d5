//! Core traits for the Bird Buddy client.
//!
//! The sighting workflow talks to the remote service only through
//! [`GraphqlExecutor`], so it can be driven by the real HTTP client or by a
//! scripted executor in tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

/// A named GraphQL operation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Operation name as declared in the document (`mutation <name>`).
    pub name: &'static str,
    /// Root field of the response `data` object.
    pub root: &'static str,
    /// Full GraphQL document text.
    pub document: &'static str,
    /// Whether the variables carry credentials that must not be logged.
    pub sensitive: bool,
}

impl Operation {
    /// Define an operation whose variables are safe to log.
    pub const fn new(name: &'static str, root: &'static str, document: &'static str) -> Self {
        Self {
            name,
            root,
            document,
            sensitive: false,
        }
    }

    /// Mark the operation's variables as sensitive.
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// The first line of the document, for logging.
    pub fn summary(&self) -> &'static str {
        self.document.lines().next().unwrap_or(self.name)
    }
}

/// Executes GraphQL operations against the remote service.
///
/// Implementations return the response `data` object. Server-reported errors
/// surface as [`Error::Graphql`]; an expired access token is retried once
/// transparently by the implementation before surfacing.
#[async_trait]
pub trait GraphqlExecutor: Send + Sync {
    /// Execute `operation` with `variables` and return the `data` object.
    async fn execute(
        &self,
        operation: &Operation,
        variables: JsonValue,
    ) -> Result<Map<String, JsonValue>>;
}

/// Take `operation.root` out of a `data` object and deserialize it.
pub fn take_root<T: DeserializeOwned>(
    operation: &Operation,
    mut data: Map<String, JsonValue>,
) -> Result<T> {
    let value = data.remove(operation.root).ok_or_else(|| {
        Error::UnexpectedResponse(format!("missing `{}` in response data", operation.root))
    })?;
    serde_json::from_value(value).map_err(|e| {
        Error::UnexpectedResponse(format!("invalid `{}` payload: {}", operation.root, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    const PING: Operation = Operation::new("ping", "ping", "query ping {\n  ping { ok }\n}");

    struct EchoExecutor;

    #[async_trait]
    impl GraphqlExecutor for EchoExecutor {
        async fn execute(
            &self,
            operation: &Operation,
            variables: JsonValue,
        ) -> Result<Map<String, JsonValue>> {
            let mut data = Map::new();
            data.insert(operation.root.to_string(), variables);
            Ok(data)
        }
    }

    #[derive(Debug, Deserialize)]
    struct Pong {
        ok: bool,
    }

    #[test]
    fn test_operation_summary_is_first_line() {
        assert_eq!(PING.summary(), "query ping {");
        assert!(!PING.sensitive);
        assert!(PING.sensitive().sensitive);
    }

    #[test]
    fn test_take_root_missing_field() {
        let err = take_root::<Pong>(&PING, Map::new()).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
        assert!(err.to_string().contains("`ping`"));
    }

    #[test]
    fn test_take_root_wrong_shape() {
        let mut data = Map::new();
        data.insert("ping".to_string(), json!({"ok": "yes"}));
        let err = take_root::<Pong>(&PING, data).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_executor_trait_object() {
        let executor: Box<dyn GraphqlExecutor> = Box::new(EchoExecutor);
        let data = executor.execute(&PING, json!({"ok": true})).await.unwrap();
        let pong: Pong = take_root(&PING, data).unwrap();
        assert!(pong.ok);
    }
}
