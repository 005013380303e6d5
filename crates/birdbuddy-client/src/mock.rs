//! Scripted GraphQL executor for deterministic testing.
//!
//! Responses are queued per operation name and replayed in order; every call
//! is recorded so tests can assert call order and variables.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let executor = ScriptedExecutor::new()
//!     .with_response("sightingReportPostcardFinish", json!({"success": true}));
//! let finished = PostcardFinisher::new(&executor).finish("pc1", &sighting, options).await?;
//! assert_eq!(executor.call_names(), vec!["sightingReportPostcardFinish"]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};

use birdbuddy_core::{Error, GraphqlExecutor, Operation, Result};

#[derive(Debug, Clone)]
enum ScriptedResponse {
    Data(JsonValue),
    Errors(Vec<JsonValue>),
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub variables: JsonValue,
}

/// Executor replaying scripted root payloads.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    responses: Arc<Mutex<HashMap<String, VecDeque<ScriptedResponse>>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `root` as the next payload for `operation`.
    pub fn with_response(self, operation: &str, root: JsonValue) -> Self {
        self.push(operation, ScriptedResponse::Data(root));
        self
    }

    /// Queue a GraphQL error as the next result for `operation`.
    pub fn with_error(self, operation: &str, code: &str, message: &str) -> Self {
        self.push(
            operation,
            ScriptedResponse::Errors(vec![json!({
                "message": message,
                "extensions": {"code": code}
            })]),
        );
        self
    }

    fn push(&self, operation: &str, response: ScriptedResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(response);
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Operation names of all calls so far, in order.
    pub fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.operation).collect()
    }
}

#[async_trait]
impl GraphqlExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        operation: &Operation,
        variables: JsonValue,
    ) -> Result<Map<String, JsonValue>> {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.name.to_string(),
            variables,
        });

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(operation.name)
            .and_then(VecDeque::pop_front);
        match next {
            Some(ScriptedResponse::Data(root)) => {
                let mut data = Map::new();
                data.insert(operation.root.to_string(), root);
                Ok(data)
            }
            Some(ScriptedResponse::Errors(errors)) => {
                Err(Error::from_graphql_errors(&errors).unwrap_or(Error::NoResponse))
            }
            None => Err(Error::UnexpectedResponse(format!(
                "no scripted response for {}",
                operation.name
            ))),
        }
    }
}
