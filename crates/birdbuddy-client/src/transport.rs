//! HTTP transport for GraphQL operations.

use std::time::Duration;

use reqwest::header::{ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, instrument, trace};

use birdbuddy_core::logging::{redact_variables, REDACTED};
use birdbuddy_core::{Error, Operation, Result};

/// Request body of a GraphQL POST.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: &'a JsonValue,
    operation_name: &'a str,
}

/// Sends GraphQL operations to one endpoint.
///
/// Performs no authentication of its own; the caller passes the current
/// access token.
#[derive(Debug, Clone)]
pub struct GraphqlTransport {
    client: Client,
    url: String,
}

impl GraphqlTransport {
    /// Create a transport for `url` with the given request timeout.
    pub fn new(url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let url = url.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(url = %url, timeout_seconds, "Initializing Bird Buddy GraphQL transport");

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `operation` and return the response `data` object.
    ///
    /// Fails with [`Error::NoResponse`] when the body is not a JSON object,
    /// with a GraphQL error (or [`Error::Composite`]) when the response
    /// carries `errors`, and with [`Error::UnexpectedResponse`] when `data`
    /// is missing.
    #[instrument(skip(self, variables, access_token, language), fields(subsystem = "birdbuddy", component = "transport", op = operation.name))]
    pub async fn post(
        &self,
        operation: &Operation,
        variables: &JsonValue,
        access_token: Option<&str>,
        language: &str,
    ) -> Result<Map<String, JsonValue>> {
        if operation.sensitive {
            debug!(vars = %redact_variables(variables), "> GraphQL {}", operation.summary());
        } else {
            debug!(vars = %variables, "> GraphQL {}", operation.summary());
        }

        let body = GraphqlRequest {
            query: operation.document,
            variables,
            operation_name: operation.name,
        };
        let mut request = self
            .client
            .post(&self.url)
            .header(ACCEPT_LANGUAGE, language)
            .json(&body);
        if let Some(token) = access_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let mut payload = match serde_json::from_str::<JsonValue>(&text) {
            Ok(JsonValue::Object(payload)) => payload,
            _ if !status.is_success() => {
                return Err(Error::Request(format!("HTTP {} from GraphQL endpoint", status)))
            }
            _ => return Err(Error::NoResponse),
        };

        if let Some(JsonValue::Array(errors)) = payload.get("errors") {
            if let Some(err) = Error::from_graphql_errors(errors) {
                debug!(error = %err, "< GraphQL error");
                return Err(err);
            }
        }

        match payload.remove("data") {
            Some(JsonValue::Object(data)) => {
                if operation.sensitive {
                    trace!(response = REDACTED, "< response");
                } else {
                    trace!(response = %JsonValue::Object(data.clone()), "< response");
                }
                Ok(data)
            }
            _ => Err(Error::UnexpectedResponse(format!(
                "{} response has no data object (HTTP {})",
                operation.name, status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let variables = json!({"feederId": "f1"});
        let body = GraphqlRequest {
            query: "query me { me { id } }",
            variables: &variables,
            operation_name: "me",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "query": "query me { me { id } }",
                "variables": {"feederId": "f1"},
                "operationName": "me"
            })
        );
    }

    #[test]
    fn test_new_transport() {
        let transport = GraphqlTransport::new("http://localhost:1/graphql", 5).unwrap();
        assert_eq!(transport.url(), "http://localhost:1/graphql");
    }
}
