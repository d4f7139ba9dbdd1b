//! Serialization, HTTP dispatch and response normalization.

use crate::client::AnyxClient;
use crate::config::ConnectionConfig;
use crate::error::{AnyxError, AnyxResult};
use crate::monitor::{QueryContext, QueryOutcome};
use crate::qb::QueryPayload;
use crate::transport::TransportResponse;
use serde_json::Value;
use std::time::Instant;

impl AnyxClient {
    /// Run one request end to end.
    ///
    /// Validation and configuration errors are returned before anything is sent.
    pub(crate) async fn dispatch(&self, payload: QueryPayload) -> AnyxResult<Value> {
        if payload.table.is_empty() {
            return Err(AnyxError::validation("table name must not be empty"));
        }

        let conn = ConnectionConfig::resolve(self.config_source())?;
        let url = conn.query_url();
        let body = serde_json::to_vec(&payload)?;

        let ctx = QueryContext::new(
            payload.table.as_str(),
            payload.operation(),
            payload.filters().len(),
            url.as_str(),
        );
        tracing::debug!(
            target: "anyx.query",
            table = %ctx.table,
            operation = %ctx.operation,
            filters = ctx.filter_count,
            url = %url,
            "dispatching query"
        );

        self.monitor().on_query_start(&ctx);
        let start = Instant::now();
        let result = self.send(&url, body).await;
        let duration = start.elapsed();

        let outcome = match &result {
            Ok(_) => QueryOutcome::Success,
            Err(e) => QueryOutcome::error(e.to_string()),
        };
        tracing::debug!(
            target: "anyx.query",
            table = %ctx.table,
            operation = %ctx.operation,
            ?duration,
            outcome = %outcome,
            "query finished"
        );
        self.monitor().on_query_complete(&ctx, duration, &outcome);

        result
    }

    async fn send(&self, url: &str, body: Vec<u8>) -> AnyxResult<Value> {
        let response = match self.transport().post_json(url, body).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(target: "anyx.query", error = %e, "network error");
                return Err(AnyxError::Network);
            }
        };

        if !response.is_success() {
            return Err(error_from_response(response));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!(
                target: "anyx.query",
                status = response.status,
                error = %e,
                "response body is not valid JSON"
            );
            AnyxError::Network
        })
    }
}

/// Map a non-2xx response to an error.
///
/// A JSON body with a string `error` field yields that message verbatim; any
/// other body is reported together with the status.
pub(crate) fn error_from_response(response: TransportResponse) -> AnyxError {
    let TransportResponse { status, body } = response;
    let message = match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(mut map)) => match map.remove("error") {
            Some(Value::String(message)) if !message.is_empty() => Some(message),
            _ => None,
        },
        _ => None,
    };

    match message {
        Some(message) => AnyxError::Server(message),
        None => AnyxError::Status { status, body },
    }
}
