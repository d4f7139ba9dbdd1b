use crate::qb::Operation;
use std::fmt;
use std::time::Duration;

/// Context information about the request being dispatched.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Target table.
    pub table: String,
    /// Operation carried by the payload.
    pub operation: Operation,
    /// Number of filters sent.
    pub filter_count: usize,
    /// Endpoint the request is posted to.
    pub url: String,
}

impl QueryContext {
    pub fn new(
        table: impl Into<String>,
        operation: Operation,
        filter_count: usize,
        url: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            operation,
            filter_count,
            url: url.into(),
        }
    }
}

/// Maximum length for error messages in `QueryOutcome::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Outcome of one dispatched request, for monitoring purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The backend answered 2xx with a JSON body.
    Success,
    /// The request failed (truncated to 512 bytes).
    Error(String),
}

impl QueryOutcome {
    /// Create an error outcome, truncating the message to avoid monitoring data explosion.
    pub fn error(msg: String) -> Self {
        if msg.len() > MAX_ERROR_LEN {
            let truncated = super::truncate_bytes(&msg, MAX_ERROR_LEN);
            Self::Error(format!("{truncated}..."))
        } else {
            Self::Error(msg)
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Success => f.write_str("ok"),
            QueryOutcome::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Trait for observing dispatched requests.
///
/// Implement this trait to collect metrics, log requests, or integrate
/// with observability systems. Configuration errors are raised before dispatch
/// and are not reported here.
pub trait QueryMonitor: Send + Sync {
    /// Called right before the HTTP request is sent.
    ///
    /// Default implementation does nothing.
    fn on_query_start(&self, _ctx: &QueryContext) {}

    /// Called after the request completes (success or failure).
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome);
}
