//! Request monitoring for the dispatcher.
//!
//! A [`QueryMonitor`] sees every request that reaches the network: once before it
//! is sent and once when it completes, with the elapsed time and outcome.
//!
//! # Example
//!
//! ```rust,ignore
//! use anyx::monitor::{CompositeMonitor, StatsMonitor, TracingMonitor};
//! use anyx::{AnyxClient, ClientOptions};
//! use std::sync::Arc;
//!
//! let stats = Arc::new(StatsMonitor::new());
//! let monitor = CompositeMonitor::new()
//!     .add(TracingMonitor::new())
//!     .add_arc(stats.clone());
//!
//! let client = AnyxClient::with_options(transport, config, ClientOptions::new().monitor(monitor));
//! // ... run queries ...
//! println!("{:?}", stats.stats());
//! ```

mod monitors;
mod types;


pub use monitors::{CompositeMonitor, NoopMonitor, QueryStats, StatsMonitor, TracingMonitor};
pub use types::{QueryContext, QueryMonitor, QueryOutcome};

pub(crate) fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
