//! # anyx
//!
//! A fluent query builder that forwards CRUD requests to the Anyx backend.
//!
//! ## Features
//!
//! - **Chainable builder**: filters, ordering, pagination and single-row mode
//! - **One request per execution**: the builder is serialized into a single JSON POST
//! - **Lazy**: nothing is sent until the builder is awaited or executed, and every
//!   trigger sends a fresh request
//! - **Pluggable**: configuration sources, HTTP transport and monitors are traits
//!
//! ## Example
//!
//! ```ignore
//! // Reads VITE_PROJECT_ID / VITE_ANYX_SERVER_URL (or the NEXT_PUBLIC_* names)
//! // from the environment or a .env file.
//! let rows = anyx::from("links")
//!     .select("id, url")
//!     .ilike("url", "%example%")
//!     .order_by("id")
//!     .limit(20)
//!     .await?;
//! ```

pub mod client;
pub mod config;
mod dispatch;
pub mod error;
pub mod filter;
pub mod monitor;
pub mod qb;
pub mod transport;

pub use client::{AnyxClient, ClientOptions, default_client, from};
pub use config::{
    ConfigSource, ConnectionConfig, DotenvSource, EnvSource, LayeredSource, StaticSource,
};
pub use error::{AnyxError, AnyxResult};
pub use filter::{Filter, FilterOp, OrderOptions, OrderSpec};
pub use monitor::{
    CompositeMonitor, NoopMonitor, QueryContext, QueryMonitor, QueryOutcome, QueryStats,
    StatsMonitor, TracingMonitor,
};
pub use qb::{IntoRecords, Operation, PayloadBody, QueryBuilder, QueryPayload, Record};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};

/// Re-exported so callers can build values and records without a direct dependency.
pub use serde_json::{Value, json};
