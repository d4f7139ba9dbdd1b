//! Query builder: accumulates one request and sends it on demand.
//!
//! # Usage
//!
//! ```ignore
//! use anyx::AnyxClient;
//! use serde_json::json;
//!
//! let client = AnyxClient::from_env();
//!
//! // SELECT
//! let links = client
//!     .from("links")
//!     .select("id, url, clicks")
//!     .eq("active", true)
//!     .order_by_desc("clicks")
//!     .limit(10)
//!     .await?;
//!
//! // INSERT (one record or many)
//! client
//!     .from("links")
//!     .insert(json!({"url": "https://example.com", "active": true}))
//!     .await?;
//!
//! // UPDATE
//! client
//!     .from("links")
//!     .update(json!({"active": false}))
//!     .eq("id", 7)
//!     .await?;
//!
//! // DELETE
//! client.from("links").delete().eq("id", 7).await?;
//! ```

mod builder;
mod exec;
mod payload;
mod records;

pub use builder::QueryBuilder;
pub use payload::{Operation, PayloadBody, QueryPayload};
pub use records::{IntoRecords, Record};
