//! Client handle that owns the transport, configuration source and monitor.

use crate::config::{ConfigSource, DotenvSource, EnvSource, LayeredSource};
use crate::monitor::{NoopMonitor, QueryMonitor};
use crate::qb::QueryBuilder;
use crate::transport::{ReqwestTransport, Transport};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Options for [`AnyxClient`].
#[derive(Clone, Default)]
pub struct ClientOptions {
    monitor: Option<Arc<dyn QueryMonitor>>,
}

impl ClientOptions {
    /// Create options with defaults (no monitoring).
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe every dispatched request.
    pub fn monitor(mut self, monitor: impl QueryMonitor + 'static) -> Self {
        self.monitor = Some(Arc::new(monitor));
        self
    }

    /// Observe every dispatched request through a shared monitor.
    pub fn monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("monitor", &self.monitor.is_some())
            .finish()
    }
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    config: Arc<dyn ConfigSource>,
    monitor: Arc<dyn QueryMonitor>,
}

/// Entry point for building queries.
///
/// Cheap to clone; clones share the transport, configuration source and monitor.
///
/// # Example
/// ```ignore
/// use anyx::AnyxClient;
///
/// let client = AnyxClient::from_env();
/// let links = client
///     .from("links")
///     .select("id, url, clicks")
///     .eq("owner_id", 42)
///     .order_by_desc("clicks")
///     .limit(20)
///     .await?;
/// ```
#[derive(Clone)]
pub struct AnyxClient {
    inner: Arc<ClientInner>,
}

impl AnyxClient {
    /// Create a client from a transport and a configuration source.
    pub fn new(
        transport: impl Transport + 'static,
        config: impl ConfigSource + 'static,
    ) -> Self {
        Self::with_options(transport, config, ClientOptions::default())
    }

    /// Create a client with explicit options.
    pub fn with_options(
        transport: impl Transport + 'static,
        config: impl ConfigSource + 'static,
        options: ClientOptions,
    ) -> Self {
        Self::from_parts(Arc::new(transport), Arc::new(config), options)
    }

    /// Create a client from already shared parts.
    pub fn from_parts(
        transport: Arc<dyn Transport>,
        config: Arc<dyn ConfigSource>,
        options: ClientOptions,
    ) -> Self {
        let monitor = options
            .monitor
            .unwrap_or_else(|| Arc::new(NoopMonitor) as Arc<dyn QueryMonitor>);
        Self {
            inner: Arc::new(ClientInner {
                transport,
                config,
                monitor,
            }),
        }
    }

    /// Client over HTTP that reads the process environment first, then a `.env` file.
    pub fn from_env() -> Self {
        let config = LayeredSource::new()
            .with_source(EnvSource)
            .with_source(DotenvSource::discover());
        Self::new(ReqwestTransport::new(), config)
    }

    /// Start a request against `table`.
    pub fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table)
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub(crate) fn config_source(&self) -> &dyn ConfigSource {
        self.inner.config.as_ref()
    }

    pub(crate) fn monitor(&self) -> &dyn QueryMonitor {
        self.inner.monitor.as_ref()
    }
}

impl fmt::Debug for AnyxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyxClient").finish_non_exhaustive()
    }
}

static DEFAULT_CLIENT: OnceLock<AnyxClient> = OnceLock::new();

/// Process-wide client created on first use with [`AnyxClient::from_env`].
pub fn default_client() -> &'static AnyxClient {
    DEFAULT_CLIENT.get_or_init(AnyxClient::from_env)
}

/// Start a request against `table` using the [`default_client`].
///
/// # Example
/// ```ignore
/// let rows = anyx::from("links").select("*").eq("active", true).await?;
/// ```
pub fn from(table: &str) -> QueryBuilder {
    default_client().from(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn crate_level_from_uses_shared_default_client() {
        assert!(std::ptr::eq(default_client(), default_client()));

        let payload = crate::from("links").select("id").to_payload();
        assert_eq!(
            payload.to_json().unwrap(),
            json!({
                "table": "links",
                "operation": "select",
                "select": "id",
                "filters": [],
                "order": [],
                "single": false
            })
        );
    }

    #[test]
    fn clients_share_inner_state_across_clones() {
        let client = AnyxClient::from_env();
        let other = client.clone();
        assert!(Arc::ptr_eq(&client.inner, &other.inner));
    }
}
