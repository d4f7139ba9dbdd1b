use super::types::{QueryContext, QueryMonitor, QueryOutcome};
use crate::qb::Operation;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::Level;

/// A no-op monitor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl QueryMonitor for NoopMonitor {
    fn on_query_complete(&self, _ctx: &QueryContext, _duration: Duration, _outcome: &QueryOutcome) {}
}

/// A `tracing`-based monitor that emits one event per completed request.
#[derive(Debug, Clone)]
pub struct TracingMonitor {
    /// Tracing event level for successful requests. Failures are always `WARN`.
    pub level: Level,
    /// Minimum duration to log (filters out fast requests).
    pub min_duration: Option<Duration>,
}

impl Default for TracingMonitor {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            min_duration: None,
        }
    }
}

impl TracingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the event level used for successful requests.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Only log requests slower than this duration.
    pub fn min_duration(mut self, duration: Duration) -> Self {
        self.min_duration = Some(duration);
        self
    }
}

impl QueryMonitor for TracingMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        if let Some(min) = self.min_duration {
            if duration < min {
                return;
            }
        }

        if let QueryOutcome::Error(message) = outcome {
            tracing::warn!(
                target: "anyx.query",
                table = %ctx.table,
                operation = %ctx.operation,
                filters = ctx.filter_count,
                ?duration,
                error = %message,
                "query failed"
            );
            return;
        }

        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        emit_at_level!(
            self.level,
            target: "anyx.query",
            table = %ctx.table,
            operation = %ctx.operation,
            filters = ctx.filter_count,
            ?duration,
            "query completed"
        );
    }
}

/// A monitor that tracks request statistics.
#[derive(Debug, Default)]
pub struct StatsMonitor {
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    total_duration_nanos: AtomicU64,
    max_duration_nanos: AtomicU64,
    select_count: AtomicU64,
    insert_count: AtomicU64,
    update_count: AtomicU64,
    delete_count: AtomicU64,
}

/// Collected request statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Total number of dispatched requests.
    pub total_queries: u64,
    /// Requests that ended in an error.
    pub failed_queries: u64,
    /// Total time spent waiting on the backend.
    pub total_duration: Duration,
    /// Slowest single request.
    pub max_duration: Duration,
    pub select_count: u64,
    pub insert_count: u64,
    pub update_count: u64,
    pub delete_count: u64,
}

impl StatsMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            select_count: self.select_count.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.total_queries,
            &self.failed_queries,
            &self.total_duration_nanos,
            &self.max_duration_nanos,
            &self.select_count,
            &self.insert_count,
            &self.update_count,
            &self.delete_count,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn counter_for(&self, operation: Operation) -> &AtomicU64 {
        match operation {
            Operation::Select => &self.select_count,
            Operation::Insert => &self.insert_count,
            Operation::Update => &self.update_count,
            Operation::Delete => &self.delete_count,
        }
    }
}

impl QueryMonitor for StatsMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        self.counter_for(ctx.operation).fetch_add(1, Ordering::Relaxed);
        if outcome.is_error() {
            self.failed_queries.fetch_add(1, Ordering::Relaxed);
        }

        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_duration_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_duration_nanos.fetch_max(nanos, Ordering::Relaxed);
    }
}

/// Fans events out to several monitors, in insertion order.
#[derive(Clone, Default)]
pub struct CompositeMonitor {
    monitors: Vec<Arc<dyn QueryMonitor>>,
}

impl CompositeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monitor.
    pub fn add(mut self, monitor: impl QueryMonitor + 'static) -> Self {
        self.monitors.push(Arc::new(monitor));
        self
    }

    /// Add a shared monitor (e.g. a `StatsMonitor` you keep a handle to).
    pub fn add_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }
}

impl std::fmt::Debug for CompositeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeMonitor")
            .field("monitors", &self.monitors.len())
            .finish()
    }
}

impl QueryMonitor for CompositeMonitor {
    fn on_query_start(&self, ctx: &QueryContext) {
        for monitor in &self.monitors {
            monitor.on_query_start(ctx);
        }
    }

    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        for monitor in &self.monitors {
            monitor.on_query_complete(ctx, duration, outcome);
        }
    }
}
