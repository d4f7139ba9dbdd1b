//! Execution triggers for [`QueryBuilder`].
//!
//! `execute` is the only path to the network. Awaiting the builder and the
//! `then` / `catch` / `finally` adapters all call it again, so each trigger
//! issues its own request.

use crate::error::{AnyxError, AnyxResult};
use crate::qb::builder::QueryBuilder;
use futures_util::future::{BoxFuture, FutureExt, TryFutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::{Future, IntoFuture};

impl QueryBuilder {
    /// Send the request and return the backend's JSON response verbatim.
    pub async fn execute(&self) -> AnyxResult<Value> {
        let payload = self.to_payload();
        self.client().dispatch(payload).await
    }

    /// Send the request and deserialize the response into `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self) -> AnyxResult<T> {
        let value = self.execute().await?;
        serde_json::from_value(value).map_err(|e| AnyxError::Decode(e.to_string()))
    }

    /// Execute, then map a successful result with `on_fulfilled`.
    pub fn then<F, T>(&self, on_fulfilled: F) -> impl Future<Output = AnyxResult<T>> + Send + '_
    where
        F: FnOnce(Value) -> T + Send + 'static,
    {
        self.execute().map_ok(on_fulfilled)
    }

    /// Execute, recovering a failure into a value with `on_rejected`.
    pub fn catch<F>(&self, on_rejected: F) -> impl Future<Output = Value> + Send + '_
    where
        F: FnOnce(AnyxError) -> Value + Send + 'static,
    {
        self.execute().map(|result| result.unwrap_or_else(on_rejected))
    }

    /// Execute, run `on_finally` whatever the outcome, and pass the result through.
    pub fn finally<F>(&self, on_finally: F) -> impl Future<Output = AnyxResult<Value>> + Send + '_
    where
        F: FnOnce() + Send + 'static,
    {
        self.execute().inspect(|_| on_finally())
    }
}

impl IntoFuture for QueryBuilder {
    type Output = AnyxResult<Value>;
    type IntoFuture = BoxFuture<'static, AnyxResult<Value>>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.execute().await }.boxed()
    }
}

impl<'a> IntoFuture for &'a QueryBuilder {
    type Output = AnyxResult<Value>;
    type IntoFuture = BoxFuture<'a, AnyxResult<Value>>;

    fn into_future(self) -> Self::IntoFuture {
        self.execute().boxed()
    }
}
