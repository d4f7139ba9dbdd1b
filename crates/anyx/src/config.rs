//! Backend connection settings and where they are read from.
//!
//! The dispatcher needs two values, a project id and the backend base URL. Each
//! is looked up under two keys (a `VITE_*` name and a `NEXT_PUBLIC_*` name) through
//! a [`ConfigSource`]. Sources are consulted on every execution; nothing is cached
//! here.
//!
//! # Example
//!
//! ```ignore
//! use anyx::config::{ConnectionConfig, LayeredSource, EnvSource, DotenvSource};
//!
//! let source = LayeredSource::new()
//!     .with_source(EnvSource)
//!     .with_source(DotenvSource::discover());
//! let conn = ConnectionConfig::resolve(&source)?;
//! println!("{}", conn.query_url());
//! ```

use crate::error::{AnyxError, AnyxResult};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Keys consulted for the project id, in order.
pub const PROJECT_ID_KEYS: [&str; 2] = ["VITE_PROJECT_ID", "NEXT_PUBLIC_PROJECT_ID"];

/// Keys consulted for the backend base URL, in order.
pub const SERVER_URL_KEYS: [&str; 2] = ["VITE_ANYX_SERVER_URL", "NEXT_PUBLIC_ANYX_SERVER_URL"];

/// A place configuration values can be read from.
pub trait ConfigSource: Send + Sync {
    /// Raw value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Value for `key`, treating an empty string as unset.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

impl<F> ConfigSource for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Reads the process environment at lookup time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Values parsed from a `.env` file, without touching the process environment.
///
/// The file is read once, when the source is built.
#[derive(Debug, Clone, Default)]
pub struct DotenvSource {
    values: HashMap<String, String>,
}

impl DotenvSource {
    /// Parse the `.env` file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> AnyxResult<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            AnyxError::config(format!("failed to read env file {}: {e}", path.display()))
        })?;
        let values = iter
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|e| {
                AnyxError::config(format!("failed to parse env file {}: {e}", path.display()))
            })?;
        Ok(Self { values })
    }

    /// Look for a `.env` file in the current directory and its parents.
    ///
    /// A missing or unreadable file yields an empty source.
    pub fn discover() -> Self {
        let iter = match dotenvy::dotenv_iter() {
            Ok(iter) => iter,
            Err(e) if e.not_found() => return Self::default(),
            Err(e) => {
                tracing::warn!(target: "anyx.config", error = %e, "ignoring unreadable .env file");
                return Self::default();
            }
        };

        let mut values = HashMap::new();
        for item in iter {
            match item {
                Ok((key, value)) => {
                    values.insert(key, value);
                }
                Err(e) => {
                    tracing::warn!(target: "anyx.config", error = %e, "skipping malformed .env line");
                }
            }
        }
        Self { values }
    }

    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the file contributed no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for DotenvSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Fixed in-memory values.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    values: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for StaticSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Ordered list of sources; the first non-empty value wins.
#[derive(Clone, Default)]
pub struct LayeredSource {
    sources: Vec<Arc<dyn ConfigSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source with lower precedence than the ones already added.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }
}

impl fmt::Debug for LayeredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredSource")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl ConfigSource for LayeredSource {
    fn get(&self, key: &str) -> Option<String> {
        self.sources.iter().find_map(|s| s.get_non_empty(key))
    }
}

/// Resolved connection settings for one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub project_id: String,
    pub backend_url: String,
}

impl ConnectionConfig {
    pub fn new(project_id: impl Into<String>, backend_url: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            backend_url: backend_url.into(),
        }
    }

    /// Resolve both settings from `source`.
    ///
    /// Fails with a configuration error naming every missing setting.
    pub fn resolve(source: &dyn ConfigSource) -> AnyxResult<Self> {
        let project_id = first_non_empty(source, &PROJECT_ID_KEYS);
        let backend_url = first_non_empty(source, &SERVER_URL_KEYS);

        match (project_id, backend_url) {
            (Some(project_id), Some(backend_url)) => Ok(Self {
                project_id,
                backend_url,
            }),
            (project_id, backend_url) => {
                let mut missing = Vec::new();
                if project_id.is_none() {
                    missing.push(PROJECT_ID_KEYS.join(" / "));
                }
                if backend_url.is_none() {
                    missing.push(SERVER_URL_KEYS.join(" / "));
                }
                Err(AnyxError::config(format!(
                    "Missing {} environment variables. Please check your .env file or deployment settings.",
                    missing.join(" and ")
                )))
            }
        }
    }

    /// `{backend_url}/api/projects/{project_id}/query`
    pub fn query_url(&self) -> String {
        format!("{}/api/projects/{}/query", self.backend_url, self.project_id)
    }
}

fn first_non_empty(source: &dyn ConfigSource, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| source.get_non_empty(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CONFIG_ERROR_PREFIX;

    #[test]
    fn resolves_vite_keys() {
        let source = StaticSource::new()
            .with("VITE_PROJECT_ID", "p1")
            .with("VITE_ANYX_SERVER_URL", "https://api.example.com");
        let conn = ConnectionConfig::resolve(&source).unwrap();
        assert_eq!(conn, ConnectionConfig::new("p1", "https://api.example.com"));
        assert_eq!(
            conn.query_url(),
            "https://api.example.com/api/projects/p1/query"
        );
    }

    #[test]
    fn falls_back_to_next_public_keys() {
        let source = StaticSource::new()
            .with("NEXT_PUBLIC_PROJECT_ID", "p2")
            .with("NEXT_PUBLIC_ANYX_SERVER_URL", "http://localhost:3000");
        let conn = ConnectionConfig::resolve(&source).unwrap();
        assert_eq!(conn.project_id, "p2");
        assert_eq!(conn.backend_url, "http://localhost:3000");
    }

    #[test]
    fn vite_key_takes_precedence() {
        let source = StaticSource::new()
            .with("VITE_PROJECT_ID", "vite")
            .with("NEXT_PUBLIC_PROJECT_ID", "next")
            .with("VITE_ANYX_SERVER_URL", "http://a");
        assert_eq!(ConnectionConfig::resolve(&source).unwrap().project_id, "vite");
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let source = StaticSource::new()
            .with("VITE_PROJECT_ID", "")
            .with("NEXT_PUBLIC_PROJECT_ID", "next")
            .with("VITE_ANYX_SERVER_URL", "http://a");
        assert_eq!(ConnectionConfig::resolve(&source).unwrap().project_id, "next");
    }

    #[test]
    fn missing_project_id_is_config_error() {
        let source = StaticSource::new().with("VITE_ANYX_SERVER_URL", "http://a");
        let err = ConnectionConfig::resolve(&source).unwrap_err();
        assert!(err.is_config());
        let msg = err.to_string();
        assert!(msg.starts_with(CONFIG_ERROR_PREFIX));
        assert!(msg.contains("VITE_PROJECT_ID"));
        assert!(!msg.contains("VITE_ANYX_SERVER_URL"));
    }

    #[test]
    fn missing_both_names_both() {
        let err = ConnectionConfig::resolve(&StaticSource::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("VITE_PROJECT_ID"));
        assert!(msg.contains("VITE_ANYX_SERVER_URL"));
    }

    #[test]
    fn layered_source_first_non_empty_wins() {
        let layered = LayeredSource::new()
            .with_source(StaticSource::new().with("KEY", ""))
            .with_source(StaticSource::new().with("KEY", "second"))
            .with_source(StaticSource::new().with("KEY", "third"));
        assert_eq!(layered.get("KEY").as_deref(), Some("second"));
        assert_eq!(layered.get("OTHER"), None);
    }

    #[test]
    fn closure_is_a_source() {
        let source = |key: &str| (key == "VITE_PROJECT_ID").then(|| "from-closure".to_string());
        assert_eq!(source.get("VITE_PROJECT_ID").as_deref(), Some("from-closure"));
        assert_eq!(source.get("VITE_ANYX_SERVER_URL"), None);
    }

    #[test]
    fn dotenv_source_missing_file_is_config_error() {
        let err = DotenvSource::from_path("/definitely/not/here/.env").unwrap_err();
        assert!(err.is_config());
    }
}
