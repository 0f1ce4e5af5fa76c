//! Property sources: the flat key space values are bound from.

mod error;
mod file;

use std::collections::BTreeMap;
use std::path::Path;
use std::{fs, io};

use crate::value::Value;

pub use error::SourceError;

/// Single-key lookup into a flat property space.
///
/// A source only answers lookups; key enumeration, when needed for maps, is
/// supplied separately through
/// [`ContextBuilder::with_map_keys`](crate::ContextBuilder::with_map_keys).
pub trait PropertySource: Send + Sync {
    fn lookup(&self, key: &str) -> Option<Value>;
}

impl<F> PropertySource for F
where
    F: Fn(&str) -> Option<Value> + Send + Sync,
{
    fn lookup(&self, key: &str) -> Option<Value> {
        self(key)
    }
}

/// In-memory property source.
///
/// ## Example
///
/// ```no_run
/// use dragon_bind::Properties;
///
/// // [server]
/// // host = "localhost"
/// // ports = [80, 443]
/// let properties = Properties::from_file("config/app.toml", true)?;
///
/// assert!(properties.get("server.host").is_some());
/// assert!(properties.get("server.ports[1]").is_some());
/// # Ok::<(), dragon_bind::SourceError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: BTreeMap<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Every key, in lexical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parses TOML text into flat properties.
    ///
    /// Tables become dotted keys, array elements `[i]` indices. A table key
    /// containing a dot is written with the bracket escape, so
    /// `[limits] "max.connections" = 64` becomes `limits[max.connections]`.
    pub fn from_toml_str(text: &str) -> Result<Self, SourceError> {
        let table: toml::Table = toml::from_str(text)?;
        Ok(file::flatten(table))
    }

    /// Loads a TOML file into flat properties.
    ///
    /// If `required` is `false`, a missing file yields empty properties.
    pub fn from_file(path: impl AsRef<Path>, required: bool) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => return Ok(Self::new()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SourceError::FileNotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(SourceError::ReadError {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let table = toml::from_str(&text).map_err(|source| SourceError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(file::flatten(table))
    }

    /// Adds every property of `other`, replacing values of equal keys.
    pub fn merge(&mut self, other: Properties) {
        self.values.extend(other.values);
    }
}

impl PropertySource for Properties {
    fn lookup(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
