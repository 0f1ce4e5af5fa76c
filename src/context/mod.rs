//! Binding context: property lookup plus the strategies the engine consults.

mod builder;
mod defaults;
mod keys;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::BindError;
use crate::shape::{CollectionKind, Shape};
use crate::source::PropertySource;
use crate::value::Value;

pub use builder::ContextBuilder;
pub use defaults::{CollectionSink, Conversion, ListSink, MapSink, OrderedMap, SetSink};

pub type Converter = Arc<dyn Fn(&Value, &Shape) -> Conversion + Send + Sync>;
pub type CollectionCreator =
    Arc<dyn Fn(&CollectionKind) -> Option<Box<dyn CollectionSink>> + Send + Sync>;
pub type MapCreator = Arc<dyn Fn() -> Box<dyn MapSink> + Send + Sync>;
pub type MapKeyStrategy = Arc<dyn Fn(&str, &Shape) -> BTreeSet<String> + Send + Sync>;
pub type PropertyNameStrategy = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;
pub type ElementNameStrategy = Arc<dyn Fn(&str, usize) -> String + Send + Sync>;

pub(crate) const DEFAULT_PROBE_DEPTH: usize = 5;

/// How the engine retrieves a value of a given shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch<'a> {
    Any,
    Scalar,
    Collection {
        kind: &'a CollectionKind,
        element: &'a Shape,
    },
    Map {
        key: &'a Shape,
        value: &'a Shape,
    },
    /// Enums and composites, bound through the engine entry point.
    Nested,
    Unsupported,
}

/// Flags that hold for one branch of a binding call tree.
///
/// Scopes are plain values: a sub-call receives a derived copy, so nothing a
/// callee changes is visible to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    tolerate_empty_collection: bool,
    has_mandatory_parameter: bool,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            tolerate_empty_collection: true,
            has_mandatory_parameter: false,
        }
    }
}

impl Scope {
    pub fn tolerates_empty_collection(&self) -> bool {
        self.tolerate_empty_collection
    }

    pub fn has_mandatory_parameter(&self) -> bool {
        self.has_mandatory_parameter
    }

    pub fn with_tolerate_empty_collection(self, tolerate: bool) -> Self {
        Self {
            tolerate_empty_collection: tolerate,
            ..self
        }
    }

    pub fn with_mandatory_parameter(self, mandatory: bool) -> Self {
        Self {
            has_mandatory_parameter: mandatory,
            ..self
        }
    }
}

/// Immutable set of binding strategies over one property source.
///
/// Built with [`Context::builder`]; cheap to clone and safe to share between
/// threads.
#[derive(Clone)]
pub struct Context {
    source: Arc<dyn PropertySource>,
    scalar_types: BTreeSet<String>,
    collection_types: BTreeSet<String>,
    converter: Converter,
    collection_creator: CollectionCreator,
    map_creator: MapCreator,
    map_key_strategy: MapKeyStrategy,
    regular_name: PropertyNameStrategy,
    element_name: ElementNameStrategy,
    map_value_name: PropertyNameStrategy,
    probe_depth: usize,
}

impl Context {
    pub fn builder(source: impl PropertySource + 'static) -> ContextBuilder {
        ContextBuilder::new(Arc::new(source))
    }

    /// Raw value stored under `key`. A stored null counts as absent.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        self.source.lookup(key).filter(|value| !value.is_null())
    }

    pub fn classify<'a>(&self, shape: &'a Shape) -> Dispatch<'a> {
        match shape {
            Shape::Any => Dispatch::Any,
            Shape::Scalar(scalar) if self.scalar_types.contains(scalar.name()) => Dispatch::Scalar,
            Shape::Scalar(_) => Dispatch::Unsupported,
            Shape::Composite(composite) if self.scalar_types.contains(composite.name()) => {
                Dispatch::Scalar
            }
            Shape::Composite(_) | Shape::Enum(_) => Dispatch::Nested,
            Shape::Collection(kind, element) if self.collection_types.contains(kind.name()) => {
                Dispatch::Collection { kind, element }
            }
            Shape::Collection(..) => Dispatch::Unsupported,
            Shape::Map(key, value) => Dispatch::Map { key, value },
        }
    }

    pub fn is_scalar(&self, shape: &Shape) -> bool {
        matches!(self.classify(shape), Dispatch::Scalar)
    }

    pub fn is_collection(&self, shape: &Shape) -> bool {
        matches!(self.classify(shape), Dispatch::Collection { .. })
    }

    pub fn is_map(&self, shape: &Shape) -> bool {
        matches!(self.classify(shape), Dispatch::Map { .. })
    }

    /// Converts a raw value to `target` with the configured converter.
    ///
    /// When the converter declines, the raw value is used as is if it is
    /// already an instance of the target.
    pub fn convert(&self, raw: &Value, target: &Shape) -> Result<Value, BindError> {
        let conversion_error = |reason: String| BindError::Conversion {
            value: raw.to_string(),
            target: target.name(),
            reason,
        };
        match (self.converter)(raw, target) {
            Conversion::Converted(value) if self.accepts_converted(&value, target) => Ok(value),
            Conversion::Failed(reason) => Err(conversion_error(reason)),
            _ if raw.conforms_to(target) => Ok(raw.clone()),
            _ => Err(conversion_error("no converter accepted the value".to_string())),
        }
    }

    fn accepts_converted(&self, value: &Value, target: &Shape) -> bool {
        match target {
            Shape::Composite(composite) if self.scalar_types.contains(composite.name()) => {
                !value.is_null()
            }
            _ => value.conforms_to(target),
        }
    }

    pub fn create_collection(
        &self,
        kind: &CollectionKind,
    ) -> Result<Box<dyn CollectionSink>, BindError> {
        (self.collection_creator)(kind).ok_or_else(|| BindError::UnsupportedType {
            name: kind.name().to_string(),
        })
    }

    pub fn create_map(&self) -> Box<dyn MapSink> {
        (self.map_creator)()
    }

    /// Keys known to exist under `path` for a map with the given key shape.
    /// An empty set means no keys are known.
    pub fn map_keys(&self, path: &str, key: &Shape) -> BTreeSet<String> {
        (self.map_key_strategy)(path, key)
    }

    pub fn regular_property_name(&self, base: &str, field: &str) -> String {
        (self.regular_name)(base, field)
    }

    pub fn element_property_name(&self, base: &str, index: usize) -> String {
        (self.element_name)(base, index)
    }

    pub fn map_value_property_name(&self, base: &str, key: &str) -> String {
        (self.map_value_name)(base, key)
    }

    /// Recursion bound for inferring the structure of untyped values.
    pub fn probe_depth(&self) -> usize {
        self.probe_depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("scalar_types", &self.scalar_types)
            .field("collection_types", &self.collection_types)
            .field("probe_depth", &self.probe_depth)
            .finish_non_exhaustive()
    }
}
