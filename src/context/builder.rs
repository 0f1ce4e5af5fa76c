use std::collections::BTreeSet;
use std::sync::Arc;

use crate::shape::{CollectionKind, Shape};
use crate::source::PropertySource;
use crate::value::Value;

use super::defaults::{self, CollectionSink, Conversion, MapSink};
use super::keys::MapKeyIndex;
use super::{
    CollectionCreator, Context, Converter, ElementNameStrategy, MapCreator, MapKeyStrategy,
    PropertyNameStrategy, DEFAULT_PROBE_DEPTH,
};

/// Builder for a [`Context`].
///
/// Every strategy starts out with its built-in default. Methods taking a
/// `replace` flag either discard what was configured before (`true`) or
/// compose with it (`false`); naming strategies are always replaced.
///
/// ## Example
///
/// ```
/// use dragon_bind::{Context, Properties, Value};
///
/// let properties = Properties::new()
///     .with("server.host", Value::from("localhost"))
///     .with("server.limits[max.connections]", Value::from(64));
///
/// let context = Context::builder(properties.clone())
///     .with_map_keys(properties.keys())
///     .build();
///
/// assert_eq!(
///     context.map_value_property_name("server.limits", "max.connections"),
///     "server.limits[max.connections]"
/// );
/// ```
#[must_use = "builders do nothing until .build() is called"]
pub struct ContextBuilder {
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

impl ContextBuilder {
    pub(crate) fn new(source: Arc<dyn PropertySource>) -> Self {
        Self {
            source,
            scalar_types: defaults::scalar_types(),
            collection_types: defaults::collection_types(),
            converter: Arc::new(defaults::convert),
            collection_creator: Arc::new(defaults::create_collection),
            map_creator: Arc::new(defaults::create_map),
            map_key_strategy: Arc::new(defaults::map_keys),
            regular_name: Arc::new(defaults::regular_property_name),
            element_name: Arc::new(defaults::element_property_name),
            map_value_name: Arc::new(defaults::regular_property_name),
            probe_depth: DEFAULT_PROBE_DEPTH,
        }
    }

    /// Type names bound from a single raw value.
    ///
    /// Names are matched against [`Shape::name`], so a composite listed here
    /// is converted by the type converter instead of being constructed.
    pub fn with_scalar_types<I, S>(mut self, names: I, replace: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if replace {
            self.scalar_types.clear();
        }
        self.scalar_types.extend(names.into_iter().map(Into::into));
        self
    }

    /// Collection kind names (see [`CollectionKind::name`]) bound by index.
    pub fn with_collection_types<I, S>(mut self, names: I, replace: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if replace {
            self.collection_types.clear();
        }
        self.collection_types.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the type converter.
    ///
    /// When composing, the current converter runs first and `converter` is
    /// only asked when it declines.
    pub fn with_type_converter<F>(mut self, replace: bool, converter: F) -> Self
    where
        F: Fn(&Value, &Shape) -> Conversion + Send + Sync + 'static,
    {
        self.converter = if replace {
            Arc::new(converter)
        } else {
            let current = Arc::clone(&self.converter);
            Arc::new(move |raw: &Value, target: &Shape| match current(raw, target) {
                Conversion::Declined => converter(raw, target),
                decided => decided,
            })
        };
        self
    }

    /// Sets the collection factory. When composing, `creator` is only asked
    /// for kinds the current factory doesn't build.
    pub fn with_collection_creator<F>(mut self, replace: bool, creator: F) -> Self
    where
        F: Fn(&CollectionKind) -> Option<Box<dyn CollectionSink>> + Send + Sync + 'static,
    {
        self.collection_creator = if replace {
            Arc::new(creator)
        } else {
            let current = Arc::clone(&self.collection_creator);
            Arc::new(move |kind: &CollectionKind| current(kind).or_else(|| creator(kind)))
        };
        self
    }

    pub fn with_map_creator<F>(mut self, creator: F) -> Self
    where
        F: Fn() -> Box<dyn MapSink> + Send + Sync + 'static,
    {
        self.map_creator = Arc::new(creator);
        self
    }

    pub fn with_regular_property_name_strategy<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.regular_name = Arc::new(strategy);
        self
    }

    pub fn with_element_property_name_strategy<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&str, usize) -> String + Send + Sync + 'static,
    {
        self.element_name = Arc::new(strategy);
        self
    }

    pub fn with_map_value_property_name_strategy<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.map_value_name = Arc::new(strategy);
        self
    }

    /// Sets the strategy enumerating the keys of a map property.
    ///
    /// When composing, `strategy` is only consulted when the current one
    /// knows no keys.
    pub fn with_map_key_strategy<F>(mut self, replace: bool, strategy: F) -> Self
    where
        F: Fn(&str, &Shape) -> BTreeSet<String> + Send + Sync + 'static,
    {
        self.map_key_strategy = if replace {
            Arc::new(strategy)
        } else {
            let current = Arc::clone(&self.map_key_strategy);
            Arc::new(move |path: &str, key: &Shape| {
                let keys = current(path, key);
                if keys.is_empty() {
                    strategy(path, key)
                } else {
                    keys
                }
            })
        };
        self
    }

    /// Derives map keys and map value names from the full set of property
    /// keys in the source.
    ///
    /// The keys of the map at `base` are the segments following `base.`
    /// (cut at the first `[`) and the bracketed segments following `base[`.
    /// Bracketed segments that are all digits are collection indices and are
    /// never reported as keys. A key is addressed as `base[key]` when the
    /// source spells it that way, so keys may contain dots.
    ///
    /// The derived key strategy is composed with the current one.
    pub fn with_map_keys<I, S>(self, all_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = Arc::new(MapKeyIndex::new(all_keys));
        let names = Arc::clone(&index);
        self.with_map_key_strategy(false, move |path, _| index.keys_under(path))
            .with_map_value_property_name_strategy(move |base, key| names.value_name(base, key))
    }

    /// Recursion bound used when inferring the structure of untyped values.
    pub fn with_probe_depth(mut self, depth: usize) -> Self {
        self.probe_depth = depth;
        self
    }

    pub fn build(self) -> Context {
        Context {
            source: self.source,
            scalar_types: self.scalar_types,
            collection_types: self.collection_types,
            converter: self.converter,
            collection_creator: self.collection_creator,
            map_creator: self.map_creator,
            map_key_strategy: self.map_key_strategy,
            regular_name: self.regular_name,
            element_name: self.element_name,
            map_value_name: self.map_value_name,
            probe_depth: self.probe_depth,
        }
    }
}
