//! The instantiation engine.
//!
//! [`Binder`] is the entry point: it resolves the declared shape of the
//! target, tries the constructors of composite types through a cached
//! [`ClassCreator`](creator::ClassCreator) per type and recurses into nested
//! composites through the per-parameter retrievers.

mod creator;
mod instantiator;
mod probe;
mod retriever;


use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::context::{Context, Dispatch, Scope};
use crate::error::{BindError, Error};
use crate::result::ProcessingResult;
use crate::shape::{Bindable, CompositeRef, Shape};
use crate::value::Value;

use creator::ClassCreator;
use retriever::{Field, Resolver};

/// Successful outcome of retrieving one parameter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolution {
    Value(Value),
    /// Bound to an explicit null.
    Null,
    /// No data; the parameter's declared default applies.
    Default,
}

/// Soft failures are reported in the inner result; the outer error aborts
/// the whole binding.
pub(crate) type Retrieval = Result<ProcessingResult<Resolution, BindError>, BindError>;

/// Binds property data to typed values.
///
/// A `Binder` caches what it learns about each composite type, so a single
/// instance should be reused for the lifetime of a binding configuration.
///
/// ## Example
///
/// ```
/// use dragon_bind::{Bindable, Binder, Constructor, Context, Properties, Shape, TypeDescriptor, Value};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Server {
///     host: String,
///     #[serde(default)]
///     ports: Vec<u16>,
/// }
///
/// impl Bindable for Server {
///     fn shape() -> Shape {
///         Shape::composite::<Self>(|| {
///             TypeDescriptor::new("Server").constructor(
///                 Constructor::new("Server")
///                     .field::<String>("host")
///                     .optional::<Vec<u16>>("ports"),
///             )
///         })
///     }
/// }
///
/// let context = Context::builder(
///     Properties::new()
///         .with("server.host", Value::from("localhost"))
///         .with("server.ports[0]", Value::from(80))
///         .with("server.ports[1]", Value::from("443")),
/// )
/// .build();
///
/// let server: Server = Binder::new().create("server", &context)?;
/// assert_eq!(server.ports, vec![80, 443]);
/// # Ok::<(), dragon_bind::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Binder {
    creators: DashMap<&'static str, Arc<ClassCreator>>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the data under `prefix` to a `T`.
    pub fn create<T>(&self, prefix: &str, context: &Context) -> Result<T, Error>
    where
        T: Bindable + DeserializeOwned,
    {
        let value = self.instantiate(prefix, &T::shape(), T::nullable(), context, Scope::default())?;
        Ok(T::deserialize(value)?)
    }

    /// Binds the data under `prefix` to the dynamic form of `shape`.
    #[instrument(level = "debug", skip_all, fields(prefix = prefix, target = %shape))]
    pub fn create_value(
        &self,
        prefix: &str,
        shape: &Shape,
        context: &Context,
    ) -> Result<Value, BindError> {
        self.instantiate(prefix, shape, false, context, Scope::default())
    }

    pub(crate) fn instantiate(
        &self,
        prefix: &str,
        shape: &Shape,
        nullable: bool,
        context: &Context,
        scope: Scope,
    ) -> Result<Value, BindError> {
        match (context.classify(shape), shape) {
            (Dispatch::Any, _) => match context.lookup(prefix) {
                Some(raw) => Ok(raw),
                None if nullable => Ok(Value::Null),
                None => Err(BindError::MissingValue {
                    path: prefix.to_string(),
                }),
            },
            (Dispatch::Scalar, _) | (Dispatch::Nested, Shape::Enum(_)) => {
                match context.lookup(prefix) {
                    Some(raw) => context.convert(&raw, shape),
                    None if nullable => Ok(Value::Null),
                    None => Err(BindError::MissingValue {
                        path: prefix.to_string(),
                    }),
                }
            }
            (Dispatch::Nested, Shape::Composite(composite)) => {
                match self.creator_for(composite).create(self, prefix, context, scope) {
                    Err(error) if nullable && !error.is_fatal() => {
                        debug!(prefix, %error, "nullable target not available");
                        Ok(Value::Null)
                    }
                    created => created,
                }
            }
            (Dispatch::Collection { .. } | Dispatch::Map { .. }, _) => {
                let field = Field {
                    nullable,
                    optional: false,
                };
                let resolver = Resolver::new(self, context);
                match resolver.retrieve(prefix, shape, field, scope)? {
                    ProcessingResult::Success(Resolution::Value(value)) => Ok(value),
                    ProcessingResult::Success(Resolution::Null) => Ok(Value::Null),
                    ProcessingResult::Success(Resolution::Default) => {
                        Err(BindError::MissingValue {
                            path: prefix.to_string(),
                        })
                    }
                    ProcessingResult::Failure(error) => Err(error),
                }
            }
            _ => Err(BindError::UnsupportedType { name: shape.name() }),
        }
    }

    fn creator_for(&self, composite: &CompositeRef) -> Arc<ClassCreator> {
        if let Some(creator) = self.creators.get(composite.type_name()) {
            return Arc::clone(creator.value());
        }

        // Built outside the map so no shard lock is held while describing.
        let creator = Arc::new(ClassCreator::new(composite));
        debug!(
            type_name = composite.type_name(),
            constructors = creator.candidates(),
            "registered class creator"
        );
        let entry = self.creators.entry(composite.type_name()).or_insert(creator);
        Arc::clone(entry.value())
    }
}
