//! Per-parameter value retrieval.

use tracing::trace;

use crate::context::{Context, Dispatch, Scope};
use crate::descriptor::Parameter;
use crate::error::BindError;
use crate::result::ProcessingResult;
use crate::shape::{CollectionKind, ScalarType, Shape};
use crate::value::Value;

use super::probe;
use super::{Binder, Resolution, Retrieval};

/// How the absence of data is resolved for the value being retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Field {
    pub(crate) nullable: bool,
    pub(crate) optional: bool,
}

impl Field {
    const REQUIRED: Field = Field {
        nullable: false,
        optional: false,
    };

    /// Collection elements: a missing element ends the collection.
    const ELEMENT: Field = Field {
        nullable: false,
        optional: true,
    };

    /// Null first, then default.
    fn absent(self, path: &str) -> ProcessingResult<Resolution, BindError> {
        if self.nullable {
            ProcessingResult::Success(Resolution::Null)
        } else if self.optional {
            ProcessingResult::Success(Resolution::Default)
        } else {
            missing(path)
        }
    }

    /// Default first, then null.
    fn absent_defaulted(self, path: &str) -> ProcessingResult<Resolution, BindError> {
        if self.optional {
            ProcessingResult::Success(Resolution::Default)
        } else if self.nullable {
            ProcessingResult::Success(Resolution::Null)
        } else {
            missing(path)
        }
    }
}

fn missing(path: &str) -> ProcessingResult<Resolution, BindError> {
    ProcessingResult::Failure(BindError::MissingValue {
        path: path.to_string(),
    })
}

/// Retrieves the value of one constructor parameter.
#[derive(Debug, Clone)]
pub(crate) struct ParameterValueRetriever {
    parameter: Parameter,
}

impl ParameterValueRetriever {
    pub(crate) fn new(parameter: Parameter) -> Self {
        Self { parameter }
    }

    pub(crate) fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// Property name of the parameter under `prefix`, `None` for unnamed
    /// parameters.
    pub(crate) fn path(&self, prefix: &str, context: &Context) -> Option<String> {
        let name = self.parameter.name()?;
        Some(context.regular_property_name(prefix, name))
    }

    pub(crate) fn retrieve(
        &self,
        binder: &Binder,
        prefix: &str,
        context: &Context,
        scope: Scope,
    ) -> Retrieval {
        let Some(path) = self.path(prefix, context) else {
            return Ok(ProcessingResult::Failure(BindError::UnnamedParameter {
                constructor: prefix.to_string(),
                positions: vec![self.parameter.index()],
            }));
        };
        let field = Field {
            nullable: self.parameter.is_nullable(),
            optional: self.parameter.is_optional(),
        };
        Resolver::new(binder, context).retrieve(&path, self.parameter.shape(), field, scope)
    }
}

/// Walks the property space for one value of a given shape.
pub(crate) struct Resolver<'a> {
    binder: &'a Binder,
    context: &'a Context,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(binder: &'a Binder, context: &'a Context) -> Self {
        Self { binder, context }
    }

    pub(crate) fn retrieve(&self, path: &str, shape: &Shape, field: Field, scope: Scope) -> Retrieval {
        match self.context.classify(shape) {
            Dispatch::Any => self.retrieve_any(path, field, scope),
            Dispatch::Scalar => Ok(self.retrieve_scalar(path, shape, field)),
            Dispatch::Collection { kind, element } => {
                self.ensure_not_scalar(path, shape)?;
                self.retrieve_collection(path, kind, element, field, scope)
            }
            Dispatch::Map { key, value } => {
                self.ensure_not_scalar(path, shape)?;
                self.retrieve_map(path, key, value, field, scope)
            }
            Dispatch::Nested => {
                if let Shape::Composite(_) = shape {
                    self.ensure_not_scalar(path, shape)?;
                }
                self.retrieve_nested(path, shape, field, scope)
            }
            Dispatch::Unsupported => Ok(ProcessingResult::Failure(BindError::UnsupportedType {
                name: shape.name(),
            })),
        }
    }

    /// Collections, maps and composites are spread over several keys; a value
    /// stored at their own path means the data doesn't fit the declared type.
    fn ensure_not_scalar(&self, path: &str, shape: &Shape) -> Result<(), BindError> {
        match self.context.lookup(path) {
            Some(found) => Err(BindError::StructuralMismatch {
                path: path.to_string(),
                expected: shape.name(),
                found: found.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Untyped values are maps if they look like maps, lists if they look
    /// like lists and plain values otherwise.
    fn retrieve_any(&self, path: &str, field: Field, scope: Scope) -> Retrieval {
        let depth = self.context.probe_depth();
        if probe::is_map_like(path, self.context, depth) {
            trace!(path, "inferred map shape");
            let key = Shape::Scalar(ScalarType::String);
            return self.retrieve_map(path, &key, &Shape::Any, Field::REQUIRED, scope);
        }
        if probe::is_collection_like(path, self.context, depth) {
            trace!(path, "inferred collection shape");
            return self.retrieve_collection(
                path,
                &CollectionKind::List,
                &Shape::Any,
                Field::REQUIRED,
                scope,
            );
        }
        Ok(self.retrieve_scalar(path, &Shape::Any, field))
    }

    fn retrieve_scalar(
        &self,
        path: &str,
        shape: &Shape,
        field: Field,
    ) -> ProcessingResult<Resolution, BindError> {
        match self.context.lookup(path) {
            Some(raw) => self.context.convert(&raw, shape).map(Resolution::Value).into(),
            None => field.absent(path),
        }
    }

    /// Reads elements at consecutive indices until one yields no data.
    fn retrieve_collection(
        &self,
        path: &str,
        kind: &CollectionKind,
        element: &Shape,
        field: Field,
        scope: Scope,
    ) -> Retrieval {
        let mut sink = match self.context.create_collection(kind) {
            Ok(sink) => sink,
            Err(error) => return Ok(ProcessingResult::Failure(error)),
        };
        let element_scope = scope.with_tolerate_empty_collection(false);
        for index in 0.. {
            let element_path = self.context.element_property_name(path, index);
            match self.retrieve(&element_path, element, Field::ELEMENT, element_scope)? {
                ProcessingResult::Success(Resolution::Value(value)) if carries_data(&value) => {
                    sink.push(value);
                }
                ProcessingResult::Failure(error) if error.is_conversion() => {
                    return Ok(ProcessingResult::Failure(error));
                }
                _ => break,
            }
        }

        if sink.is_empty() {
            let first = self.context.element_property_name(path, 0);
            Ok(field.absent(&first))
        } else {
            trace!(path, elements = sink.len(), "collected elements");
            Ok(ProcessingResult::Success(Resolution::Value(sink.finish())))
        }
    }

    /// Reads the value of every key the context knows for this map.
    fn retrieve_map(
        &self,
        path: &str,
        key_shape: &Shape,
        value_shape: &Shape,
        field: Field,
        scope: Scope,
    ) -> Retrieval {
        let mut sink = self.context.create_map();
        for key in self.context.map_keys(path, key_shape) {
            let value_path = self.context.map_value_property_name(path, &key);
            let value = match self.retrieve(&value_path, value_shape, Field::REQUIRED, scope)? {
                ProcessingResult::Success(Resolution::Value(value)) if !value.is_null() => value,
                ProcessingResult::Success(_) => continue,
                ProcessingResult::Failure(error) => {
                    trace!(path = %value_path, %error, "skipping map entry");
                    continue;
                }
            };
            match self.context.convert(&Value::String(key), key_shape) {
                Ok(key) => sink.insert(key, value),
                Err(error) => trace!(path = %value_path, %error, "skipping map key"),
            }
        }

        if sink.is_empty() {
            Ok(field.absent_defaulted(path))
        } else {
            Ok(ProcessingResult::Success(Resolution::Value(sink.finish())))
        }
    }

    fn retrieve_nested(&self, path: &str, shape: &Shape, field: Field, scope: Scope) -> Retrieval {
        match self.binder.instantiate(path, shape, false, self.context, scope) {
            Ok(value) => Ok(ProcessingResult::Success(Resolution::Value(value))),
            Err(error) if error.is_fatal() => Err(error),
            Err(error) if error.is_conversion() => Ok(ProcessingResult::Failure(error)),
            Err(error) => {
                trace!(path, %error, "nested value not available");
                Ok(field.absent_defaulted(path).map_failure(|_| error))
            }
        }
    }
}

/// Whether a bound element holds any property data at all.
fn carries_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::List(items) | Value::Set(items) => items.iter().any(carries_data),
        Value::Map(entries) => entries.iter().any(|(_, value)| carries_data(value)),
        Value::Record(record) => record.fields().iter().any(|(_, value)| carries_data(value)),
        _ => true,
    }
}
