use std::fmt;

use tracing::debug;

use crate::context::{Context, Scope};
use crate::descriptor::{Constructor, Parameter};
use crate::error::BindError;
use crate::result::ProcessingResult;
use crate::shape::Shape;
use crate::value::{Record, Value};

use super::retriever::ParameterValueRetriever;
use super::{Binder, Resolution};

/// One constructor of a composite type together with the retrievers of its
/// parameters.
#[derive(Debug)]
pub(crate) struct Instantiator {
    type_name: &'static str,
    constructor: Constructor,
    retrievers: Vec<ParameterValueRetriever>,
    has_mandatory_parameter: bool,
    invalid: Option<BindError>,
}

impl Instantiator {
    pub(crate) fn new(type_name: &'static str, constructor: &Constructor) -> Self {
        let unnamed: Vec<usize> = constructor
            .parameters()
            .iter()
            .filter(|parameter| parameter.name().is_none())
            .map(Parameter::index)
            .collect();
        let invalid = (!unnamed.is_empty()).then(|| BindError::UnnamedParameter {
            constructor: constructor.to_string(),
            positions: unnamed,
        });

        Self {
            type_name,
            constructor: constructor.clone(),
            retrievers: constructor
                .parameters()
                .iter()
                .cloned()
                .map(ParameterValueRetriever::new)
                .collect(),
            has_mandatory_parameter: constructor.parameters().iter().any(Parameter::is_required),
            invalid,
        }
    }

    /// Resolves every parameter and builds the record.
    ///
    /// All parameter failures are collected so the caller can report them
    /// together.
    pub(crate) fn instantiate(
        &self,
        binder: &Binder,
        prefix: &str,
        context: &Context,
        scope: Scope,
    ) -> Result<ProcessingResult<Record, Vec<BindError>>, BindError> {
        if let Some(invalid) = &self.invalid {
            return Ok(ProcessingResult::Failure(vec![invalid.clone()]));
        }

        let scope = scope.with_mandatory_parameter(self.has_mandatory_parameter);
        let mut record = Record::new(self.type_name, self.constructor.name());
        let mut failures = Vec::new();
        for retriever in &self.retrievers {
            match self.resolve(retriever, binder, prefix, context, scope)? {
                ProcessingResult::Success(resolution) => {
                    let Some(name) = retriever.parameter().name() else {
                        continue;
                    };
                    match resolution {
                        Resolution::Value(value) => record.insert(name, value),
                        Resolution::Null => record.insert(name, Value::Null),
                        Resolution::Default => {}
                    }
                }
                ProcessingResult::Failure(error) => failures.push(error),
            }
        }

        if !failures.is_empty() {
            return Ok(ProcessingResult::Failure(failures));
        }
        match self.constructor.run_check(&record) {
            Ok(()) => Ok(ProcessingResult::Success(record)),
            Err(message) => Ok(ProcessingResult::Failure(vec![BindError::Rejected {
                constructor: self.to_string(),
                message,
            }])),
        }
    }

    fn resolve(
        &self,
        retriever: &ParameterValueRetriever,
        binder: &Binder,
        prefix: &str,
        context: &Context,
        scope: Scope,
    ) -> Result<ProcessingResult<Resolution, BindError>, BindError> {
        let parameter = retriever.parameter();
        let retrieved = match retriever.retrieve(binder, prefix, context, scope)? {
            ProcessingResult::Failure(error)
                if error.is_conversion() && is_leaf(parameter.shape(), context) =>
            {
                if parameter.is_required() {
                    ProcessingResult::Failure(error)
                } else {
                    debug!(constructor = %self, %error, "ignoring malformed value");
                    if parameter.is_nullable() {
                        ProcessingResult::Success(Resolution::Null)
                    } else {
                        ProcessingResult::Success(Resolution::Default)
                    }
                }
            }
            ProcessingResult::Failure(error)
                if scope.tolerates_empty_collection() && !error.is_conversion() =>
            {
                if parameter.is_nullable() {
                    ProcessingResult::Success(Resolution::Null)
                } else if parameter.is_optional() {
                    ProcessingResult::Success(Resolution::Default)
                } else {
                    ProcessingResult::Failure(error)
                }
            }
            other => other,
        };
        Ok(self.reject_empty_container(retrieved, retriever, prefix, context, scope))
    }

    /// Inside collection elements an empty container parameter means the
    /// element has no data, unless the constructor has a mandatory parameter
    /// and this one may legitimately be left out.
    fn reject_empty_container(
        &self,
        retrieved: ProcessingResult<Resolution, BindError>,
        retriever: &ParameterValueRetriever,
        prefix: &str,
        context: &Context,
        scope: Scope,
    ) -> ProcessingResult<Resolution, BindError> {
        let parameter = retriever.parameter();
        if scope.tolerates_empty_collection()
            || !(context.is_collection(parameter.shape()) || context.is_map(parameter.shape()))
        {
            return retrieved;
        }
        let empty = match &retrieved {
            ProcessingResult::Success(Resolution::Value(value)) => value.is_empty_container(),
            ProcessingResult::Success(_) => true,
            ProcessingResult::Failure(_) => false,
        };
        if !empty || (scope.has_mandatory_parameter() && !parameter.is_required()) {
            return retrieved;
        }
        ProcessingResult::Failure(BindError::MissingValue {
            path: retriever
                .path(prefix, context)
                .unwrap_or_else(|| prefix.to_string()),
        })
    }
}

/// Scalars and enums: values read from a single property.
fn is_leaf(shape: &Shape, context: &Context) -> bool {
    matches!(shape, Shape::Enum(_)) || context.is_scalar(shape)
}

impl fmt::Display for Instantiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.constructor, f)
    }
}
