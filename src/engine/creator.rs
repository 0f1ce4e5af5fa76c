use tracing::debug;

use crate::context::{Context, Scope};
use crate::error::{BindError, CandidateFailure};
use crate::result::ProcessingResult;
use crate::shape::CompositeRef;
use crate::value::Value;

use super::instantiator::Instantiator;
use super::Binder;

/// Creates instances of one composite type by trying its constructors in
/// declaration order.
#[derive(Debug)]
pub(crate) struct ClassCreator {
    type_name: &'static str,
    instantiators: Vec<Instantiator>,
}

impl ClassCreator {
    pub(crate) fn new(composite: &CompositeRef) -> Self {
        let descriptor = composite.describe();
        let instantiators = descriptor
            .constructors()
            .iter()
            .map(|constructor| Instantiator::new(composite.name(), constructor))
            .collect();
        Self {
            type_name: composite.name(),
            instantiators,
        }
    }

    pub(crate) fn candidates(&self) -> usize {
        self.instantiators.len()
    }

    /// Returns the record built by the first constructor that succeeds.
    ///
    /// Failures of the other constructors are only reported when none of
    /// them succeeds.
    pub(crate) fn create(
        &self,
        binder: &Binder,
        prefix: &str,
        context: &Context,
        scope: Scope,
    ) -> Result<Value, BindError> {
        let mut failures = Vec::new();
        for instantiator in &self.instantiators {
            match instantiator.instantiate(binder, prefix, context, scope)? {
                ProcessingResult::Success(record) => {
                    debug!(
                        type_name = self.type_name,
                        prefix,
                        constructor = %instantiator,
                        "instantiated"
                    );
                    return Ok(Value::Record(record));
                }
                ProcessingResult::Failure(reasons) => {
                    debug!(
                        type_name = self.type_name,
                        prefix,
                        constructor = %instantiator,
                        reasons = reasons.len(),
                        "constructor can't be used"
                    );
                    failures.push(CandidateFailure {
                        constructor: instantiator.to_string(),
                        reasons,
                    });
                }
            }
        }
        Err(BindError::NoViableConstructor {
            type_name: self.type_name.to_string(),
            prefix: prefix.to_string(),
            failures,
        })
    }
}
