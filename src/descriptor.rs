//! Explicit schema of composite types.
//!
//! A [`TypeDescriptor`] lists the ways a composite can be constructed. Each
//! [`Constructor`] is an ordered list of [`Parameter`]s; the engine tries the
//! constructors in declaration order and uses the first one whose mandatory
//! parameters can all be resolved.

use std::fmt;
use std::sync::Arc;

use crate::shape::{Bindable, Shape};
use crate::value::Record;

type Check = Arc<dyn Fn(&Record) -> Result<(), String> + Send + Sync>;

/// Schema of one composite type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    constructors: Vec<Constructor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructors: Vec::new(),
        }
    }

    /// Adds a construction variant. Variants are tried in registration order.
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }
}

/// One way of constructing a composite.
#[derive(Clone)]
pub struct Constructor {
    name: String,
    parameters: Vec<Parameter>,
    check: Option<Check>,
}

impl Constructor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            check: None,
        }
    }

    /// Adds a named parameter without a default.
    ///
    /// The parameter is mandatory unless `T` is nullable (an `Option`).
    pub fn field<T: Bindable>(self, name: impl Into<String>) -> Self {
        self.parameter(Parameter::named(name, T::shape()).nullable(T::nullable()))
    }

    /// Adds a named parameter that has a default value.
    ///
    /// When no data is found the parameter is left out of the record, so the
    /// target type must supply the default (e.g. `#[serde(default)]`).
    pub fn optional<T: Bindable>(self, name: impl Into<String>) -> Self {
        self.parameter(
            Parameter::named(name, T::shape())
                .nullable(T::nullable())
                .optional(true),
        )
    }

    /// Adds a parameter that has no stable name.
    ///
    /// A constructor with such a parameter can never be used.
    pub fn positional<T: Bindable>(self) -> Self {
        self.parameter(Parameter::unnamed(T::shape()).nullable(T::nullable()))
    }

    pub fn parameter(mut self, mut parameter: Parameter) -> Self {
        parameter.index = self.parameters.len();
        self.parameters.push(parameter);
        self
    }

    /// Validates the resolved arguments before the record is produced.
    ///
    /// A rejection fails this constructor and the engine moves on to the next
    /// one.
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Record) -> Result<(), String> + Send + Sync + 'static,
    {
        self.check = Some(Arc::new(check));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn run_check(&self, record: &Record) -> Result<(), String> {
        match &self.check {
            Some(check) => check(record),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("check", &self.check.is_some())
            .finish()
    }
}

/// Renders the constructor signature, e.g. `Server(host, port)`.
impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &parameter.name {
                Some(name) => f.write_str(name)?,
                None => write!(f, "#{}", parameter.index)?,
            }
        }
        f.write_str(")")
    }
}

/// A declared constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    index: usize,
    name: Option<String>,
    shape: Shape,
    nullable: bool,
    optional: bool,
}

impl Parameter {
    pub fn named(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            index: 0,
            name: Some(name.into()),
            shape,
            nullable: false,
            optional: false,
        }
    }

    pub fn unnamed(shape: Shape) -> Self {
        Self {
            index: 0,
            name: None,
            shape,
            nullable: false,
            optional: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Neither optional nor nullable: the constructor can't run without it.
    pub fn is_required(&self) -> bool {
        !self.optional && !self.nullable
    }
}
