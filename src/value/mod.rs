//! Dynamic values read from property sources and built by the engine.

mod de;

use std::fmt;

use chrono_tz::Tz;

use crate::shape::{ScalarType, Shape};

pub use de::DeserializeError;

/// A raw property value or a bound value tree.
///
/// Property sources hand out scalar values; the engine assembles lists, sets,
/// maps and records out of them. Typed results are obtained by deserializing
/// the tree (`Value` implements [`serde::Deserializer`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Zone(Tz),
    Enum {
        type_name: &'static str,
        member: &'static str,
    },
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Record(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Textual form of a scalar value, `None` for containers and null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Char(c) => Some(c.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::UInt(u) => Some(u.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Zone(tz) => Some(tz.name().to_string()),
            Value::Enum { member, .. } => Some((*member).to_string()),
            Value::Null
            | Value::List(_)
            | Value::Set(_)
            | Value::Map(_)
            | Value::Record(_) => None,
        }
    }

    /// A list, set or map without elements.
    pub fn is_empty_container(&self) -> bool {
        match self {
            Value::List(items) | Value::Set(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            _ => false,
        }
    }

    /// Whether the value is already an instance of the given shape.
    ///
    /// Containers and records are checked by kind only, not element-wise.
    pub fn conforms_to(&self, shape: &Shape) -> bool {
        match (shape, self) {
            (Shape::Any, _) => true,
            (Shape::Scalar(scalar), value) => conforms_to_scalar(value, *scalar),
            (Shape::Enum(enumeration), Value::Enum { type_name, .. }) => {
                *type_name == enumeration.type_name()
            }
            (Shape::Collection(..), Value::List(_) | Value::Set(_)) => true,
            (Shape::Map(..), Value::Map(_)) => true,
            (Shape::Composite(composite), Value::Record(record)) => {
                record.type_name() == composite.name()
            }
            _ => false,
        }
    }
}

fn conforms_to_scalar(value: &Value, scalar: ScalarType) -> bool {
    match (scalar, value) {
        (ScalarType::Bool, Value::Bool(_)) => true,
        (ScalarType::Char, Value::Char(_)) => true,
        (ScalarType::I8, Value::Int(i)) => i8::try_from(*i).is_ok(),
        (ScalarType::I16, Value::Int(i)) => i16::try_from(*i).is_ok(),
        (ScalarType::I32, Value::Int(i)) => i32::try_from(*i).is_ok(),
        (ScalarType::I64, Value::Int(_)) => true,
        (ScalarType::U8, Value::UInt(u)) => u8::try_from(*u).is_ok(),
        (ScalarType::U16, Value::UInt(u)) => u16::try_from(*u).is_ok(),
        (ScalarType::U32, Value::UInt(u)) => u32::try_from(*u).is_ok(),
        (ScalarType::U64, Value::UInt(_)) => true,
        (ScalarType::F32 | ScalarType::F64, Value::Float(_)) => true,
        (ScalarType::String, Value::String(_)) => true,
        (ScalarType::ZoneId, Value::Zone(_)) => true,
        _ => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::List(items) | Value::Set(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
            Value::Record(record) => write!(f, "{record}"),
            scalar => match scalar.as_text() {
                Some(text) => f.write_str(&text),
                None => Ok(()),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// Arguments a constructor was invoked with.
///
/// Parameters that fell back to their default are absent; parameters bound to
/// an explicit null are present as [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    constructor: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(type_name: impl Into<String>, constructor: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            constructor: constructor.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn constructor(&self) -> &str {
        &self.constructor
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub(crate) fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}
