//! Built-in strategies used by [`ContextBuilder`](super::ContextBuilder)
//! unless replaced.

use std::collections::BTreeSet;

use chrono_tz::Tz;

use crate::shape::{CollectionKind, ScalarType, Shape};
use crate::value::Value;

/// Outcome of a type-converter strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Converted(Value),
    /// The converter doesn't handle this value/target combination.
    Declined,
    /// The converter handles the target but the value is malformed.
    Failed(String),
}

/// A growable collection the engine fills element by element.
pub trait CollectionSink: Send {
    fn push(&mut self, value: Value);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn finish(self: Box<Self>) -> Value;
}

/// A growable map the engine fills entry by entry.
pub trait MapSink: Send {
    fn insert(&mut self, key: Value, value: Value);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn finish(self: Box<Self>) -> Value;
}

#[derive(Debug, Default)]
pub struct ListSink(Vec<Value>);

impl CollectionSink for ListSink {
    fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn finish(self: Box<Self>) -> Value {
        Value::List(self.0)
    }
}

/// Keeps the first occurrence of equal elements, in insertion order.
#[derive(Debug, Default)]
pub struct SetSink(Vec<Value>);

impl CollectionSink for SetSink {
    fn push(&mut self, value: Value) {
        if !self.0.contains(&value) {
            self.0.push(value);
        }
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn finish(self: Box<Self>) -> Value {
        Value::Set(self.0)
    }
}

/// Insertion-ordered map; inserting an existing key replaces its value.
#[derive(Debug, Default)]
pub struct OrderedMap(Vec<(Value, Value)>);

impl MapSink for OrderedMap {
    fn insert(&mut self, key: Value, value: Value) {
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn finish(self: Box<Self>) -> Value {
        Value::Map(self.0)
    }
}

pub(crate) fn collection_types() -> BTreeSet<String> {
    [CollectionKind::List, CollectionKind::Set]
        .iter()
        .map(|kind| kind.name().to_string())
        .collect()
}

pub(crate) fn scalar_types() -> BTreeSet<String> {
    ScalarType::ALL
        .iter()
        .map(|scalar| scalar.name().to_string())
        .collect()
}

pub(crate) fn create_collection(kind: &CollectionKind) -> Option<Box<dyn CollectionSink>> {
    match kind {
        CollectionKind::List => Some(Box::new(ListSink::default())),
        CollectionKind::Set => Some(Box::new(SetSink::default())),
        CollectionKind::Named(_) => None,
    }
}

pub(crate) fn create_map() -> Box<dyn MapSink> {
    Box::new(OrderedMap::default())
}

pub(crate) fn regular_property_name(base: &str, property: &str) -> String {
    if base.trim().is_empty() {
        property.to_string()
    } else {
        format!("{base}.{property}")
    }
}

pub(crate) fn element_property_name(base: &str, index: usize) -> String {
    format!("{base}[{index}]")
}

/// Enum keys enumerate every member; other key shapes have no known keys.
pub(crate) fn map_keys(_path: &str, key: &Shape) -> BTreeSet<String> {
    match key {
        Shape::Enum(enumeration) => enumeration
            .members()
            .iter()
            .map(|member| member.to_string())
            .collect(),
        _ => BTreeSet::new(),
    }
}

/// The built-in conversion table.
pub(crate) fn convert(raw: &Value, target: &Shape) -> Conversion {
    if raw.conforms_to(target) {
        return Conversion::Converted(raw.clone());
    }
    let Some(text) = raw.as_text() else {
        return Conversion::Declined;
    };
    match target {
        Shape::Scalar(scalar) => convert_scalar(&text, *scalar),
        Shape::Enum(enumeration) => match enumeration.member(&text) {
            Some(member) => Conversion::Converted(Value::Enum {
                type_name: enumeration.type_name(),
                member,
            }),
            None => Conversion::Failed(format!(
                "no member of {} is named '{text}', known names: {:?}",
                enumeration.name(),
                enumeration.members()
            )),
        },
        _ => Conversion::Declined,
    }
}

fn convert_scalar(text: &str, scalar: ScalarType) -> Conversion {
    let trimmed = text.trim();
    let converted = match scalar {
        ScalarType::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err("expected 'true' or 'false'".to_string())
            }
        }
        ScalarType::Char => {
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(format!("expected a single character, got {}", trimmed.chars().count())),
            }
        }
        ScalarType::I8 => parse_signed::<i8>(trimmed),
        ScalarType::I16 => parse_signed::<i16>(trimmed),
        ScalarType::I32 => parse_signed::<i32>(trimmed),
        ScalarType::I64 => parse_signed::<i64>(trimmed),
        ScalarType::U8 => parse_unsigned::<u8>(trimmed),
        ScalarType::U16 => parse_unsigned::<u16>(trimmed),
        ScalarType::U32 => parse_unsigned::<u32>(trimmed),
        ScalarType::U64 => parse_unsigned::<u64>(trimmed),
        ScalarType::F32 => trimmed
            .parse::<f32>()
            .map(|f| Value::Float(f64::from(f)))
            .map_err(|e| e.to_string()),
        ScalarType::F64 => trimmed
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| e.to_string()),
        ScalarType::String => Ok(Value::String(text.to_string())),
        ScalarType::ZoneId => trimmed
            .parse::<Tz>()
            .map(Value::Zone)
            .map_err(|e| e.to_string()),
    };
    match converted {
        Ok(value) => Conversion::Converted(value),
        Err(reason) => Conversion::Failed(reason),
    }
}

fn parse_signed<T>(text: &str) -> Result<Value, String>
where
    T: std::str::FromStr + Into<i64>,
    T::Err: std::fmt::Display,
{
    text.parse::<T>()
        .map(|v| Value::Int(v.into()))
        .map_err(|e| e.to_string())
}

fn parse_unsigned<T>(text: &str) -> Result<Value, String>
where
    T: std::str::FromStr + Into<u64>,
    T::Err: std::fmt::Display,
{
    text.parse::<T>()
        .map(|v| Value::UInt(v.into()))
        .map_err(|e| e.to_string())
}
