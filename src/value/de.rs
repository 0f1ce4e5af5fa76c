//! Serde support for [`Value`]: it can be deserialized into any
//! `DeserializeOwned` type and can itself be deserialized from any format.

use std::fmt;

use serde::de::value::{MapDeserializer, SeqDeserializer, StrDeserializer, StringDeserializer};
use serde::de::{self, Deserialize, Deserializer, IntoDeserializer, MapAccess, SeqAccess, Visitor};
use serde::forward_to_deserialize_any;
use thiserror::Error;

use super::Value;

/// Error raised when a bound value doesn't fit the requested Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct DeserializeError {
    message: String,
}

impl de::Error for DeserializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self {
            message: msg.to_string(),
        }
    }
}

impl<'de> IntoDeserializer<'de, DeserializeError> for Value {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

impl<'de> Deserializer<'de> for Value {
    type Error = DeserializeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Char(c) => visitor.visit_char(c),
            Value::Int(i) => visitor.visit_i64(i),
            Value::UInt(u) => visitor.visit_u64(u),
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Zone(tz) => visitor.visit_str(tz.name()),
            Value::Enum { member, .. } => visitor.visit_str(member),
            Value::List(items) | Value::Set(items) => visit_seq(items, visitor),
            Value::Map(entries) => visit_map(entries.into_iter(), visitor),
            Value::Record(record) => visit_map(record.into_fields().into_iter(), visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    /// Unit variants only: enum members are bound by name.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            Value::Enum { member, .. } => {
                visitor.visit_enum(StrDeserializer::<DeserializeError>::new(member))
            }
            Value::String(member) => {
                visitor.visit_enum(StringDeserializer::<DeserializeError>::new(member))
            }
            other => Err(de::Error::custom(format!(
                "expected an enum member name, found '{other}'"
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

fn visit_seq<'de, V: Visitor<'de>>(
    items: Vec<Value>,
    visitor: V,
) -> Result<V::Value, DeserializeError> {
    let mut seq = SeqDeserializer::<_, DeserializeError>::new(items.into_iter());
    let value = visitor.visit_seq(&mut seq)?;
    seq.end()?;
    Ok(value)
}

fn visit_map<'de, K, I, V>(entries: I, visitor: V) -> Result<V::Value, DeserializeError>
where
    K: IntoDeserializer<'de, DeserializeError>,
    I: Iterator<Item = (K, Value)>,
    V: Visitor<'de>,
{
    let mut map = MapDeserializer::<_, DeserializeError>::new(entries);
    let value = visitor.visit_map(&mut map)?;
    map.end()?;
    Ok(value)
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any property value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::UInt(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_char<E>(self, v: char) -> Result<Value, E> {
        Ok(Value::Char(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        Ok(Value::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use serde::Deserialize;

    use super::*;
    use crate::value::Record;

    #[derive(Debug, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    enum Key {
        First,
        Second,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Target {
        name: String,
        #[serde(default = "default_port")]
        port: u16,
        tags: Option<Vec<String>>,
        weights: BTreeMap<Key, f32>,
    }

    fn default_port() -> u16 {
        8080
    }

    fn enum_member(member: &'static str) -> Value {
        Value::Enum {
            type_name: "Key",
            member,
        }
    }

    #[test]
    fn test_record_deserializes_with_defaults_and_nulls() {
        let value = Value::Record(
            Record::new("Target", "Target")
                .with_field("name", Value::from("api"))
                .with_field("tags", Value::Null)
                .with_field(
                    "weights",
                    Value::Map(vec![
                        (enum_member("FIRST"), Value::Float(0.5)),
                        (enum_member("SECOND"), Value::Float(1.5)),
                    ]),
                ),
        );

        let target = Target::deserialize(value).unwrap();

        assert_eq!(target.name, "api");
        assert_eq!(target.port, 8080);
        assert_eq!(target.tags, None);
        assert_eq!(target.weights[&Key::Second], 1.5);
    }

    #[test]
    fn test_set_and_integer_keys() {
        let set = HashSet::<u8>::deserialize(Value::Set(vec![Value::UInt(1), Value::UInt(2)])).unwrap();
        let map = BTreeMap::<i32, String>::deserialize(Value::Map(vec![(
            Value::Int(7),
            Value::from("seven"),
        )]))
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(map[&7], "seven");
    }

    #[test]
    fn test_out_of_range_integer_is_reported() {
        let result = u8::deserialize(Value::Int(300));

        assert!(result.is_err());
    }

    #[test]
    fn test_value_deserializes_from_itself() {
        let value = Value::List(vec![Value::from("a"), Value::Map(vec![(Value::from("k"), Value::from(1))])]);

        assert_eq!(Value::deserialize(value.clone()).unwrap(), value);
    }
}
