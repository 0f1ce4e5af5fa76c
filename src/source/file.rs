//! TOML-backed properties.

use super::Properties;
use crate::value::Value;

/// Flattens a parsed TOML document into property keys.
pub(super) fn flatten(table: toml::Table) -> Properties {
    let mut properties = Properties::new();
    flatten_table(&mut properties, "", table);
    properties
}

fn flatten_table(properties: &mut Properties, base: &str, table: toml::Table) {
    for (key, value) in table {
        let path = if base.is_empty() {
            key
        } else if key.contains('.') {
            format!("{base}[{key}]")
        } else {
            format!("{base}.{key}")
        };
        flatten_value(properties, path, value);
    }
}

fn flatten_value(properties: &mut Properties, path: String, value: toml::Value) {
    match value {
        toml::Value::Table(table) => flatten_table(properties, &path, table),
        toml::Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                flatten_value(properties, format!("{path}[{index}]"), item);
            }
        }
        toml::Value::String(s) => properties.insert(path, Value::String(s)),
        toml::Value::Integer(i) => properties.insert(path, Value::Int(i)),
        toml::Value::Float(f) => properties.insert(path, Value::Float(f)),
        toml::Value::Boolean(b) => properties.insert(path, Value::Bool(b)),
        toml::Value::Datetime(dt) => properties.insert(path, Value::String(dt.to_string())),
    }
}
