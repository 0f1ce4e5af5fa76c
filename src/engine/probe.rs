//! Structure inference for untyped values.
//!
//! Both probes only read the context; recursion is bounded by `depth`, which
//! limits how many map levels are explored below the probed path.

use crate::context::Context;
use crate::shape::{ScalarType, Shape};

/// Whether the data under `path` looks like a map: a known key holds a value
/// or a list, or (recursively) holds a map or a list itself.
pub(crate) fn is_map_like(path: &str, context: &Context, depth: usize) -> bool {
    if depth == 0 {
        return false;
    }
    let key = Shape::Scalar(ScalarType::String);
    let value_paths: Vec<String> = context
        .map_keys(path, &key)
        .iter()
        .map(|key| context.map_value_property_name(path, key))
        .collect();

    let holds_data = value_paths.iter().any(|value_path| {
        context.lookup(value_path).is_some()
            || context
                .lookup(&context.element_property_name(value_path, 0))
                .is_some()
    });
    holds_data
        || value_paths.iter().any(|value_path| {
            is_map_like(value_path, context, depth - 1)
                || is_collection_like(value_path, context, depth - 1)
        })
}

/// Whether the data under `path` looks like a list: its first element holds
/// a value or looks like a map.
pub(crate) fn is_collection_like(path: &str, context: &Context, depth: usize) -> bool {
    let first = context.element_property_name(path, 0);
    context.lookup(&first).is_some() || is_map_like(&first, context, depth)
}
