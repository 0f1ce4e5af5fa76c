//! Map keys derived from the set of all property keys of a source.

use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub(crate) struct MapKeyIndex {
    keys: BTreeSet<String>,
}

impl MapKeyIndex {
    pub(crate) fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keys
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(move |key| key.starts_with(prefix))
            .map(String::as_str)
    }

    /// Keys of the map stored under `base`.
    pub(crate) fn keys_under(&self, base: &str) -> BTreeSet<String> {
        if base.trim().is_empty() {
            return self
                .keys
                .iter()
                .filter_map(|key| leading_segment(key))
                .map(str::to_string)
                .collect();
        }

        let dotted = format!("{base}.");
        let bracketed = format!("{base}[");
        let mut found: BTreeSet<String> = self
            .with_prefix(&dotted)
            .filter_map(|key| leading_segment(&key[dotted.len()..]))
            .map(str::to_string)
            .collect();
        found.extend(
            self.with_prefix(&bracketed)
                .filter_map(|key| bracketed_segment(&key[bracketed.len()..]))
                .map(str::to_string),
        );
        found
    }

    /// Property name of the value stored under `key` in the map at `base`.
    pub(crate) fn value_name(&self, base: &str, key: &str) -> String {
        if base.trim().is_empty() {
            return key.to_string();
        }
        let escaped = format!("{base}[{key}]");
        if self.with_prefix(&escaped).next().is_some() {
            escaped
        } else {
            format!("{base}.{key}")
        }
    }
}

/// Text up to the first `.` or `[`, if not empty.
fn leading_segment(rest: &str) -> Option<&str> {
    let end = rest.find(['.', '[']).unwrap_or(rest.len());
    Some(&rest[..end]).filter(|segment| !segment.is_empty())
}

/// Text up to the closing `]`, unless it is a collection index.
fn bracketed_segment(rest: &str) -> Option<&str> {
    let segment = &rest[..rest.find(']')?];
    if segment.is_empty() || segment.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(segment)
    }
}
