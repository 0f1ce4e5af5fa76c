use std::fmt;

use thiserror::Error;

use crate::source::SourceError;
use crate::value::DeserializeError;

/// Top-level error type for the dragon-bind library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("binding error: {0}")]
    Bind(#[from] BindError),

    #[error("property source error: {0}")]
    Source(#[from] SourceError),

    #[error("failed to deserialize bound value: {0}")]
    Deserialize(#[from] DeserializeError),
}

/// Errors produced while instantiating a value from a property source.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum BindError {
    #[error("no value for mandatory property '{path}'")]
    MissingValue { path: String },

    #[error("can't convert value '{value}' to type '{target}': {reason}")]
    Conversion {
        value: String,
        target: String,
        reason: String,
    },

    #[error("expected {expected} data under property '{path}' but found a simple value '{found}' instead")]
    StructuralMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error(
        "failed instantiating {type_name} for path '{prefix}', none of its constructors match:{}",
        render_failures(.failures)
    )]
    NoViableConstructor {
        type_name: String,
        prefix: String,
        failures: Vec<CandidateFailure>,
    },

    #[error("constructor {constructor} can't be used, parameters at positions {positions:?} have no name")]
    UnnamedParameter {
        constructor: String,
        positions: Vec<usize>,
    },

    #[error("type '{name}' is not supported by the binding context")]
    UnsupportedType { name: String },

    #[error("constructor {constructor} rejected its arguments: {message}")]
    Rejected { constructor: String, message: String },
}

impl BindError {
    /// Structural mismatches indicate a schema error rather than absent data
    /// and are never recovered from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BindError::StructuralMismatch { .. })
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, BindError::Conversion { .. })
    }
}

/// One constructor that could not be used, with every reason it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFailure {
    pub constructor: String,
    pub reasons: Vec<BindError>,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - ", self.constructor)?;
        for (i, reason) in self.reasons.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{reason}")?;
        }
        Ok(())
    }
}

fn render_failures(failures: &[CandidateFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("\n  {failure}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_report_lists_every_candidate() {
        let error = BindError::NoViableConstructor {
            type_name: "Server".into(),
            prefix: "app".into(),
            failures: vec![
                CandidateFailure {
                    constructor: "Server(host, port)".into(),
                    reasons: vec![BindError::MissingValue {
                        path: "app.host".into(),
                    }],
                },
                CandidateFailure {
                    constructor: "Server(url)".into(),
                    reasons: vec![
                        BindError::MissingValue {
                            path: "app.url".into(),
                        },
                        BindError::UnsupportedType {
                            name: "Socket".into(),
                        },
                    ],
                },
            ],
        };

        let message = error.to_string();
        assert!(message.contains("\n  Server(host, port) - no value for mandatory property 'app.host'"));
        assert!(message.contains("\n  Server(url) - no value for mandatory property 'app.url'; type 'Socket'"));
    }

    #[test]
    fn test_only_structural_mismatch_is_fatal() {
        let mismatch = BindError::StructuralMismatch {
            path: "data".into(),
            expected: "List<i32>".into(),
            found: "2".into(),
        };
        let missing = BindError::MissingValue { path: "data".into() };

        assert!(mismatch.is_fatal());
        assert!(!missing.is_fatal());
        assert!(!missing.is_conversion());
    }
}
