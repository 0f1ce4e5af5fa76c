//! Success/failure carrier used throughout the engine.

/// Outcome of a processing step that may legitimately fail without aborting
/// the surrounding work.
///
/// A `Failure` is recorded and reported by the caller (e.g. one constructor
/// candidate that didn't match), while hard errors travel through the regular
/// `Result` channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingResult<V, E> {
    Success(V),
    Failure(E),
}

impl<V, E> ProcessingResult<V, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingResult::Success(_))
    }

    pub fn success(self) -> Option<V> {
        match self {
            ProcessingResult::Success(value) => Some(value),
            ProcessingResult::Failure(_) => None,
        }
    }

    pub fn failure(self) -> Option<E> {
        match self {
            ProcessingResult::Success(_) => None,
            ProcessingResult::Failure(error) => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> ProcessingResult<U, E> {
        match self {
            ProcessingResult::Success(value) => ProcessingResult::Success(f(value)),
            ProcessingResult::Failure(error) => ProcessingResult::Failure(error),
        }
    }

    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> ProcessingResult<V, F> {
        match self {
            ProcessingResult::Success(value) => ProcessingResult::Success(value),
            ProcessingResult::Failure(error) => ProcessingResult::Failure(f(error)),
        }
    }
}

impl<V, E> From<Result<V, E>> for ProcessingResult<V, E> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => ProcessingResult::Success(value),
            Err(error) => ProcessingResult::Failure(error),
        }
    }
}
