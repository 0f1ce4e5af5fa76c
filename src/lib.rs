pub mod context;
pub mod descriptor;
mod engine;
mod error;
pub mod result;
pub mod shape;
pub mod source;
pub mod value;

pub use context::{
    CollectionSink, Context, ContextBuilder, Conversion, Dispatch, ListSink, MapSink, OrderedMap,
    Scope, SetSink,
};
pub use descriptor::{Constructor, Parameter, TypeDescriptor};
pub use engine::Binder;
pub use error::{BindError, CandidateFailure, Error};
pub use result::ProcessingResult;
pub use shape::{Bindable, CollectionKind, CompositeRef, EnumRef, ScalarType, Shape};
pub use source::{Properties, PropertySource, SourceError};
pub use value::{DeserializeError, Record, Value};
