//! Static shape classification of bindable types.
//!
//! Every type the engine can produce declares its [`Shape`] through the
//! [`Bindable`] trait. The shape is a closed classification computed once per
//! declared field, so the engine dispatches on it with plain pattern matching
//! instead of inspecting values at runtime.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::BuildHasher;

use crate::descriptor::TypeDescriptor;
use crate::value::Value;

/// Leaf types converted directly from a single raw property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    ZoneId,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Char => "char",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::String => "String",
            ScalarType::ZoneId => "ZoneId",
        }
    }

    pub const ALL: [ScalarType; 14] = [
        ScalarType::Bool,
        ScalarType::Char,
        ScalarType::I8,
        ScalarType::I16,
        ScalarType::I32,
        ScalarType::I64,
        ScalarType::U8,
        ScalarType::U16,
        ScalarType::U32,
        ScalarType::U64,
        ScalarType::F32,
        ScalarType::F64,
        ScalarType::String,
        ScalarType::ZoneId,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Set,
    /// A collection the context learns to build through
    /// [`ContextBuilder::with_collection_creator`](crate::ContextBuilder::with_collection_creator).
    Named(&'static str),
}

impl CollectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            CollectionKind::List => "List",
            CollectionKind::Set => "Set",
            CollectionKind::Named(name) => name,
        }
    }
}

/// Reference to an enum type: its name and the names of its members.
#[derive(Debug, Clone, Copy)]
pub struct EnumRef {
    type_name: &'static str,
    members: &'static [&'static str],
}

impl EnumRef {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> &'static str {
        short_type_name(self.type_name)
    }

    pub fn members(&self) -> &'static [&'static str] {
        self.members
    }

    /// Exact, case-sensitive member lookup.
    pub fn member(&self, name: &str) -> Option<&'static str> {
        self.members.iter().copied().find(|member| *member == name)
    }
}

impl PartialEq for EnumRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

/// Reference to a composite type whose descriptor is built on demand.
///
/// Descriptors are produced lazily so that recursive types (a node holding a
/// list of nodes) don't recurse while their shape is being declared.
#[derive(Debug, Clone, Copy)]
pub struct CompositeRef {
    type_name: &'static str,
    describe: fn() -> TypeDescriptor,
}

impl CompositeRef {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> &'static str {
        short_type_name(self.type_name)
    }

    pub fn describe(&self) -> TypeDescriptor {
        (self.describe)()
    }
}

impl PartialEq for CompositeRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

/// Declared shape of a bindable type.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Untyped value; its shape is inferred from the property source.
    Any,
    Scalar(ScalarType),
    Enum(EnumRef),
    Collection(CollectionKind, Box<Shape>),
    Map(Box<Shape>, Box<Shape>),
    Composite(CompositeRef),
}

impl Shape {
    pub fn of<T: Bindable + ?Sized>() -> Shape {
        T::shape()
    }

    pub fn composite<T: ?Sized>(describe: fn() -> TypeDescriptor) -> Shape {
        Shape::Composite(CompositeRef {
            type_name: std::any::type_name::<T>(),
            describe,
        })
    }

    pub fn enumeration<T: ?Sized>(members: &'static [&'static str]) -> Shape {
        Shape::Enum(EnumRef {
            type_name: std::any::type_name::<T>(),
            members,
        })
    }

    pub fn list(element: Shape) -> Shape {
        Shape::Collection(CollectionKind::List, Box::new(element))
    }

    pub fn set(element: Shape) -> Shape {
        Shape::Collection(CollectionKind::Set, Box::new(element))
    }

    pub fn map(key: Shape, value: Shape) -> Shape {
        Shape::Map(Box::new(key), Box::new(value))
    }

    /// Name used for classification lookups and diagnostics.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Any => f.write_str("Any"),
            Shape::Scalar(scalar) => f.write_str(scalar.name()),
            Shape::Enum(enumeration) => f.write_str(enumeration.name()),
            Shape::Collection(kind, element) => write!(f, "{}<{element}>", kind.name()),
            Shape::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Shape::Composite(composite) => f.write_str(composite.name()),
        }
    }
}

/// Strips the module path from a type name; generic names are kept whole.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}

/// A type the engine knows how to bind.
///
/// Composite types implement it with [`Shape::composite`], enums with
/// [`Shape::enumeration`]:
///
/// ```
/// use dragon_bind::{Bindable, Constructor, Shape, TypeDescriptor};
///
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// impl Bindable for Server {
///     fn shape() -> Shape {
///         Shape::composite::<Self>(|| {
///             TypeDescriptor::new("Server").constructor(
///                 Constructor::new("Server")
///                     .field::<String>("host")
///                     .optional::<u16>("port"),
///             )
///         })
///     }
/// }
/// ```
pub trait Bindable {
    fn shape() -> Shape;

    /// Whether an absent value binds to an explicit null.
    fn nullable() -> bool {
        false
    }
}

macro_rules! scalar_bindable {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            impl Bindable for $ty {
                fn shape() -> Shape {
                    Shape::Scalar(ScalarType::$scalar)
                }
            }
        )*
    };
}

scalar_bindable! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    chrono_tz::Tz => ZoneId,
}

impl Bindable for Value {
    fn shape() -> Shape {
        Shape::Any
    }
}

impl<T: Bindable> Bindable for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn nullable() -> bool {
        true
    }
}

impl<T: Bindable> Bindable for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn nullable() -> bool {
        T::nullable()
    }
}

impl<T: Bindable> Bindable for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }
}

impl<T: Bindable> Bindable for VecDeque<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }
}

impl<T: Bindable, S: BuildHasher> Bindable for HashSet<T, S> {
    fn shape() -> Shape {
        Shape::set(T::shape())
    }
}

impl<T: Bindable> Bindable for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::set(T::shape())
    }
}

impl<K: Bindable, V: Bindable, S: BuildHasher> Bindable for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }
}

impl<K: Bindable, V: Bindable> Bindable for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }
}
