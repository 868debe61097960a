//! # Type Descriptors
//!
//! A [`TypeDescriptor`] is the immutable tree that describes a declared
//! type: a scalar, a list, a mapping, an optional, a union, or a structured
//! record with named fields. Descriptors are built once when a contract is
//! declared and are only read afterwards.
//!
//! Rust has no runtime annotations to reflect over, so descriptors are
//! declared explicitly, either with the constructors on [`TypeDescriptor`]
//! or derived from a Rust type through [`Describe`]:
//!
//! ```
//! use spw_schema::{Describe, TypeDescriptor};
//!
//! let declared = TypeDescriptor::list(TypeDescriptor::optional(TypeDescriptor::int()));
//! assert_eq!(declared, <Vec<Option<i64>>>::descriptor());
//! assert_eq!(declared.to_string(), "list[Optional[int]]");
//! ```
//!
//! Trees are finite and acyclic by construction: every child is owned by
//! its parent.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Booleans only.
    Bool,
    /// Integers only; booleans are rejected.
    Int,
    /// Floats, and integers by promotion.
    Float,
    /// Strings only.
    Str,
    /// The null value only.
    Null,
    /// Any value.
    Any,
}

impl ScalarType {
    /// Annotation spelling of the scalar.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Null => "None",
            Self::Any => "Any",
        }
    }
}

/// Coarse classification of a descriptor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// A leaf.
    Scalar,
    /// Homogeneous list.
    List,
    /// String-keyed mapping.
    Mapping,
    /// Value or null.
    Optional,
    /// One of several branches.
    Union,
    /// Record with named fields.
    Structured,
}

/// A named field of a structured descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Declared type of the field.
    pub descriptor: TypeDescriptor,
}

/// Immutable description of a declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// A leaf type.
    Scalar {
        /// Which scalar.
        scalar: ScalarType,
    },
    /// A list whose every element matches `item`.
    List {
        /// Element type.
        item: Box<TypeDescriptor>,
    },
    /// A mapping whose every key matches `key` and every value matches `value`.
    Mapping {
        /// Key type. Keys are always strings at runtime.
        key: Box<TypeDescriptor>,
        /// Value type.
        value: Box<TypeDescriptor>,
    },
    /// Either null or a value matching `inner`.
    Optional {
        /// The non-null branch.
        inner: Box<TypeDescriptor>,
    },
    /// A value matching at least one branch.
    Union {
        /// Candidate branches, in declaration order.
        branches: Vec<TypeDescriptor>,
    },
    /// A record: an object whose declared fields are all present and valid.
    Structured {
        /// Record type name.
        name: String,
        /// Declared fields, in declaration order.
        fields: Vec<FieldDescriptor>,
    },
}

impl TypeDescriptor {
    /// Scalar descriptor.
    pub fn scalar(scalar: ScalarType) -> Self {
        Self::Scalar { scalar }
    }

    /// `bool`.
    pub fn bool() -> Self {
        Self::scalar(ScalarType::Bool)
    }

    /// `int`.
    pub fn int() -> Self {
        Self::scalar(ScalarType::Int)
    }

    /// `float`.
    pub fn float() -> Self {
        Self::scalar(ScalarType::Float)
    }

    /// `str`.
    pub fn str() -> Self {
        Self::scalar(ScalarType::Str)
    }

    /// `None`.
    pub fn none() -> Self {
        Self::scalar(ScalarType::Null)
    }

    /// `Any`.
    pub fn any() -> Self {
        Self::scalar(ScalarType::Any)
    }

    /// `list[item]`.
    pub fn list(item: TypeDescriptor) -> Self {
        Self::List {
            item: Box::new(item),
        }
    }

    /// `dict[key, value]`.
    pub fn mapping(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// `Optional[inner]`.
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional {
            inner: Box::new(inner),
        }
    }

    /// `Union[...]`.
    pub fn union(branches: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Union {
            branches: branches.into_iter().collect(),
        }
    }

    /// A named record.
    pub fn structured<N>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (N, TypeDescriptor)>,
    ) -> Self
    where
        N: Into<String>,
    {
        Self::Structured {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, descriptor)| FieldDescriptor {
                    name: name.into(),
                    descriptor,
                })
                .collect(),
        }
    }

    /// Coarse classification of this node.
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Scalar { .. } => DescriptorKind::Scalar,
            Self::List { .. } => DescriptorKind::List,
            Self::Mapping { .. } => DescriptorKind::Mapping,
            Self::Optional { .. } => DescriptorKind::Optional,
            Self::Union { .. } => DescriptorKind::Union,
            Self::Structured { .. } => DescriptorKind::Structured,
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Self::Scalar { .. } => 0,
            Self::List { item } => item.node_count(),
            Self::Mapping { key, value } => key.node_count() + value.node_count(),
            Self::Optional { inner } => inner.node_count(),
            Self::Union { branches } => branches.iter().map(Self::node_count).sum(),
            Self::Structured { fields, .. } => {
                fields.iter().map(|f| f.descriptor.node_count()).sum()
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar { scalar } => f.write_str(scalar.as_str()),
            Self::List { item } => write!(f, "list[{item}]"),
            Self::Mapping { key, value } => write!(f, "dict[{key}, {value}]"),
            Self::Optional { inner } => write!(f, "Optional[{inner}]"),
            Self::Union { branches } => {
                f.write_str("Union[")?;
                for (i, b) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{b}")?;
                }
                f.write_str("]")
            }
            Self::Structured { name, .. } => f.write_str(name),
        }
    }
}

// ─── Describe ────────────────────────────────────────────────────────

/// Rust types with a canonical descriptor.
///
/// Implement this for record types to use them in contracts:
///
/// ```
/// use spw_schema::{Describe, TypeDescriptor};
///
/// struct Address { city: String, zip: String }
///
/// impl Describe for Address {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::structured("Address", [
///             ("city", String::descriptor()),
///             ("zip", String::descriptor()),
///         ])
///     }
/// }
/// ```
pub trait Describe {
    /// The descriptor of `Self`.
    fn descriptor() -> TypeDescriptor;
}

macro_rules! describe_scalar {
    ($ctor:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::$ctor()
                }
            }
        )+
    };
}

describe_scalar!(bool: bool);
describe_scalar!(int: i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
describe_scalar!(float: f32, f64);
describe_scalar!(str: String, str);
describe_scalar!(none: ());
describe_scalar!(any: serde_json::Value);

impl<T: Describe + ?Sized> Describe for &T {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::list(T::descriptor())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::descriptor())
    }
}

impl<V: Describe, S> Describe for HashMap<String, V, S> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping(TypeDescriptor::str(), V::descriptor())
    }
}

impl<V: Describe> Describe for BTreeMap<String, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping(TypeDescriptor::str(), V::descriptor())
    }
}
