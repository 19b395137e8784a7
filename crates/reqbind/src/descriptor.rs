//! Declared semantic types of bindable fields.

use std::fmt;

/// The declared type of a bindable field.
///
/// Each descriptor selects one coercion rule. Descriptors are normally derived
/// from the Rust field type through [`FieldValue::descriptor`](crate::FieldValue::descriptor).
///
/// # Example
///
/// ```rust
/// use reqbind::TypeDescriptor;
///
/// let ty = TypeDescriptor::list(TypeDescriptor::Integer);
/// assert_eq!(ty.to_string(), "list<integer>");
/// assert!(!ty.is_scalar());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// UTF-8 text, bound as-is.
    String,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// Double-precision floating point.
    Float,
    /// `true` / `false`.
    Boolean,
    /// One of a fixed list of case names.
    Enum {
        /// Rust type name, used in diagnostics.
        name: &'static str,
        /// Declared case names.
        cases: &'static [&'static str],
    },
    /// Ordered list of elements of the inner type.
    List(Box<TypeDescriptor>),
    /// A type decoded through the JSON codec.
    Complex {
        /// Rust type name, used in diagnostics.
        type_name: &'static str,
    },
}

impl TypeDescriptor {
    /// Creates a list descriptor.
    #[must_use]
    pub fn list(element: TypeDescriptor) -> Self {
        Self::List(Box::new(element))
    }

    /// Returns true for types that can appear as list elements.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Integer | Self::Long | Self::Float | Self::Boolean | Self::Enum { .. }
        )
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Long => f.write_str("long"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Enum { name, .. } => write!(f, "enum {name}"),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Complex { type_name } => write!(f, "complex {type_name}"),
        }
    }
}
