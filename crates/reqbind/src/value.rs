//! Coerced values and the typed field bridge.
//!
//! Coercion produces a dynamically typed [`ParamValue`]. The [`FieldValue`]
//! trait connects a Rust field type to the [`TypeDescriptor`] that selects its
//! coercion rule and converts the coerced value back into the field type.

use crate::TypeDescriptor;
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// The output of coercing raw request strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Text.
    String(String),
    /// 32-bit integer.
    Integer(i32),
    /// 64-bit integer.
    Long(i64),
    /// Floating point.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// The matched declared case of an enum.
    Enum(&'static str),
    /// List of coerced elements.
    List(Vec<ParamValue>),
    /// JSON value handed to a complex type's deserializer.
    Complex(serde_json::Value),
}

impl ParamValue {
    /// Returns a short name of the value's shape, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Complex(_) => "complex",
        }
    }
}

fn mismatch<T: FieldValue>(value: &ParamValue) -> String {
    format!("expected {}, got {}", T::descriptor(), value.kind())
}

/// A Rust type that can be the target of a bindable field.
///
/// Implemented for `String`, `i32`, `i64`, `f64`, `f32`, `bool`, `Vec<T>`,
/// `Option<T>` and [`Json<T>`]. Enums get an implementation from
/// `#[derive(ParamEnum)]`.
pub trait FieldValue: Sized {
    /// Returns the declared type used to pick a coercion rule.
    fn descriptor() -> TypeDescriptor;

    /// Converts a coerced value into this type.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure when the value has the wrong shape
    /// or cannot be decoded.
    fn from_param(value: ParamValue) -> Result<Self, String>;
}

impl FieldValue for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::String(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldValue for i32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Integer
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Integer(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldValue for i64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Long
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Long(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldValue for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Float
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Float(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldValue for f32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Float
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Float(v) => Ok(v as f32),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FieldValue for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Boolean
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Boolean(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::list(T::descriptor())
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::List(items) => items.into_iter().map(T::from_param).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

// Option<T> binds like T; it stays None when the field is absent and has no default.
impl<T: FieldValue> FieldValue for Option<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        T::from_param(value).map(Some)
    }
}

/// A fieldless enum bindable from one of its declared case names.
///
/// Usually implemented with `#[derive(ParamEnum)]`, which also provides the
/// [`FieldValue`] implementation.
///
/// # Example
///
/// ```rust
/// use reqbind::ParamEnum;
///
/// #[derive(Debug, PartialEq, ParamEnum)]
/// enum Status {
///     New,
///     InProgress,
///     #[param(rename = "DONE")]
///     Completed,
/// }
///
/// assert_eq!(Status::CASES, &["NEW", "IN_PROGRESS", "DONE"]);
/// assert_eq!(Status::from_case("IN_PROGRESS"), Some(Status::InProgress));
/// assert_eq!(Status::Completed.as_case(), "DONE");
/// ```
pub trait ParamEnum: Sized + 'static {
    /// Type name used in diagnostics.
    const NAME: &'static str;

    /// Declared case names, in declaration order.
    const CASES: &'static [&'static str];

    /// Returns the variant whose case name is exactly `case`.
    fn from_case(case: &str) -> Option<Self>;

    /// Returns this variant's case name.
    fn as_case(&self) -> &'static str;

    /// Returns the enum descriptor for this type.
    fn enum_descriptor() -> TypeDescriptor {
        TypeDescriptor::Enum {
            name: Self::NAME,
            cases: Self::CASES,
        }
    }

    /// Converts a coerced enum value into this type.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an enum case of this type.
    fn from_enum_value(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Enum(case) => Self::from_case(case)
                .ok_or_else(|| format!("'{case}' is not a case of {}", Self::NAME)),
            other => Err(format!("expected enum {}, got {}", Self::NAME, other.kind())),
        }
    }
}

/// Marks a field as a complex type decoded through the JSON codec.
///
/// The coercer's [`JsonCodec`](crate::JsonCodec) turns the raw parameter
/// value into a JSON value, which is deserialized into `T`. The default codec
/// yields a JSON string, so `T` is typically a type that deserializes from one
/// (a newtype, an identifier, a date, a string-backed enum).
///
/// # Example
///
/// ```rust
/// use reqbind::{FieldValue, Json, ParamValue};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Sku(String);
///
/// let Json(sku) = Json::<Sku>::from_param(ParamValue::Complex("AB-12".into())).unwrap();
/// assert_eq!(sku, Sku("AB-12".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the Json and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FieldValue for Json<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Complex {
            type_name: std::any::type_name::<T>(),
        }
    }

    fn from_param(value: ParamValue) -> Result<Self, String> {
        match value {
            ParamValue::Complex(json) => serde_json::from_value(json)
                .map(Json)
                .map_err(|e| e.to_string()),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    impl ParamEnum for Color {
        const NAME: &'static str = "Color";
        const CASES: &'static [&'static str] = &["RED", "GREEN"];

        fn from_case(case: &str) -> Option<Self> {
            match case {
                "RED" => Some(Self::Red),
                "GREEN" => Some(Self::Green),
                _ => None,
            }
        }

        fn as_case(&self) -> &'static str {
            match self {
                Self::Red => "RED",
                Self::Green => "GREEN",
            }
        }
    }

    #[test]
    fn test_scalar_descriptors() {
        assert_eq!(String::descriptor(), TypeDescriptor::String);
        assert_eq!(i32::descriptor(), TypeDescriptor::Integer);
        assert_eq!(i64::descriptor(), TypeDescriptor::Long);
        assert_eq!(f32::descriptor(), TypeDescriptor::Float);
        assert_eq!(bool::descriptor(), TypeDescriptor::Boolean);
        assert_eq!(Option::<i64>::descriptor(), TypeDescriptor::Long);
        assert_eq!(
            Vec::<String>::descriptor(),
            TypeDescriptor::list(TypeDescriptor::String)
        );
    }

    #[test]
    fn test_from_param_matches_shape() {
        assert_eq!(i32::from_param(ParamValue::Integer(7)), Ok(7));
        assert_eq!(
            Option::<bool>::from_param(ParamValue::Boolean(true)),
            Ok(Some(true))
        );
        assert_eq!(
            Vec::<i32>::from_param(ParamValue::List(vec![
                ParamValue::Integer(1),
                ParamValue::Integer(3),
            ])),
            Ok(vec![1, 3])
        );
    }

    #[test]
    fn test_from_param_mismatch() {
        let err = i32::from_param(ParamValue::String("7".into())).unwrap_err();
        assert_eq!(err, "expected integer, got string");
    }

    #[test]
    fn test_enum_from_value() {
        assert_eq!(Color::from_enum_value(ParamValue::Enum("GREEN")), Ok(Color::Green));
        assert!(Color::from_enum_value(ParamValue::Enum("BLUE")).is_err());
        assert!(Color::from_enum_value(ParamValue::Integer(1)).is_err());
        assert_eq!(Color::Red.as_case(), "RED");
        assert_eq!(
            Color::enum_descriptor(),
            TypeDescriptor::Enum {
                name: "Color",
                cases: &["RED", "GREEN"],
            }
        );
    }

    #[test]
    fn test_json_decodes_string_scalar() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Sku(String);

        let value = ParamValue::Complex(serde_json::Value::String("AB-1".into()));
        let Json(sku) = Json::<Sku>::from_param(value).unwrap();
        assert_eq!(sku, Sku("AB-1".into()));
    }

    #[test]
    fn test_json_decode_failure() {
        let value = ParamValue::Complex(serde_json::Value::String("abc".into()));
        assert!(Json::<u32>::from_param(value).is_err());
    }
}
