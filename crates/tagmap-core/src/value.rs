//! Dynamic value model shared by the mapping engine
//!
//! Records are mapped through a closed set of shapes: scalars, text, timestamps,
//! optionals, sequences and nested records. [`Shape`] describes a destination slot,
//! [`Value`] carries the data, and [`Mappable`] converts Rust types into and out of
//! that model.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use crate::record::{RecordDescriptor, RecordValue};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Type descriptor of a record field
#[derive(Clone)]
pub enum Shape {
    Bool,
    /// Any signed integer width
    Int,
    /// Any unsigned integer width
    UInt,
    Float,
    Text,
    Timestamp,
    /// A value that may be absent
    Optional(Box<Shape>),
    /// An ordered collection of one element shape
    Seq(Box<Shape>),
    /// A nested record, resolved lazily so self-referencing records are allowed
    Record(fn() -> &'static RecordDescriptor),
}

impl Shape {
    /// The empty/zero form of this shape
    pub fn zero(&self) -> Value {
        match self {
            Shape::Bool => Value::Bool(false),
            Shape::Int => Value::Int(0),
            Shape::UInt => Value::UInt(0),
            Shape::Float => Value::Float(0.0),
            Shape::Text => Value::Text(String::new()),
            Shape::Timestamp => Value::Timestamp(DateTime::<Utc>::default()),
            Shape::Optional(_) => Value::Null,
            Shape::Seq(_) => Value::Seq(Vec::new()),
            Shape::Record(descriptor) => Value::Record(RecordValue::zero(descriptor())),
        }
    }

    /// Whether `value` can be stored in a slot of this shape as-is
    pub fn conforms(&self, value: &Value) -> bool {
        match (self, value) {
            (Shape::Optional(_), Value::Null) => true,
            (Shape::Optional(inner), value) => inner.conforms(value),
            (Shape::Bool, Value::Bool(_))
            | (Shape::Int, Value::Int(_))
            | (Shape::UInt, Value::UInt(_))
            | (Shape::Float, Value::Float(_))
            | (Shape::Text, Value::Text(_))
            | (Shape::Timestamp, Value::Timestamp(_)) => true,
            (Shape::Seq(element), Value::Seq(items)) => items.iter().all(|item| element.conforms(item)),
            (Shape::Record(descriptor), Value::Record(record)) => {
                std::ptr::eq(descriptor(), record.descriptor())
            }
            _ => false,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Shape::Optional(_))
    }

    /// Records and sequences are the composite shapes of the coercion rules
    pub fn is_composite(&self) -> bool {
        matches!(self, Shape::Record(_) | Shape::Seq(_))
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Shape::Optional(a), Shape::Optional(b)) | (Shape::Seq(a), Shape::Seq(b)) => a == b,
            (Shape::Record(a), Shape::Record(b)) => std::ptr::eq(a(), b()),
            (Shape::Bool, Shape::Bool)
            | (Shape::Int, Shape::Int)
            | (Shape::UInt, Shape::UInt)
            | (Shape::Float, Shape::Float)
            | (Shape::Text, Shape::Text)
            | (Shape::Timestamp, Shape::Timestamp) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Bool => write!(f, "bool"),
            Shape::Int => write!(f, "int"),
            Shape::UInt => write!(f, "uint"),
            Shape::Float => write!(f, "float"),
            Shape::Text => write!(f, "text"),
            Shape::Timestamp => write!(f, "timestamp"),
            Shape::Optional(inner) => write!(f, "optional<{}>", inner),
            Shape::Seq(element) => write!(f, "sequence<{}>", element),
            Shape::Record(descriptor) => write!(f, "record {}", descriptor().name()),
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({})", self)
    }
}

/// A dynamically shaped field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An optional holding no value
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Seq(Vec<Value>),
    Record(RecordValue),
}

impl Value {
    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Seq(_) => "sequence",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric view of integer and float values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::UInt(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

/// Errors converting a [`Value`] into a concrete shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// The value's variant does not fit the target shape
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    /// The value fits the shape but not the concrete Rust width
    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    /// A record value carries fewer slots than its descriptor declares
    #[error("record {record} has no value for field '{field}'")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    /// A record value built with the wrong number of slots
    #[error("record {record} declares {expected} fields, got {found} values")]
    FieldCount {
        record: &'static str,
        expected: usize,
        found: usize,
    },

    /// A record slot holds a value its field shape does not accept
    #[error("field '{field}' of record {record}: expected {expected}, found {found}")]
    FieldMismatch {
        record: &'static str,
        field: &'static str,
        expected: String,
        found: String,
    },
}

impl ConversionError {
    pub(crate) fn mismatch(expected: &Shape, found: &Value) -> Self {
        ConversionError::Mismatch {
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }
}

/// Types that can occupy a record field
pub trait Mappable: Sized {
    /// The shape every value of this type has
    fn shape() -> Shape;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

macro_rules! impl_signed {
    ($($ty:ty),*) => {
        $(
            impl Mappable for $ty {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn to_value(&self) -> Value {
                    Value::Int(*self as i64)
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(n) => <$ty>::try_from(n).map_err(|_| ConversionError::OutOfRange {
                            value: n.to_string(),
                            target: stringify!($ty),
                        }),
                        other => Err(ConversionError::mismatch(&Shape::Int, &other)),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Mappable for $ty {
                fn shape() -> Shape {
                    Shape::UInt
                }

                fn to_value(&self) -> Value {
                    Value::UInt(*self as u64)
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::UInt(n) => <$ty>::try_from(n).map_err(|_| ConversionError::OutOfRange {
                            value: n.to_string(),
                            target: stringify!($ty),
                        }),
                        other => Err(ConversionError::mismatch(&Shape::UInt, &other)),
                    }
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Mappable for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(n) => Ok(n),
            other => Err(ConversionError::mismatch(&Shape::Float, &other)),
        }
    }
}

impl Mappable for f32 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(n) => Ok(n as f32),
            other => Err(ConversionError::mismatch(&Shape::Float, &other)),
        }
    }
}

impl Mappable for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(flag) => Ok(flag),
            other => Err(ConversionError::mismatch(&Shape::Bool, &other)),
        }
    }
}

impl Mappable for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(ConversionError::mismatch(&Shape::Text, &other)),
        }
    }
}

impl Mappable for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::Timestamp
    }

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Timestamp(at) => Ok(at),
            other => Err(ConversionError::mismatch(&Shape::Timestamp, &other)),
        }
    }
}

impl<T: Mappable> Mappable for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Mappable> Mappable for Vec<T> {
    fn shape() -> Shape {
        Shape::Seq(Box::new(T::shape()))
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Mappable::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ConversionError::mismatch(&Self::shape(), &other)),
        }
    }
}

impl<T: Mappable> Mappable for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        T::from_value(value).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_width_is_checked_on_write_back() {
        assert_eq!(u8::from_value(Value::UInt(200)), Ok(200));
        let err = u8::from_value(Value::UInt(300)).unwrap_err();
        assert_eq!(err.to_string(), "300 is out of range for u8");
        assert!(matches!(
            i32::from_value(Value::UInt(1)),
            Err(ConversionError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_option_uses_null() {
        assert_eq!(None::<String>.to_value(), Value::Null);
        assert_eq!(Some("x".to_string()).to_value(), Value::Text("x".into()));
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
        assert_eq!(Option::<i64>::from_value(Value::Int(4)), Ok(Some(4)));
    }

    #[test]
    fn test_shape_conformance() {
        let tags = Vec::<String>::shape();
        assert!(tags.conforms(&Value::Seq(vec!["a".into(), "b".into()])));
        assert!(!tags.conforms(&Value::Seq(vec![Value::Int(1)])));

        let maybe = Option::<f64>::shape();
        assert!(maybe.conforms(&Value::Null));
        assert!(maybe.conforms(&Value::Float(1.5)));
        assert!(!Shape::Float.conforms(&Value::Null));
    }

    #[test]
    fn test_zero_forms() {
        assert_eq!(Shape::Text.zero(), Value::Text(String::new()));
        assert_eq!(Option::<u8>::shape().zero(), Value::Null);
        assert_eq!(Vec::<bool>::shape().zero(), Value::Seq(Vec::new()));
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(Option::<Vec<i32>>::shape().to_string(), "optional<sequence<int>>");
    }
}
