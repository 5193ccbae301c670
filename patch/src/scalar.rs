//! Scalar values and JSON coercion.
//!
//! Patch documents carry loosely typed JSON scalars. Before anything is
//! assigned, each one is coerced to the [`FieldType`] its field declares,
//! producing a [`Scalar`]. Entities then convert scalars into their own Rust
//! field types through [`ScalarValue`].

use crate::{error::Result, Error, FieldType};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A coerced scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl Scalar {
    /// Name of the value's variant, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "Null",
            Scalar::Bool(_) => "Bool",
            Scalar::Int(_) => "Int",
            Scalar::Float(_) => "Float",
            Scalar::String(_) => "String",
            Scalar::Timestamp(_) => "Timestamp",
            Scalar::Uuid(_) => "Uuid",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => write!(f, "{:?}", s),
            Scalar::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Scalar::Uuid(u) => write!(f, "{}", u),
        }
    }
}

/// Why a JSON value could not be coerced to a field type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoerceError {
    #[error("null is not allowed for {0}")]
    NullNotAllowed(FieldType),

    #[error("expected {expected}, got {got}")]
    TypeMismatch {
        expected: FieldType,
        got: &'static str,
    },

    #[error("'{value}' is not a valid {expected}")]
    InvalidFormat { expected: FieldType, value: String },

    #[error("{value} is out of range for {expected}")]
    OutOfRange { expected: FieldType, value: String },
}

/// Coerce a JSON value to `field_type`.
///
/// Arrays and objects are always rejected.
pub fn coerce(
    value: &Value,
    field_type: FieldType,
    nullable: bool,
) -> std::result::Result<Scalar, CoerceError> {
    if value.is_null() {
        return if nullable {
            Ok(Scalar::Null)
        } else {
            Err(CoerceError::NullNotAllowed(field_type))
        };
    }

    let mismatch = || CoerceError::TypeMismatch {
        expected: field_type,
        got: json_type_name(value),
    };
    let invalid = |text: &str| CoerceError::InvalidFormat {
        expected: field_type,
        value: text.to_string(),
    };

    match field_type {
        FieldType::String => match value {
            Value::String(s) => Ok(Scalar::String(s.clone())),
            Value::Number(n) => Ok(Scalar::String(n.to_string())),
            Value::Bool(b) => Ok(Scalar::String(b.to_string())),
            _ => Err(mismatch()),
        },
        FieldType::Int => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Scalar::Int(i));
                }
                let out_of_range = || CoerceError::OutOfRange {
                    expected: field_type,
                    value: n.to_string(),
                };
                if n.is_u64() {
                    return Err(out_of_range());
                }
                let x = n.as_f64().ok_or_else(out_of_range)?;
                if x.fract() != 0.0 {
                    Err(invalid(&n.to_string()))
                } else if x < i64::MIN as f64 || x >= i64::MAX as f64 {
                    Err(out_of_range())
                } else {
                    Ok(Scalar::Int(x as i64))
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Scalar::Int)
                .map_err(|_| invalid(s)),
            _ => Err(mismatch()),
        },
        FieldType::Float => match value {
            Value::Number(n) => n.as_f64().map(Scalar::Float).ok_or_else(|| invalid(&n.to_string())),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(Scalar::Float(x)),
                _ => Err(invalid(s)),
            },
            _ => Err(mismatch()),
        },
        FieldType::Bool => match value {
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Scalar::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Scalar::Bool(false)),
            Value::String(s) => Err(invalid(s)),
            _ => Err(mismatch()),
        },
        FieldType::Timestamp => match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| Scalar::Timestamp(t.with_timezone(&Utc)))
                .map_err(|_| invalid(s)),
            // Integers are milliseconds since the Unix epoch
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(Scalar::Timestamp)
                .ok_or_else(|| invalid(&n.to_string())),
            _ => Err(mismatch()),
        },
        FieldType::Uuid => match value {
            Value::String(s) => Uuid::parse_str(s.trim())
                .map(Scalar::Uuid)
                .map_err(|_| invalid(s)),
            _ => Err(mismatch()),
        },
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "Int",
        Value::Number(_) => "Float",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

/// Rust types that can back a scalar field.
pub trait ScalarValue: Sized {
    /// The field type this Rust type stores.
    const TYPE: FieldType;

    /// Current value as a scalar.
    fn to_scalar(&self) -> Scalar;

    /// Convert a coerced scalar into this type.
    ///
    /// Fails only when the schema declares a different type than the field
    /// actually has.
    fn from_scalar(scalar: Scalar) -> Result<Self>;
}

macro_rules! scalar_value {
    ($ty:ty, $field_type:ident, $variant:ident) => {
        impl ScalarValue for $ty {
            const TYPE: FieldType = FieldType::$field_type;

            fn to_scalar(&self) -> Scalar {
                Scalar::$variant(self.clone())
            }

            fn from_scalar(scalar: Scalar) -> Result<Self> {
                match scalar {
                    Scalar::$variant(v) => Ok(v),
                    Scalar::Null => Err(Error::NullNotAllowed(Self::TYPE.to_string())),
                    other => Err(Error::scalar_mismatch(Self::TYPE, other.type_name())),
                }
            }
        }
    };
}

scalar_value!(String, String, String);
scalar_value!(i64, Int, Int);
scalar_value!(f64, Float, Float);
scalar_value!(bool, Bool, Bool);
scalar_value!(DateTime<Utc>, Timestamp, Timestamp);
scalar_value!(Uuid, Uuid, Uuid);

impl<T: ScalarValue> ScalarValue for Option<T> {
    const TYPE: FieldType = T::TYPE;

    fn to_scalar(&self) -> Scalar {
        match self {
            Some(v) => v.to_scalar(),
            None => Scalar::Null,
        }
    }

    fn from_scalar(scalar: Scalar) -> Result<Self> {
        match scalar {
            Scalar::Null => Ok(None),
            other => T::from_scalar(other).map(Some),
        }
    }
}
