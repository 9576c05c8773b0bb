use super::ValueRecord;
use crate::Result;

/// A dynamically typed value bound into, or read out of, a SQL statement.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`
    #[default]
    Null,

    Bool(bool),

    /// Signed integer of any width
    I64(i64),

    /// Unsigned integer of any width
    U64(u64),

    F64(f64),

    String(String),

    Bytes(Vec<u8>),

    /// Calendar date without a time zone
    Date(jiff::civil::Date),

    /// Wall clock time without a date
    Time(jiff::civil::Time),

    /// Date and time without a time zone
    DateTime(jiff::civil::DateTime),

    /// An instant in time. Converted to a civil value using the configured
    /// time zone before it is bound.
    Timestamp(jiff::Timestamp),

    /// A sequence of values, flattened into individual parameters when bound
    List(Vec<Value>),

    /// A model instance, bound as its primary key
    Model(Box<ModelValue>),
}

/// A model instance captured as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelValue {
    /// Full name (`package.Type`) of the model the record belongs to
    pub model: String,

    /// Field values of the instance
    pub record: ValueRecord,
}

impl Value {
    /// Returns a `Value` representing null
    pub const fn null() -> Value {
        Value::Null
    }

    pub fn model(model: impl Into<String>, record: ValueRecord) -> Value {
        Value::Model(Box::new(ModelValue {
            model: model.into(),
            record,
        }))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as an `i64` if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Model(_) => "model",
        }
    }
}

/// Conversion from a [`Value`] read out of the database into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl From<bool> for Value {
    fn from(src: bool) -> Value {
        Value::Bool(src)
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $wide:ty => $( $ty:ty ),*) => {
        $(
            impl From<$ty> for Value {
                fn from(src: $ty) -> Value {
                    Value::$variant(src as $wide)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    let converted = match value {
                        Value::I64(v) => <$ty>::try_from(v).ok(),
                        Value::U64(v) => <$ty>::try_from(v).ok(),
                        Value::String(ref v) => v.parse().ok(),
                        _ => None,
                    };
                    converted.ok_or_else(|| {
                        crate::err!(
                            "cannot convert {} value to {}",
                            value.kind_name(),
                            stringify!($ty)
                        )
                    })
                }
            }
        )*
    };
}

impl_from_int!(I64 as i64 => i8, i16, i32, i64, isize);
impl_from_int!(U64 as u64 => u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(src: f32) -> Value {
        Value::F64(src as f64)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Value {
        Value::F64(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Value {
        Value::String(src.to_string())
    }
}

impl From<String> for Value {
    fn from(src: String) -> Value {
        Value::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Value {
        Value::String(src.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Value {
        match src {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(src: Vec<T>) -> Value {
        Value::List(src.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(src: [T; N]) -> Value {
        Value::List(src.into_iter().map(Into::into).collect())
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::I64(v) => Ok(v != 0),
            Value::U64(v) => Ok(v != 0),
            _ => Err(crate::err!("cannot convert {} value to bool", value.kind_name())),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::F64(v) => Ok(v),
            Value::I64(v) => Ok(v as f64),
            Value::U64(v) => Ok(v as f64),
            Value::String(ref v) => Ok(v.parse()?),
            _ => Err(crate::err!("cannot convert {} value to f64", value.kind_name())),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            Value::I64(v) => Ok(v.to_string()),
            Value::U64(v) => Ok(v.to_string()),
            Value::F64(v) => Ok(v.to_string()),
            Value::Bool(v) => Ok(v.to_string()),
            _ => Err(crate::err!("cannot convert {} value to String", value.kind_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}
