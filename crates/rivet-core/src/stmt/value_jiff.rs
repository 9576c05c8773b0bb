use super::{FromValue, Value};
use crate::Result;

use jiff::civil;

macro_rules! impl_jiff {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Value {
            fn from(src: $ty) -> Value {
                Value::$variant(src)
            }
        }

        impl From<&$ty> for Value {
            fn from(src: &$ty) -> Value {
                Value::$variant(*src)
            }
        }
    };
}

impl_jiff!(Date, civil::Date);
impl_jiff!(Time, civil::Time);
impl_jiff!(DateTime, civil::DateTime);
impl_jiff!(Timestamp, jiff::Timestamp);

impl FromValue for civil::Date {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            Value::String(v) => Ok(v.parse()?),
            value => Err(crate::err!("cannot convert {} value to Date", value.kind_name())),
        }
    }
}

impl FromValue for civil::Time {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(v) => Ok(v),
            Value::DateTime(v) => Ok(v.time()),
            Value::String(v) => Ok(v.parse()?),
            value => Err(crate::err!("cannot convert {} value to Time", value.kind_name())),
        }
    }
}

impl FromValue for civil::DateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Date(v) => Ok(v.to_datetime(civil::Time::midnight())),
            Value::String(v) => Ok(v.parse()?),
            value => Err(crate::err!(
                "cannot convert {} value to DateTime",
                value.kind_name()
            )),
        }
    }
}

impl FromValue for jiff::Timestamp {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::String(v) => Ok(v.parse()?),
            value => Err(crate::err!(
                "cannot convert {} value to Timestamp",
                value.kind_name()
            )),
        }
    }
}
