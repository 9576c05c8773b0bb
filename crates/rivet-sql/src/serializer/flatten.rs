use super::Serializer;

use jiff::civil;
use rivet_core::{
    schema::{Field, FieldKind},
    stmt::{ModelValue, Value},
    Error, Result,
};

impl Serializer<'_> {
    /// Flattens a filter argument into the values bound for it.
    ///
    /// A top-level null is kept so `exact` can turn it into `IS NULL`. Lists
    /// are flattened recursively and nulls inside them are dropped. Every
    /// remaining value goes through [`Serializer::to_param`].
    pub fn flatten(&self, field: &Field, arg: &Value) -> Result<Vec<Value>> {
        let mut out = vec![];

        match arg {
            Value::List(items) => self.flatten_into(field, items, &mut out)?,
            value => out.push(self.to_param(field, value)?),
        }

        Ok(out)
    }

    fn flatten_into(&self, field: &Field, items: &[Value], out: &mut Vec<Value>) -> Result<()> {
        for item in items {
            match item {
                Value::Null => {}
                Value::List(nested) => self.flatten_into(field, nested, out)?,
                value => out.push(self.to_param(field, value)?),
            }
        }
        Ok(())
    }

    /// Converts a value into one a connection can bind, using the field it
    /// is compared with or stored in as context.
    ///
    /// * a model instance becomes its primary key;
    /// * a timestamp becomes a civil value in the serializer's time zone;
    /// * a string compared with a temporal field is parsed by length: 19 or
    ///   more characters as `%Y-%m-%d %H:%M:%S`, 10 or more as a date and
    ///   anything shorter as `%H:%M:%S`. Strings that do not parse are bound
    ///   as they are;
    /// * temporal values are narrowed or widened to the field's type.
    pub fn to_param(&self, field: &Field, value: &Value) -> Result<Value> {
        Ok(match value {
            Value::Model(model) => self.model_key(model)?,
            Value::Timestamp(ts) => {
                let datetime = self.time_zone.to_datetime(*ts);
                civil_for(field.kind, Value::DateTime(datetime))
            }
            Value::String(src) if field.kind.is_temporal() => match parse_temporal(src) {
                Some(parsed) => civil_for(field.kind, parsed),
                None => value.clone(),
            },
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
                civil_for(field.kind, value.clone())
            }
            value => value.clone(),
        })
    }

    fn model_key(&self, value: &ModelValue) -> Result<Value> {
        self.schema
            .model_by_name(&value.model)
            .and_then(|model| model.single_primary_key().ok())
            .and_then(|pk| value.record.value(&pk.name))
            .filter(|key| !key.is_null())
            .cloned()
            .ok_or_else(|| {
                Error::invalid_statement(format!(
                    "need a valid args value, unknown table or value `{}`",
                    value.model
                ))
            })
    }
}

fn parse_temporal(src: &str) -> Option<Value> {
    if src.len() >= 19 {
        let datetime = civil::DateTime::strptime("%Y-%m-%d %H:%M:%S", src.get(..19)?).ok()?;
        Some(Value::DateTime(datetime))
    } else if src.len() >= 10 {
        let date = civil::Date::strptime("%Y-%m-%d", src.get(..10)?).ok()?;
        Some(Value::Date(date))
    } else {
        let time = civil::Time::strptime("%H:%M:%S", src.get(..8)?).ok()?;
        Some(Value::Time(time))
    }
}

/// Fits a civil value to a temporal field type. Values bound to other
/// fields are left alone.
fn civil_for(kind: FieldKind, value: Value) -> Value {
    match (kind, value) {
        (FieldKind::Date, Value::DateTime(v)) => Value::Date(v.date()),
        (FieldKind::Time, Value::DateTime(v)) => Value::Time(v.time()),
        (FieldKind::DateTime, Value::Date(v)) => {
            Value::DateTime(v.to_datetime(civil::Time::midnight()))
        }
        (_, value) => value,
    }
}
