use super::Value;
use crate::Result;

use indexmap::IndexMap;

/// Field-level access to a model instance.
///
/// Bind plans name the fields that supply parameters; a record resolves
/// those names to values at call time and accepts values read back from
/// the database.
pub trait Record {
    /// Returns the current value of `field`, or `None` if the record has no
    /// such field.
    fn get(&self, field: &str) -> Option<Value>;

    /// Stores `value` into `field`.
    fn set(&mut self, field: &str, value: Value) -> Result<()>;
}

/// A record backed by an ordered map of field names to values.
///
/// Used for rows returned by the connection and for model instances captured
/// as [`Value::Model`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValueRecord {
    fields: IndexMap<String, Value>,
}

impl ValueRecord {
    pub fn new() -> ValueRecord {
        ValueRecord::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> ValueRecord {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the first value, used for single-scalar results.
    pub fn first(&self) -> Option<&Value> {
        self.fields.values().next()
    }
}

impl Record for ValueRecord {
    fn get(&self, field: &str) -> Option<Value> {
        self.fields.get(field).cloned()
    }

    fn set(&mut self, field: &str, value: Value) -> Result<()> {
        self.fields.insert(field.to_string(), value);
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ValueRecord {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for ValueRecord {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
