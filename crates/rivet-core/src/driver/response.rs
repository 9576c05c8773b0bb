use crate::stmt::{Value, ValueRecord};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,

    /// Key generated by an insert, for backends that report one.
    pub last_insert_id: Option<Value>,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows affected by a mutation
    Count(u64),

    /// Rows returned by a query, keyed by column name
    Values(Vec<ValueRecord>),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
            last_insert_id: None,
        }
    }

    pub fn values(rows: Vec<ValueRecord>) -> Self {
        Self {
            rows: Rows::Values(rows),
            last_insert_id: None,
        }
    }

    pub fn with_last_insert_id(mut self, id: impl Into<Value>) -> Self {
        self.last_insert_id = Some(id.into());
        self
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    /// The affected-row count. A row set counts its rows.
    pub fn into_count(self) -> u64 {
        match self {
            Rows::Count(count) => count,
            Rows::Values(rows) => rows.len() as u64,
        }
    }

    pub fn into_values(self) -> crate::Result<Vec<ValueRecord>> {
        match self {
            Rows::Values(rows) => Ok(rows),
            Rows::Count(_) => Err(crate::err!("expected rows, got an affected-row count")),
        }
    }
}
