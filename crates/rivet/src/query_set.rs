use crate::{Db, Error, Model, Result};

use rivet_core::{
    schema::ModelId,
    stmt::{Condition, Query, Value, ValueRecord},
};

use std::marker::PhantomData;

/// A lazily executed query over the rows of `M`'s table.
///
/// Builder methods refine the query; nothing runs until one of the async
/// terminal methods is awaited.
pub struct QuerySet<M> {
    db: Db,
    query: Query,
    _p: PhantomData<fn() -> M>,
}

impl<M: Model> QuerySet<M> {
    pub(crate) fn new(db: Db, model: ModelId) -> QuerySet<M> {
        QuerySet {
            db,
            query: Query::new(model),
            _p: PhantomData,
        }
    }

    /// Keeps rows matching `expr`, e.g. `filter("age__gte", 18)`.
    pub fn filter(mut self, expr: &str, arg: impl Into<Value>) -> Self {
        self.query.cond = std::mem::take(&mut self.query.cond).and(expr, arg);
        self
    }

    /// Drops rows matching `expr`.
    pub fn exclude(mut self, expr: &str, arg: impl Into<Value>) -> Self {
        self.query.cond = std::mem::take(&mut self.query.cond).and_not(expr, arg);
        self
    }

    /// Replaces the filter.
    pub fn set_cond(mut self, cond: Condition) -> Self {
        self.query.cond = cond;
        self
    }

    pub fn cond(&self) -> &Condition {
        &self.query.cond
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.query.offset = Some(offset);
        self
    }

    pub fn group_by(mut self, exprs: &[&str]) -> Self {
        for expr in exprs {
            self.query.group_by(expr);
        }
        self
    }

    /// Orders by each expression in turn. A leading `-` sorts descending.
    pub fn order_by(mut self, exprs: &[&str]) -> Self {
        for expr in exprs {
            self.query.order_by(expr);
        }
        self
    }

    pub fn distinct(mut self) -> Self {
        self.query.distinct = true;
        self
    }

    pub async fn count(&self) -> Result<u64> {
        let stmt = self.db.serializer().count(&self.query)?;
        let rows = self.db.exec(&stmt.sql, &stmt.params).await?.rows.into_values()?;

        let count = rows
            .first()
            .and_then(ValueRecord::first)
            .and_then(Value::as_i64)
            .ok_or_else(|| rivet_core::err!("count returned no value"))?;

        Ok(count.max(0) as u64)
    }

    pub async fn exists(&self) -> Result<bool> {
        Ok(self.count().await? > 0)
    }

    pub async fn all(&self) -> Result<Vec<M>> {
        let stmt = self.db.serializer().select(&self.query)?;
        let rows = self.db.exec(&stmt.sql, &stmt.params).await?.rows.into_values()?;

        rows.iter()
            .map(|row| self.db.load(self.query.model, row))
            .collect()
    }

    /// Returns the single matching row.
    ///
    /// Fails with a not-found error when nothing matches and a
    /// too-many-records error when more than one row does.
    pub async fn one(&self) -> Result<M> {
        let mut query = self.query.clone();
        if query.limit.is_none() {
            query.limit = Some(2);
        }

        let stmt = self.db.serializer().select(&query)?;
        let mut rows = self.db.exec(&stmt.sql, &stmt.params).await?.rows.into_values()?;
        let table = &self.db.schema().model(query.model).table;

        match rows.len() {
            0 => Err(Error::record_not_found(format!(
                "no `{table}` row matches the query"
            ))),
            1 => self.db.load(query.model, &rows.remove(0)),
            n => Err(Error::too_many_records(format!(
                "expected one `{table}` row, found {n}"
            ))),
        }
    }

    /// Deletes every matching row and returns the number deleted.
    pub async fn delete(&self) -> Result<u64> {
        let stmt = self.db.serializer().delete(&self.query)?;
        Ok(self.db.exec(&stmt.sql, &stmt.params).await?.rows.into_count())
    }

    /// Sets fields on every matching row and returns the number updated.
    pub async fn update(&self, values: ValueRecord) -> Result<u64> {
        let values: Vec<(String, Value)> = values.into_iter().collect();
        let stmt = self.db.serializer().update(&self.query, &values)?;
        Ok(self.db.exec(&stmt.sql, &stmt.params).await?.rows.into_count())
    }
}

impl<M> Clone for QuerySet<M> {
    fn clone(&self) -> Self {
        QuerySet {
            db: self.db.clone(),
            query: self.query.clone(),
            _p: PhantomData,
        }
    }
}

impl<M> std::fmt::Debug for QuerySet<M> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.debug_struct("QuerySet")
            .field("query", &self.query)
            .finish()
    }
}
