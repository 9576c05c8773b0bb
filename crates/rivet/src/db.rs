mod builder;
pub use builder::Builder;

mod global;

use crate::{Model, QuerySet, Record, Result, M2m};

use jiff::{tz::TimeZone, Timestamp};
use rivet_core::{
    driver::{Connection, Response},
    schema::{plan::BindPlan, FieldKind, ModelId},
    stmt::{Value, ValueRecord},
    Error, Schema,
};
use rivet_sql::Serializer;

use std::{any::TypeId, collections::HashMap, fmt, sync::Arc};

/// A database handle.
///
/// Holds the bootstrapped schema and the connection statements run on.
/// Cloning is cheap; clones share both.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

struct Shared {
    schema: Arc<Schema>,
    connection: Box<dyn Connection>,
    time_zone: TimeZone,

    /// Registered Rust types and the models they map to
    models: HashMap<TypeId, ModelId>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.shared.schema
    }

    /// Starts a query over every row of `M`'s table.
    pub fn query<M: Model>(&self) -> Result<QuerySet<M>> {
        Ok(QuerySet::new(self.clone(), self.model_id::<M>()?))
    }

    /// The many-to-many field `field` of `owner`.
    pub fn m2m<'a, M: Model>(&'a self, owner: &'a M, field: &str) -> M2m<'a, M> {
        M2m::new(self, owner, field)
    }

    /// Inserts a record, then writes back its generated key and initial
    /// version.
    pub async fn insert<M: Model>(&self, record: &mut M) -> Result<()> {
        let model = self.model_id::<M>()?;
        let serializer = self.serializer();

        self.touch(model, record, true)?;

        let plan = serializer.insert_plan(model)?;
        let params = serializer.bind(model, &plan, record, &[])?;
        let response = self.exec(&plan.sql, &params).await?;

        if let Some(auto) = &plan.auto_increment {
            let key = match response.last_insert_id {
                Some(key) => Some(key),
                None => response
                    .rows
                    .into_values()
                    .ok()
                    .and_then(|rows| rows.into_iter().next())
                    .and_then(|row| row.first().cloned()),
            };

            if let Some(key) = key {
                record.set(&auto.field, key)?;
            }
        }

        bump_version(&plan, record)
    }

    /// Updates every mapped field of a record by primary key.
    ///
    /// A versioned model only matches the row at the record's version; when
    /// nothing matches the update fails with a condition-failed error.
    pub async fn update<M: Model>(&self, record: &mut M) -> Result<u64> {
        let model = self.model_id::<M>()?;
        self.touch(model, record, false)?;

        let plan = self.serializer().update_plan(model, None)?;
        self.write(model, &plan, record).await
    }

    /// Updates only `fields` of a record. Fields set automatically on
    /// update are written too.
    pub async fn update_columns<M: Model>(&self, record: &mut M, fields: &[&str]) -> Result<u64> {
        let model = self.model_id::<M>()?;
        self.touch(model, record, false)?;

        let mut fields = fields.to_vec();
        for field in &self.shared.schema.model(model).fields {
            if field.auto_now && !fields.contains(&field.name.as_str()) {
                fields.push(&field.name);
            }
        }

        let plan = self.serializer().update_plan(model, Some(&fields))?;
        self.write(model, &plan, record).await
    }

    /// Deletes a record by primary key, and current version when the model
    /// has one.
    pub async fn delete<M: Model>(&self, record: &M) -> Result<u64> {
        let model = self.model_id::<M>()?;
        let serializer = self.serializer();

        let plan = serializer.delete_plan(model)?;
        let params = serializer.bind(model, &plan, record, &[])?;
        let count = self.exec(&plan.sql, &params).await?.rows.into_count();

        check_matched(&plan, count, "delete")?;
        Ok(count)
    }

    /// Loads a record by its primary key.
    pub async fn get<M: Model>(&self, record: &mut M) -> Result<()> {
        let model = self.model_id::<M>()?;
        let serializer = self.serializer();

        let plan = serializer.get_plan(model)?;
        let params = serializer.bind(model, &plan, record, &[])?;
        let rows = self.exec(&plan.sql, &params).await?.rows.into_values()?;

        let row = rows.into_iter().next().ok_or_else(|| {
            Error::record_not_found(format!(
                "no `{}` row with the given key",
                self.shared.schema.model(model).table
            ))
        })?;

        for column in &plan.columns {
            if let Some(value) = row.value(&column.column) {
                record.set(&column.field, value.clone())?;
            }
        }

        Ok(())
    }

    /// Creates the table of every model, junction tables included.
    pub async fn create_tables(&self, if_not_exists: bool) -> Result<()> {
        let serializer = self.serializer();

        for model in self.shared.schema.models() {
            for sql in serializer.create_table(model.id, if_not_exists)? {
                self.exec(&sql, &[]).await?;
            }
        }

        Ok(())
    }

    /// Runs SQL on the connection as given.
    pub async fn exec(&self, sql: &str, params: &[Value]) -> Result<Response> {
        tracing::debug!(sql, params = params.len(), "exec");
        self.shared.connection.exec(sql, params).await
    }

    pub(crate) fn serializer(&self) -> Serializer<'_> {
        Serializer::for_capability(&self.shared.schema, self.shared.connection.capability())
            .with_time_zone(self.shared.time_zone.clone())
    }

    pub(crate) fn model_id<M: Model>(&self) -> Result<ModelId> {
        self.shared
            .models
            .get(&TypeId::of::<M>())
            .copied()
            .ok_or_else(|| {
                Error::invalid_statement(format!(
                    "model `{}` is not registered",
                    std::any::type_name::<M>()
                ))
            })
    }

    /// Builds a `T` from a row keyed by column name.
    pub(crate) fn load<T: Model>(&self, model: ModelId, row: &ValueRecord) -> Result<T> {
        let mut record = T::default();

        for field in self.shared.schema.model(model).columns() {
            if let Some(value) = row.value(&field.column) {
                record.set(&field.name, value.clone())?;
            }
        }

        Ok(record)
    }

    async fn write<M: Model>(&self, model: ModelId, plan: &BindPlan, record: &mut M) -> Result<u64> {
        let params = self.serializer().bind(model, plan, record, &[])?;
        let count = self.exec(&plan.sql, &params).await?.rows.into_count();

        check_matched(plan, count, "update")?;
        bump_version(plan, record)?;
        Ok(count)
    }

    /// Stamps `auto_now` fields, and on insert `auto_now_add` fields, with
    /// the current time.
    fn touch(&self, model: ModelId, record: &mut dyn Record, insert: bool) -> Result<()> {
        let now = self.shared.time_zone.to_datetime(Timestamp::now());

        for field in &self.shared.schema.model(model).fields {
            if !(field.auto_now || (insert && field.auto_now_add)) {
                continue;
            }

            let value = match field.kind {
                FieldKind::Date => Value::Date(now.date()),
                FieldKind::Time => Value::Time(now.time()),
                _ => Value::DateTime(now),
            };
            record.set(&field.name, value)?;
        }

        Ok(())
    }
}

/// A versioned write that matched nothing lost a race with another writer.
fn check_matched(plan: &BindPlan, count: u64, op: &str) -> Result<()> {
    match &plan.version {
        Some(version) if count == 0 => Err(Error::condition_failed(format!(
            "{op} matched no row at the current `{version}`"
        ))),
        _ => Ok(()),
    }
}

fn bump_version(plan: &BindPlan, record: &mut dyn Record) -> Result<()> {
    if let Some(version) = &plan.version {
        let current = record
            .get(version)
            .and_then(|value| value.as_i64())
            .unwrap_or_default();
        record.set(version, Value::I64(current + 1))?;
    }
    Ok(())
}

impl fmt::Debug for Db {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Db")
            .field("connection", &self.shared.connection)
            .field("models", &self.shared.models.len())
            .finish()
    }
}
