//! Many-to-many relation access.

use crate::{Db, Error, Model, Record, Result};

use rivet_core::{
    schema::{Field, ModelId, RelKind},
    stmt::{Condition, Query, Value},
};

/// The many-to-many field `field` of one owner record.
///
/// Rows of the junction table link the owner's primary key to the primary
/// keys of related records.
#[derive(Debug)]
pub struct M2m<'a, O> {
    db: &'a Db,
    owner: &'a O,
    field: String,
}

/// Junction model and the two fields linking it to either side.
struct Junction<'s> {
    model: ModelId,
    target: ModelId,
    pair: &'s Field,
    link: &'s Field,
}

impl<'a, O: Model> M2m<'a, O> {
    pub(crate) fn new(db: &'a Db, owner: &'a O, field: &str) -> M2m<'a, O> {
        M2m {
            db,
            owner,
            field: field.to_string(),
        }
    }

    /// Links the owner to each of `targets`. Targets must already be saved.
    pub async fn add<T: Model>(&self, targets: &[&T]) -> Result<u64> {
        let owner = self.db.model_id::<O>()?;
        self.check_target::<T>()?;

        let serializer = self.db.serializer();
        let plan = serializer.m2m_insert_plan(owner, &self.field, targets.len())?;

        let params = {
            let targets: Vec<&dyn Record> = targets.iter().map(|target| *target as &dyn Record).collect();
            serializer.bind(owner, &plan, self.owner, &targets)?
        };

        Ok(self.db.exec(&plan.sql, &params).await?.rows.into_count())
    }

    /// Loads every record linked to the owner.
    pub async fn all<T: Model>(&self) -> Result<Vec<T>> {
        let owner = self.db.model_id::<O>()?;
        let target = self.check_target::<T>()?;

        let serializer = self.db.serializer();
        let plan = serializer.m2m_query_plan(owner, &self.field)?;
        let params = serializer.bind(owner, &plan, self.owner, &[])?;
        let rows = self.db.exec(&plan.sql, &params).await?.rows.into_values()?;

        rows.iter().map(|row| self.db.load(target, row)).collect()
    }

    pub async fn count(&self) -> Result<u64> {
        let query = self.junction_query(Condition::new())?;
        let stmt = self.db.serializer().count(&query)?;
        let rows = self.db.exec(&stmt.sql, &stmt.params).await?.rows.into_values()?;

        Ok(rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .unwrap_or_default()
            .max(0) as u64)
    }

    /// Unlinks `targets` from the owner. The targets themselves are kept.
    pub async fn remove<T: Model>(&self, targets: &[&T]) -> Result<u64> {
        let target = self.check_target::<T>()?;
        let key = self.db.schema().model(target).single_primary_key()?;

        let keys = targets
            .iter()
            .map(|record| {
                record.get(&key.name).filter(|value| !value.is_null()).ok_or_else(|| {
                    Error::invalid_statement(format!(
                        "related record has no primary key value `{}`",
                        key.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let junction = self.junction()?;
        let query = self.junction_query(
            Condition::new().and(&format!("{}__in", junction.link.name), Value::List(keys)),
        )?;
        self.delete(&query).await
    }

    /// Unlinks every record from the owner.
    pub async fn clear(&self) -> Result<u64> {
        let query = self.junction_query(Condition::new())?;
        self.delete(&query).await
    }

    async fn delete(&self, query: &Query) -> Result<u64> {
        let stmt = self.db.serializer().delete(query)?;
        Ok(self.db.exec(&stmt.sql, &stmt.params).await?.rows.into_count())
    }

    /// A query over the owner's junction rows, narrowed by `cond`.
    fn junction_query(&self, cond: Condition) -> Result<Query> {
        let junction = self.junction()?;
        let owner = self.db.schema().model(self.db.model_id::<O>()?);
        let key = owner.single_primary_key()?;

        let value = self
            .owner
            .get(&key.name)
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                Error::invalid_statement(format!(
                    "`{}` has no primary key value; save it first",
                    owner.full_name
                ))
            })?;

        let mut query = Query::new(junction.model);
        query.cond = Condition::new().and(&junction.pair.name, value).and_cond(cond);
        Ok(query)
    }

    fn junction(&self) -> Result<Junction<'_>> {
        let schema = self.db.schema();
        let owner = schema.model(self.db.model_id::<O>()?);

        let field = owner.resolve(&self.field).ok_or_else(|| {
            Error::invalid_statement(format!("no field `{}` in table `{}`", self.field, owner.table))
        })?;

        let relation = match (field.rel_kind(), &field.relation) {
            (Some(RelKind::ManyToMany | RelKind::ReverseMany), Some(relation)) => relation,
            _ => return Err(not_m2m(field)),
        };

        match (relation.through, relation.target, relation.pair, relation.target_link) {
            (Some(model), Some(target), Some(pair), Some(link)) => Ok(Junction {
                model,
                target,
                pair: schema.field(pair),
                link: schema.field(link),
            }),
            _ => Err(not_m2m(field)),
        }
    }

    fn check_target<T: Model>(&self) -> Result<ModelId> {
        let expected = self.junction()?.target;
        let actual = self.db.model_id::<T>()?;

        if expected != actual {
            return Err(Error::invalid_statement(format!(
                "`{}` is not the target of `{}`",
                self.db.schema().model(actual).full_name,
                self.field
            )));
        }

        Ok(expected)
    }
}

fn not_m2m(field: &Field) -> Error {
    Error::invalid_statement(format!(
        "field `{}` is not a many-to-many relation",
        field.full_name
    ))
}
