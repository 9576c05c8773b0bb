use super::{Comma, ColumnRef, Formatter, Ident, Literal, Select, Serializer, TableAlias, ToSql};

use rivet_core::{
    schema::{
        plan::{AutoIncrement, BindPlan, PlanArg, PlanColumn, PlanKey},
        Field, FieldKind, Model, ModelId, RelKind,
    },
    stmt::{Record, Value},
    Error, Result,
};
use std::sync::Arc;

impl Serializer<'_> {
    /// The plan inserting one record.
    ///
    /// Columns with a configured default are written as literals. An
    /// auto-increment key is left to the database, either omitted or given
    /// the backend's placeholder literal.
    pub fn insert_plan(&self, model: impl Into<ModelId>) -> Result<Arc<BindPlan>> {
        let model = self.schema.model(model);

        self.cached(model, PlanKey::Insert, || {
            let auto = model.auto_increment_field();
            let mut params = vec![];
            let mut auto_increment = None;

            let sql = self.serialize(&mut params, |f| {
                fmt!(f, "INSERT INTO ", f.serializer.table_name(model));

                let mut names = String::new();
                let mut values = String::new();

                let mut written = 0;

                for field in model.columns() {
                    let value = if field.auto_increment {
                        let literal = f.serializer.capability.auto_increment_bind_value;
                        auto_increment = Some(AutoIncrement {
                            index: literal.map(|_| written),
                            field: field.name.clone(),
                        });

                        match literal {
                            Some(literal) => literal.to_string(),
                            None => continue,
                        }
                    } else if let Some(default) = &field.default {
                        f.nested(|f| fmt!(f, Literal(&default.value)))
                    } else if model.version == Some(field.id.index) {
                        f.nested(|f| {
                            let placeholder = f.param(PlanArg::NextVersion(field.name.clone()));
                            fmt!(f, placeholder);
                        })
                    } else {
                        f.nested(|f| {
                            let placeholder = f.param(PlanArg::Field(field.name.clone()));
                            fmt!(f, placeholder);
                        })
                    };

                    if !names.is_empty() {
                        names.push_str(", ");
                        values.push_str(", ");
                    }
                    names.push_str(&f.nested(|f| fmt!(f, Ident(&field.column))));
                    values.push_str(&value);
                    written += 1;
                }

                if names.is_empty() {
                    if f.serializer.flavor.is_mysql() {
                        fmt!(f, " () VALUES ()");
                    } else {
                        fmt!(f, " DEFAULT VALUES");
                    }
                } else {
                    fmt!(f, " (", names, ") VALUES (", values, ")");
                }

                if let Some(auto) = auto {
                    if f.serializer.capability.returning_insert {
                        fmt!(f, " RETURNING ", Ident(&auto.column));
                    }
                }

                Ok(())
            })?;

            Ok(BindPlan {
                sql,
                params,
                keys: key_names(model),
                version: model.version_field().map(|field| field.name.clone()),
                auto_increment,
                columns: vec![],
            })
        })
    }

    /// The plan updating one record by primary key.
    ///
    /// With `fields` only those fields are written; otherwise every mapped
    /// field but the key. A versioned model always bumps its version and
    /// matches on the current one.
    pub fn update_plan(&self, model: impl Into<ModelId>, fields: Option<&[&str]>) -> Result<Arc<BindPlan>> {
        let model = self.schema.model(model);

        if model.primary_key.is_empty() {
            return Err(Error::invalid_statement(format!(
                "cannot update `{}` without a primary key",
                model.full_name
            )));
        }

        let version = model.version_field();
        let is_settable = |field: &&Field| {
            field.is_mapped() && !field.primary_key && !version.is_some_and(|v| v.id == field.id)
        };

        let (key, set) = match fields {
            None => (PlanKey::Update, model.columns().filter(is_settable).collect::<Vec<_>>()),
            Some(names) => {
                let mut selected = Vec::with_capacity(names.len());
                for name in names {
                    let field = model.resolve(name).ok_or_else(|| {
                        Error::invalid_statement(format!(
                            "no field `{name}` in table `{}`",
                            model.table
                        ))
                    })?;
                    if is_settable(&field) {
                        selected.push(field);
                    }
                }

                // Model order, so the plan does not depend on argument order
                selected.sort_by_key(|field| field.id.index);
                selected.dedup_by_key(|field| field.id.index);

                let key = PlanKey::PartialUpdate(selected.iter().map(|field| field.name.clone()).collect());
                (key, selected)
            }
        };

        if set.is_empty() {
            return Err(Error::invalid_statement(format!(
                "no columns to update in table `{}`",
                model.table
            )));
        }

        self.cached(model, key, || {
            let mut params = vec![];

            let sql = self.serialize(&mut params, |f| {
                fmt!(f, "UPDATE ", f.serializer.table_name(model), " SET ");

                let mut s = "";
                for field in &set {
                    let placeholder = f.param(PlanArg::Field(field.name.clone()));
                    fmt!(f, s, Ident(&field.column), " = ", placeholder);
                    s = ", ";
                }

                if let Some(version) = version {
                    let placeholder = f.param(PlanArg::NextVersion(version.name.clone()));
                    fmt!(f, ", ", Ident(&version.column), " = ", placeholder);
                }

                f.key_filter(model);
                Ok(())
            })?;

            Ok(BindPlan {
                sql,
                params,
                keys: key_names(model),
                version: version.map(|field| field.name.clone()),
                auto_increment: None,
                columns: vec![],
            })
        })
    }

    /// The plan deleting one record by primary key, and current version
    /// when the model has one.
    pub fn delete_plan(&self, model: impl Into<ModelId>) -> Result<Arc<BindPlan>> {
        let model = self.schema.model(model);
        require_key(model, "delete")?;

        self.cached(model, PlanKey::Delete, || {
            let mut params = vec![];

            let sql = self.serialize(&mut params, |f| {
                fmt!(f, "DELETE FROM ", f.serializer.table_name(model));
                f.key_filter(model);
                Ok(())
            })?;

            Ok(BindPlan {
                sql,
                params,
                keys: key_names(model),
                version: model.version_field().map(|field| field.name.clone()),
                auto_increment: None,
                columns: vec![],
            })
        })
    }

    /// The plan loading one record by primary key.
    pub fn get_plan(&self, model: impl Into<ModelId>) -> Result<Arc<BindPlan>> {
        let model = self.schema.model(model);
        require_key(model, "get")?;

        self.cached(model, PlanKey::Get, || {
            let mut params = vec![];

            let sql = self.serialize(&mut params, |f| {
                fmt!(
                    f,
                    "SELECT ",
                    Comma(model.columns().map(|field| Ident(&field.column))),
                    " FROM ",
                    f.serializer.table_name(model),
                    " WHERE "
                );

                let mut s = "";
                for field in model.primary_key_fields() {
                    let placeholder = f.param(PlanArg::Field(field.name.clone()));
                    fmt!(f, s, Ident(&field.column), " = ", placeholder);
                    s = " AND ";
                }
                Ok(())
            })?;

            Ok(BindPlan {
                sql,
                params,
                keys: key_names(model),
                version: model.version_field().map(|field| field.name.clone()),
                auto_increment: None,
                columns: plan_columns(model),
            })
        })
    }

    /// The plan inserting `rows` junction rows linking an owner to related
    /// records through the many-to-many field `field`.
    pub fn m2m_insert_plan(&self, model: impl Into<ModelId>, field: &str, rows: usize) -> Result<Arc<BindPlan>> {
        let model = self.schema.model(model);
        let link = self.m2m_link(model, field)?;

        if rows == 0 {
            return Err(Error::invalid_statement(format!(
                "no related records to add to `{}`",
                link.field.full_name
            )));
        }

        let key = PlanKey::M2mInsert {
            field: link.field.id.index,
            rows,
        };

        self.cached(model, key, || {
            let mut params = vec![];

            let sql = self.serialize(&mut params, |f| {
                fmt!(
                    f,
                    "INSERT INTO ",
                    f.serializer.table_name(link.junction),
                    " (",
                    Ident(&link.pair.column),
                    ", ",
                    Ident(&link.target_link.column),
                    ") VALUES "
                );

                let mut s = "";
                for row in 0..rows {
                    let owner = f.param(PlanArg::Field(link.owner_key.name.clone()));
                    let target = f.param(PlanArg::Target {
                        row,
                        key: link.target_key.name.clone(),
                    });
                    fmt!(f, s, "(", owner, ", ", target, ")");
                    s = ", ";
                }
                Ok(())
            })?;

            Ok(BindPlan {
                sql,
                params,
                keys: vec![link.owner_key.name.clone()],
                version: None,
                auto_increment: None,
                columns: vec![],
            })
        })
    }

    /// The plan selecting the records related to an owner through the
    /// many-to-many field `field`.
    pub fn m2m_query_plan(&self, model: impl Into<ModelId>, field: &str) -> Result<Arc<BindPlan>> {
        let model = self.schema.model(model);
        let link = self.m2m_link(model, field)?;
        let key = PlanKey::M2mQuery {
            field: link.field.id.index,
        };

        self.cached(model, key, || {
            let target = link.target;
            let (base, junction) = (TableAlias(0), TableAlias(1));
            let mut params = vec![];

            let columns = self.serialize(&mut params, |f| {
                fmt!(
                    f,
                    Comma(target.columns().map(|field| ColumnRef {
                        alias: Some(base),
                        name: &field.column,
                    }))
                );
                Ok(())
            })?;

            let from = self.serialize(&mut params, |f| {
                fmt!(f, f.serializer.table_name(target), " ", base);
                Ok(())
            })?;

            let joins = self.serialize(&mut params, |f| {
                fmt!(
                    f,
                    " LEFT OUTER JOIN ",
                    f.serializer.table_name(link.junction),
                    " ",
                    junction,
                    " ON ",
                    ColumnRef {
                        alias: Some(junction),
                        name: &link.target_link.column,
                    },
                    " = ",
                    ColumnRef {
                        alias: Some(base),
                        name: &link.target_key.column,
                    }
                );
                Ok(())
            })?;

            let join_filter = self.serialize(&mut params, |f| {
                let placeholder = f.param(PlanArg::Field(link.owner_key.name.clone()));
                fmt!(
                    f,
                    ColumnRef {
                        alias: Some(junction),
                        name: &link.pair.column,
                    },
                    " = ",
                    placeholder
                );
                Ok(())
            })?;

            let select = Select {
                columns,
                from,
                joins,
                join_filter,
                ..Select::default()
            };

            Ok(BindPlan {
                sql: select.to_sql(self.flavor),
                params,
                keys: vec![link.owner_key.name.clone()],
                version: None,
                auto_increment: None,
                columns: plan_columns(target),
            })
        })
    }

    /// Resolves a plan's parameters against a record.
    ///
    /// `targets` are the related records of a many-to-many insert, in row
    /// order; other plans take none.
    pub fn bind(
        &self,
        model: impl Into<ModelId>,
        plan: &BindPlan,
        record: &dyn Record,
        targets: &[&dyn Record],
    ) -> Result<Vec<Value>> {
        let model = self.schema.model(model);

        plan.params
            .iter()
            .map(|arg| match arg {
                PlanArg::Field(name) => {
                    let field = bound_field(model, name)?;
                    let value = record.get(name).ok_or_else(|| {
                        Error::invalid_statement(format!(
                            "record of `{}` has no value for field `{name}`",
                            model.full_name
                        ))
                    })?;
                    self.to_param(field, &value)
                }
                PlanArg::NextVersion(name) => {
                    let current = record.get(name).unwrap_or(Value::Null);
                    let current = match &current {
                        Value::Null => 0,
                        value => value.as_i64().ok_or_else(|| {
                            Error::invalid_statement(format!(
                                "version field `{name}` of `{}` is not an integer: `{}`",
                                model.full_name,
                                value.kind_name()
                            ))
                        })?,
                    };
                    Ok(Value::I64(current + 1))
                }
                PlanArg::Target { row, key } => {
                    let value = targets
                        .get(*row)
                        .and_then(|target| target.get(key))
                        .filter(|value| !value.is_null())
                        .ok_or_else(|| {
                            Error::invalid_statement(format!(
                                "related record {row} has no primary key value `{key}`"
                            ))
                        })?;
                    Ok(value)
                }
            })
            .collect()
    }

    fn cached(&self, model: &Model, key: PlanKey, init: impl FnOnce() -> Result<BindPlan>) -> Result<Arc<BindPlan>> {
        let backend = self.capability.backend;
        model.plans.get_or_try_init(backend, &key, || {
            let plan = init()?;
            tracing::debug!(model = %model.full_name, ?backend, op = ?key, sql = %plan.sql, "generated bind plan");
            Ok(plan)
        })
    }

    fn m2m_link<'s>(&'s self, model: &'s Model, name: &str) -> Result<M2mLink<'s>> {
        let field = model.resolve(name).ok_or_else(|| {
            Error::invalid_statement(format!("no field `{name}` in table `{}`", model.table))
        })?;

        let relation = match (field.rel_kind(), &field.relation) {
            (Some(RelKind::ManyToMany | RelKind::ReverseMany), Some(relation)) if relation.through.is_some() => {
                relation
            }
            _ => {
                return Err(Error::invalid_statement(format!(
                    "field `{}` is not a many-to-many relation",
                    field.full_name
                )))
            }
        };

        let unlinked = || {
            Error::invalid_statement(format!(
                "relation `{}` is not linked; was the schema bootstrapped?",
                field.full_name
            ))
        };

        let target = self.schema.target(field);

        Ok(M2mLink {
            field,
            target,
            junction: self.schema.model(relation.expect_through()),
            pair: self.schema.field(relation.pair.ok_or_else(unlinked)?),
            target_link: self.schema.field(relation.target_link.ok_or_else(unlinked)?),
            owner_key: model.single_primary_key()?,
            target_key: target.single_primary_key()?,
        })
    }
}

impl<P: super::Params<Param = PlanArg>> Formatter<'_, P> {
    /// ` WHERE pk = ? [AND version = ?]`
    fn key_filter(&mut self, model: &Model) {
        fmt!(self, " WHERE ");

        let mut s = "";
        for field in model.primary_key_fields() {
            let placeholder = self.param(PlanArg::Field(field.name.clone()));
            fmt!(self, s, Ident(&field.column), " = ", placeholder);
            s = " AND ";
        }

        if let Some(version) = model.version_field() {
            let placeholder = self.param(PlanArg::Field(version.name.clone()));
            fmt!(self, " AND ", Ident(&version.column), " = ", placeholder);
        }
    }
}

/// The tables and columns a many-to-many field spans.
struct M2mLink<'a> {
    field: &'a Field,
    target: &'a Model,
    junction: &'a Model,

    /// Junction column pointing at the owner
    pair: &'a Field,

    /// Junction column pointing at the target
    target_link: &'a Field,

    owner_key: &'a Field,
    target_key: &'a Field,
}

fn key_names(model: &Model) -> Vec<String> {
    model.primary_key_fields().map(|field| field.name.clone()).collect()
}

fn plan_columns(model: &Model) -> Vec<PlanColumn> {
    model
        .columns()
        .map(|field| PlanColumn {
            column: field.column.clone(),
            field: field.name.clone(),
        })
        .collect()
}

fn require_key(model: &Model, op: &str) -> Result<()> {
    if model.primary_key.is_empty() {
        return Err(Error::invalid_statement(format!(
            "cannot {op} `{}` without a primary key",
            model.full_name
        )));
    }
    Ok(())
}

/// The field a plan binds by name. Relation fields bind the related key.
fn bound_field<'a>(model: &'a Model, name: &str) -> Result<&'a Field> {
    model
        .field_by_name(name)
        .filter(|field| !matches!(field.kind, FieldKind::Relation(RelKind::ManyToMany)))
        .ok_or_else(|| {
            Error::invalid_statement(format!(
                "no field `{name}` in table `{}`",
                model.table
            ))
        })
}
