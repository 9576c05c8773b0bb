use super::{Comma, Formatter, Ident, Literal, Params, Serializer, ToSql};

use rivet_core::{
    schema::{Field, Model, ModelId},
    stmt::Value,
    Error, Result,
};

impl Serializer<'_> {
    /// DDL creating the model's table, preceded by its schema when the
    /// backend has schemas and followed by its indexes. One statement per
    /// entry.
    pub fn create_table(&self, model: impl Into<ModelId>, if_not_exists: bool) -> Result<Vec<String>> {
        let model = self.schema.model(model);
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        let mut params: Vec<Value> = vec![];
        let mut stmts = vec![];

        if let Some(schema) = &model.schema_name {
            if self.capability.schemas {
                stmts.push(self.serialize(&mut params, |f| {
                    fmt!(f, "CREATE SCHEMA ", guard, Ident(schema));
                    Ok(())
                })?);
            }
        }

        let columns = model
            .columns()
            .map(|field| {
                let ty = match field.rel_kind() {
                    Some(_) => self.flavor.column_type(self.schema.target(field).single_primary_key()?),
                    None => self.flavor.column_type(field),
                };
                Ok(ColumnDef {
                    field,
                    ty,
                    inline_key: model.primary_key.len() == 1 && field.primary_key,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if columns.is_empty() {
            return Err(Error::invalid_statement(format!(
                "table `{}` has no columns",
                model.table
            )));
        }

        stmts.push(self.serialize(&mut params, |f| {
            fmt!(f, "CREATE TABLE ", guard, f.serializer.table_name(model), " (");

            let mut s = "";
            for column in columns {
                fmt!(f, s, "\n    ", column);
                s = ",";
            }

            if model.primary_key.len() > 1 {
                let keys = model.primary_key_fields().map(|field| Ident(&field.column));
                fmt!(f, ",\n    PRIMARY KEY (", Comma(keys), ")");
            }

            for group in &model.unique_together {
                let columns = group_columns(model, group)?;
                fmt!(f, ",\n    UNIQUE (", Comma(columns.into_iter().map(Ident)), ")");
            }

            fmt!(f, "\n)");
            Ok(())
        })?);

        let guard = if if_not_exists && self.flavor.supports_index_if_not_exists() {
            guard
        } else {
            ""
        };

        for field in model.columns().filter(|field| field.index && !field.unique && !field.primary_key) {
            let name = format!("{}_{}", model.table, field.column);
            stmts.push(self.serialize(&mut params, |f| {
                fmt!(
                    f,
                    "CREATE INDEX ",
                    guard,
                    Ident(&name),
                    " ON ",
                    f.serializer.table_name(model),
                    " (",
                    Ident(&field.column),
                    ")"
                );
                Ok(())
            })?);
        }

        for index in &model.indexes {
            let columns = group_columns(model, &index.columns)?;
            let unique = if index.unique { "UNIQUE " } else { "" };
            let method = match (self.flavor.is_postgresql(), index.kind.is_empty()) {
                (true, false) => Some((" USING ", index.kind.as_str())),
                _ => None,
            };

            stmts.push(self.serialize(&mut params, |f| {
                fmt!(
                    f,
                    "CREATE ",
                    unique,
                    "INDEX ",
                    guard,
                    Ident(&index.name),
                    " ON ",
                    f.serializer.table_name(model),
                    method,
                    " (",
                    Comma(columns.into_iter().map(Ident)),
                    ")"
                );
                Ok(())
            })?);
        }

        Ok(stmts)
    }
}

/// `"name" type [constraints..]`
struct ColumnDef<'a> {
    field: &'a Field,
    ty: String,

    /// The column alone is the primary key
    inline_key: bool,
}

impl ToSql for ColumnDef<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let field = self.field;
        let flavor = f.serializer.flavor;
        let auto = field.auto_increment && self.inline_key;

        let ty = match flavor.auto_increment_type(field.kind) {
            Some(serial) if auto => serial.to_string(),
            _ => self.ty,
        };
        fmt!(f, Ident(&field.column), " ", ty);

        if auto {
            fmt!(f, flavor.auto_increment_prefix().map(|prefix| (" ", prefix)));
        }

        if field.primary_key || !field.nullable {
            fmt!(f, " NOT NULL");
        }

        if self.inline_key {
            fmt!(f, " PRIMARY KEY");

            if auto {
                fmt!(f, flavor.auto_increment_suffix().map(|suffix| (" ", suffix)));
            }
        } else if field.unique {
            fmt!(f, " UNIQUE");
        }

        if let Some(default) = &field.default {
            fmt!(f, " DEFAULT ", Literal(&default.value));
        }
    }
}

/// Column names of a group of field names.
fn group_columns<'a>(model: &'a Model, names: &[String]) -> Result<Vec<&'a str>> {
    names
        .iter()
        .map(|name| {
            model
                .resolve(name)
                .filter(|field| field.is_mapped())
                .map(|field| field.column.as_str())
                .ok_or_else(|| {
                    Error::invalid_statement(format!(
                        "no column `{name}` in table `{}`",
                        model.table
                    ))
                })
        })
        .collect()
}
