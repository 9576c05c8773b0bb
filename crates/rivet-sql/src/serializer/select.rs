use super::{
    scope::{Joins, Source},
    Comma, Flavor, Ident, Scope, Serializer, Statement, ToSql,
};

use rivet_core::{
    stmt::{Query, Value, EXPR_SEP},
    Error, Result,
};

/// The clauses of a `SELECT`, serialized independently and assembled in a
/// fixed order: `SELECT`, `FROM` and its joins, `WHERE`, `GROUP BY`,
/// `ORDER BY`, then `LIMIT` and `OFFSET`.
///
/// Clauses hold their SQL without the leading keyword. An empty clause is
/// left out of the statement altogether.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    pub distinct: bool,

    /// The select list
    pub columns: String,

    /// The source table, with its alias when there are joins
    pub from: String,

    /// Join clauses following `FROM`, each starting with a space
    pub joins: String,

    /// Predicates that come with a join. Written before `filter`.
    pub join_filter: String,

    pub filter: String,
    pub group_by: String,
    pub order_by: String,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Select {
    pub fn to_sql(&self, flavor: Flavor) -> String {
        let mut sql = String::from("SELECT ");

        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        sql.push_str(&self.columns);
        sql.push_str(" FROM ");
        sql.push_str(&self.from);
        sql.push_str(&self.joins);

        match (self.join_filter.is_empty(), self.filter.is_empty()) {
            (true, true) => {}
            (false, true) => {
                sql.push_str(" WHERE ");
                sql.push_str(&self.join_filter);
            }
            (true, false) => {
                sql.push_str(" WHERE ");
                sql.push_str(&self.filter);
            }
            (false, false) => {
                sql.push_str(" WHERE ");
                sql.push_str(&self.join_filter);
                sql.push_str(" AND (");
                sql.push_str(&self.filter);
                sql.push(')');
            }
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by);
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by);
        }

        match (self.limit, self.offset) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(_)) => {
                if let Some(unbounded) = flavor.unbounded_limit() {
                    sql.push(' ');
                    sql.push_str(unbounded);
                }
            }
            (None, None) => {}
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }
}

impl Serializer<'_> {
    /// `SELECT` of every mapped column of the queried model.
    pub fn select(&self, query: &Query) -> Result<Statement> {
        let model = self.schema.model(query.model);
        let scope = self.scope(query)?;
        let mut params = vec![];

        let mut select = self.clauses(query, &scope, &mut params)?;
        select.columns = self.serialize(&mut params, |f| {
            fmt!(f, Comma(model.columns().map(|field| scope.own_column(field))));
            Ok(())
        })?;

        Ok(Statement {
            sql: select.to_sql(self.flavor),
            params,
        })
    }

    /// `SELECT COUNT(*)` over the query. Ordering and paging do not apply.
    /// A grouped count counts the groups.
    pub fn count(&self, query: &Query) -> Result<Statement> {
        let scope = self.scope(query)?;
        let mut params = vec![];

        let mut select = self.clauses(query, &scope, &mut params)?;
        select.columns = "COUNT(*)".to_string();
        select.distinct = false;
        select.order_by.clear();
        select.limit = None;
        select.offset = None;

        let mut sql = select.to_sql(self.flavor);
        if !select.group_by.is_empty() {
            sql = format!("SELECT COUNT(*) FROM ({sql}) AS T");
        }

        Ok(Statement { sql, params })
    }

    /// `UPDATE` of every row the query's filter matches.
    pub fn update(&self, query: &Query, values: &[(String, Value)]) -> Result<Statement> {
        let model = self.schema.model(query.model);
        let scope = self.bulk_scope(query, "update")?;

        if values.is_empty() {
            return Err(Error::invalid_statement(format!(
                "no columns to update in table `{}`",
                model.table
            )));
        }

        let mut assignments = Vec::with_capacity(values.len());
        for (name, value) in values {
            let field = model
                .resolve(name)
                .filter(|field| field.is_mapped())
                .ok_or_else(|| {
                    Error::invalid_statement(format!(
                        "no field `{name}` in table `{}`",
                        model.table
                    ))
                })?;
            assignments.push((field, self.to_param(field, value)?));
        }

        let mut params = vec![];
        let sql = self.serialize(&mut params, |f| {
            fmt!(f, "UPDATE ", f.serializer.table_name(model), " SET ");

            let mut s = "";
            for (field, value) in assignments {
                let placeholder = f.param(value);
                fmt!(f, s, Ident(&field.column), " = ", placeholder);
                s = ", ";
            }

            if !query.cond.is_empty() {
                fmt!(f, " WHERE ");
                f.condition(&scope, &query.cond)?;
            }
            Ok(())
        })?;

        Ok(Statement { sql, params })
    }

    /// `DELETE` of every row the query's filter matches.
    pub fn delete(&self, query: &Query) -> Result<Statement> {
        let model = self.schema.model(query.model);
        let scope = self.bulk_scope(query, "delete")?;

        let mut params = vec![];
        let sql = self.serialize(&mut params, |f| {
            fmt!(f, "DELETE FROM ", f.serializer.table_name(model));

            if !query.cond.is_empty() {
                fmt!(f, " WHERE ");
                f.condition(&scope, &query.cond)?;
            }
            Ok(())
        })?;

        Ok(Statement { sql, params })
    }

    fn scope(&self, query: &Query) -> Result<Scope<'_>> {
        let model = self.schema.model(query.model);
        Scope::for_query(
            self.schema,
            model,
            &query.cond,
            &query.group_by,
            &query.order_by,
        )
    }

    /// Bulk writes address a single table and cannot follow relations.
    fn bulk_scope(&self, query: &Query, op: &str) -> Result<Scope<'_>> {
        let scope = Scope::for_query(
            self.schema,
            self.schema.model(query.model),
            &query.cond,
            &[],
            &[],
        )?;

        if scope.is_joined() {
            return Err(Error::invalid_statement(format!(
                "bulk {op} on `{}` cannot filter through relations",
                scope.model.table
            )));
        }

        Ok(scope)
    }

    /// Serializes the clauses shared by every read of a query.
    fn clauses(&self, query: &Query, scope: &Scope<'_>, params: &mut Vec<Value>) -> Result<Select> {
        let from = self.serialize(params, |f| {
            fmt!(f, Source(scope));
            Ok(())
        })?;

        let joins = self.serialize(params, |f| {
            fmt!(f, Joins(scope));
            Ok(())
        })?;

        let filter = self.serialize(params, |f| f.condition(scope, &query.cond))?;

        let group_by = self.serialize(params, |f| {
            let mut s = "";
            for path in &query.group_by {
                let (column, _) = scope.column(path, &path.join(EXPR_SEP))?;
                fmt!(f, s, column);
                s = ", ";
            }
            Ok(())
        })?;

        let order_by = self.serialize(params, |f| {
            let mut s = "";
            for order in &query.order_by {
                let (column, _) = scope.column(&order.path, &order.path.join(EXPR_SEP))?;
                let direction = if order.descending { " DESC" } else { " ASC" };
                fmt!(f, s, column, direction);
                s = ", ";
            }
            Ok(())
        })?;

        Ok(Select {
            distinct: query.distinct,
            columns: String::new(),
            from,
            joins,
            join_filter: String::new(),
            filter,
            group_by,
            order_by,
            limit: query.limit,
            offset: query.offset,
        })
    }
}
