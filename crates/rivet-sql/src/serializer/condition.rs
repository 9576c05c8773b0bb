use super::{scope::split_operator, Formatter, Params, Scope, Serializer, Statement, ToSql};

use rivet_core::{
    schema::ModelId,
    stmt::{Condition, Conjunction, FromValue, Lookup, Operator, TermExpr, Value},
    Error, Result,
};

impl Serializer<'_> {
    /// Compiles a condition on `model` into a `WHERE` clause.
    ///
    /// An empty condition compiles to empty SQL. Paths may name a column of
    /// the model or, as `relation__field`, a column of a related model; the
    /// clause then qualifies columns with table aliases and is meant to
    /// follow a `FROM` that joins the same relations.
    pub fn filter(&self, model: impl Into<ModelId>, cond: &Condition) -> Result<Statement> {
        let model = self.schema.model(model);
        let scope = Scope::for_query(self.schema, model, cond, &[], &[])?;

        let mut params = vec![];
        let sql = self.serialize(&mut params, |f| {
            if !cond.is_empty() {
                fmt!(f, "WHERE ");
                f.condition(&scope, cond)?;
            }
            Ok(())
        })?;

        Ok(Statement { sql, params })
    }
}

impl<P: Params<Param = Value>> Formatter<'_, P> {
    /// Writes the terms of `cond`, without a `WHERE` keyword. Nested
    /// conditions are parenthesized; empty ones are left out entirely.
    pub(super) fn condition(&mut self, scope: &Scope<'_>, cond: &Condition) -> Result<()> {
        let mut first = true;

        for term in cond.terms() {
            if let TermExpr::Nested(nested) = &term.expr {
                if nested.is_empty() {
                    continue;
                }
            }

            if !first {
                fmt!(
                    self,
                    match term.conjunction {
                        Conjunction::And => " AND ",
                        Conjunction::Or => " OR ",
                    }
                );
            }
            first = false;

            if term.negated {
                fmt!(self, "NOT ");
            }

            match &term.expr {
                TermExpr::Lookup(lookup) => self.lookup(scope, lookup)?,
                TermExpr::Nested(nested) => {
                    fmt!(self, "(");
                    self.condition(scope, nested)?;
                    fmt!(self, ")");
                }
            }
        }

        Ok(())
    }

    fn lookup(&mut self, scope: &Scope<'_>, lookup: &Lookup) -> Result<()> {
        let expr = lookup.expr();
        let (path, op) = split_operator(&lookup.path);
        let op = op.unwrap_or(Operator::Exact);
        let (column, field) = scope.column(path, &expr)?;

        let mut args = self.serializer.flatten(field, &lookup.arg)?;
        let keyword = op.keyword();

        if args.is_empty() {
            return Err(Error::invalid_statement(format!(
                "operator `{keyword}` need at least one args"
            )));
        }

        let comparison = match op {
            Operator::In => Comparison::In(args),
            Operator::Between => match <[Value; 2]>::try_from(args) {
                Ok([low, high]) => Comparison::Between(low, high),
                Err(args) => {
                    return Err(Error::invalid_statement(format!(
                        "operator `{keyword}` need 2 args not {}",
                        args.len()
                    )))
                }
            },
            _ if args.len() > 1 => {
                return Err(Error::invalid_statement(format!(
                    "operator `{keyword}` need 1 args not {}",
                    args.len()
                )))
            }
            Operator::IsNull => match args[0].as_bool() {
                Some(true) => Comparison::Keyword("IS NULL"),
                Some(false) => Comparison::Keyword("IS NOT NULL"),
                None => {
                    return Err(Error::invalid_statement(format!(
                        "operator `{keyword}` need a bool value not `{}`",
                        args[0].kind_name()
                    )))
                }
            },
            Operator::Exact if args[0].is_null() => Comparison::Keyword("IS NULL"),
            op => {
                let arg = args.remove(0);
                let arg = if op.is_pattern() {
                    pattern(op, arg, self.serializer.flavor.is_like(op))?
                } else {
                    arg
                };
                Comparison::Single(op, arg)
            }
        };

        if self.serializer.flavor.upper_column(op) {
            fmt!(self, "UPPER(", column, ") ");
        } else {
            fmt!(self, column, " ");
        }

        match comparison {
            Comparison::Keyword(keyword) => fmt!(self, keyword),
            Comparison::In(args) => {
                fmt!(self, "IN (");
                let mut s = "";
                for arg in args {
                    let placeholder = self.param(arg);
                    fmt!(self, s, placeholder);
                    s = ", ";
                }
                fmt!(self, ")");
            }
            Comparison::Between(low, high) => {
                let low = self.param(low);
                fmt!(self, "BETWEEN ", low, " AND ");
                let high = self.param(high);
                fmt!(self, high);
            }
            Comparison::Single(op, arg) => {
                let (before, after) = self.serializer.flavor.operator(op);
                let placeholder = self.param(arg);
                fmt!(self, before, placeholder, after);
            }
        }

        Ok(())
    }
}

/// A validated comparison, ready to be written after its column.
enum Comparison {
    /// No bound parameter, e.g. `IS NULL`
    Keyword(&'static str),
    In(Vec<Value>),
    Between(Value, Value),
    Single(Operator, Value),
}

/// Escapes `%` in a `LIKE` argument and adds the wildcards the operator
/// calls for. An argument compared with `=` is left as is.
fn pattern(op: Operator, arg: Value, like: bool) -> Result<Value> {
    let kind = arg.kind_name();
    let raw = String::from_value(arg).map_err(|_| {
        Error::invalid_statement(format!(
            "operator `{}` need a string value not `{kind}`",
            op.keyword()
        ))
    })?;
    let escaped = if like { raw.replace('%', "\\%") } else { raw };

    Ok(Value::String(match op {
        Operator::Contains | Operator::IContains => format!("%{escaped}%"),
        Operator::StartsWith | Operator::IStartsWith => format!("{escaped}%"),
        Operator::EndsWith | Operator::IEndsWith => format!("%{escaped}"),
        _ => escaped,
    }))
}
