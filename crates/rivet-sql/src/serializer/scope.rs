use super::{ColumnRef, Formatter, Params, TableAlias, ToSql};

use rivet_core::{
    schema::{Field, Model, RelKind},
    stmt::{Condition, Operator, Order},
    Error, Result, Schema,
};

/// The tables a statement reads from.
///
/// Always the model's own table. A two-segment `relation__field` path adds
/// a `LEFT OUTER JOIN` to the relation's target, through the junction table
/// for many-to-many relations. Once anything is joined, every table gets a
/// `T<n>` alias and every column is qualified with it; the model's own table
/// is `T0`.
pub(super) struct Scope<'a> {
    schema: &'a Schema,

    pub(super) model: &'a Model,

    /// Relations joined so far, with the alias of their target table
    joins: Vec<(&'a Field, &'a Model, TableAlias)>,

    /// Joined tables in the order they are written
    tables: Vec<JoinTable<'a>>,
}

/// `LEFT OUTER JOIN <model> <alias> ON <alias>.<column> = <other>`
struct JoinTable<'a> {
    model: &'a Model,
    alias: TableAlias,
    column: &'a str,
    other: (TableAlias, &'a str),
}

/// Splits the operator suffix off a lookup path.
pub(super) fn split_operator(path: &[String]) -> (&[String], Option<Operator>) {
    match path.split_last() {
        Some((last, rest)) => match Operator::parse(last) {
            Some(op) => (rest, Some(op)),
            None => (path, None),
        },
        None => (path, None),
    }
}

impl<'a> Scope<'a> {
    pub(super) fn new(schema: &'a Schema, model: &'a Model) -> Scope<'a> {
        Scope {
            schema,
            model,
            joins: vec![],
            tables: vec![],
        }
    }

    /// A scope with a join for every relation named by the filter, grouping
    /// and ordering paths.
    pub(super) fn for_query(
        schema: &'a Schema,
        model: &'a Model,
        cond: &Condition,
        group_by: &[Vec<String>],
        order_by: &[Order],
    ) -> Result<Scope<'a>> {
        let mut scope = Scope::new(schema, model);

        for lookup in cond.lookups() {
            let (path, _) = split_operator(&lookup.path);
            scope.add_path(path, &lookup.expr())?;
        }

        for path in group_by.iter().chain(order_by.iter().map(|order| &order.path)) {
            scope.add_path(path, &path.join(rivet_core::stmt::EXPR_SEP))?;
        }

        Ok(scope)
    }

    pub(super) fn is_joined(&self) -> bool {
        !self.joins.is_empty()
    }

    /// The alias of the model's own table, if aliases are in use.
    pub(super) fn base_alias(&self) -> Option<TableAlias> {
        self.is_joined().then_some(TableAlias(0))
    }

    /// Joins the relation named by the first segment of a two-segment path.
    pub(super) fn add_path(&mut self, path: &[String], expr: &str) -> Result<()> {
        match path {
            [] => Err(Error::invalid_statement("filter expression is empty")),
            [_] => Ok(()),
            [relation, _] => {
                let relation = self
                    .model
                    .resolve(relation)
                    .filter(|field| field.rel_kind().is_some())
                    .ok_or_else(|| unknown(expr))?;
                self.join(relation)
            }
            _ => Err(unknown(expr)),
        }
    }

    /// Resolves a path, operator already removed, to a column.
    pub(super) fn column(&self, path: &[String], expr: &str) -> Result<(ColumnRef<'a>, &'a Field)> {
        let (model, alias) = match path {
            [] => return Err(Error::invalid_statement("filter expression is empty")),
            [_] => (self.model, self.base_alias()),
            [relation, _] => {
                let relation = self.model.resolve(relation).ok_or_else(|| unknown(expr))?;
                let (_, target, alias) = self
                    .joins
                    .iter()
                    .find(|(field, ..)| field.id == relation.id)
                    .ok_or_else(|| unknown(expr))?;
                (*target, Some(*alias))
            }
            _ => return Err(unknown(expr)),
        };

        let name = &path[path.len() - 1];
        let field = model.resolve(name).ok_or_else(|| unknown(expr))?;

        if !field.is_mapped() {
            return Err(Error::invalid_statement(format!(
                "field `{}` has no column to compare, in `{expr}`",
                field.full_name
            )));
        }

        let column = ColumnRef {
            alias,
            name: &field.column,
        };
        Ok((column, field))
    }

    /// A column of the model's own table.
    pub(super) fn own_column(&self, field: &'a Field) -> ColumnRef<'a> {
        ColumnRef {
            alias: self.base_alias(),
            name: &field.column,
        }
    }

    fn join(&mut self, relation: &'a Field) -> Result<()> {
        if self.joins.iter().any(|(field, ..)| field.id == relation.id) {
            return Ok(());
        }

        let schema = self.schema;
        let rel = relation.expect_relation();
        let target = schema.target(relation);
        let base = TableAlias(0);

        match (rel.kind, rel.through) {
            (RelKind::ForeignKey | RelKind::OneToOne, _) => {
                let key = target.single_primary_key()?;
                let alias = self.push_table(target, &key.column, (base, &relation.column));
                self.joins.push((relation, target, alias));
            }
            (RelKind::ManyToMany | RelKind::ReverseMany, Some(through)) => {
                let junction = schema.model(through);
                let pair = schema.field(rel.pair.ok_or_else(|| unpaired(relation))?);
                let link = schema.field(rel.target_link.ok_or_else(|| unpaired(relation))?);
                let own_key = self.model.single_primary_key()?;
                let target_key = target.single_primary_key()?;

                let through_alias = self.push_table(junction, &pair.column, (base, &own_key.column));
                let alias = self.push_table(target, &target_key.column, (through_alias, &link.column));
                self.joins.push((relation, target, alias));
            }
            (RelKind::ReverseOne, _) | (RelKind::ReverseMany, None) => {
                let pair = schema.field(rel.pair.ok_or_else(|| unpaired(relation))?);
                let own_key = self.model.single_primary_key()?;
                let alias = self.push_table(target, &pair.column, (base, &own_key.column));
                self.joins.push((relation, target, alias));
            }
            (RelKind::ManyToMany, None) => return Err(unpaired(relation)),
        }

        Ok(())
    }

    fn push_table(&mut self, model: &'a Model, column: &'a str, other: (TableAlias, &'a str)) -> TableAlias {
        let alias = TableAlias(self.tables.len() + 1);
        self.tables.push(JoinTable {
            model,
            alias,
            column,
            other,
        });
        alias
    }
}

/// The `FROM` source: the model's table and, with joins, its alias.
pub(super) struct Source<'s, 'a>(pub(super) &'s Scope<'a>);

/// The `LEFT OUTER JOIN` clauses, each preceded by a space.
pub(super) struct Joins<'s, 'a>(pub(super) &'s Scope<'a>);

impl ToSql for Source<'_, '_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table = f.serializer.table_name(self.0.model);
        fmt!(f, table, self.0.base_alias().map(|alias| (" ", alias)));
    }
}

impl ToSql for Joins<'_, '_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        for table in &self.0.tables {
            let name = f.serializer.table_name(table.model);
            let column = ColumnRef {
                alias: Some(table.alias),
                name: table.column,
            };
            let other = ColumnRef {
                alias: Some(table.other.0),
                name: table.other.1,
            };
            fmt!(f, " LEFT OUTER JOIN ", name, " ", table.alias, " ON ", column, " = ", other);
        }
    }
}

fn unknown(expr: &str) -> Error {
    Error::invalid_statement(format!("unknown field/column name `{expr}`"))
}

fn unpaired(relation: &Field) -> Error {
    Error::invalid_statement(format!(
        "relation `{}` is not linked; was the schema bootstrapped?",
        relation.full_name
    ))
}
