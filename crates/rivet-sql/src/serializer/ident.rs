use super::{Formatter, Params, Period, ToSql};

/// A quoted identifier.
pub(super) struct Ident<S>(pub(super) S);

/// A table name, qualified with its schema when it has one.
pub(super) struct TableName<'a> {
    pub(super) schema: Option<&'a str>,
    pub(super) table: &'a str,
}

/// `T<n>`, the alias of the `n`th table of a statement with joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct TableAlias(pub(super) usize);

/// A column, qualified with its table alias when the statement has joins.
pub(super) struct ColumnRef<'a> {
    pub(super) alias: Option<TableAlias>,
    pub(super) name: &'a str,
}

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let quote = f.serializer.flavor.quote();

        f.dst.push(quote);
        for c in self.0.as_ref().chars() {
            if c == quote {
                f.dst.push(quote);
            }
            f.dst.push(c);
        }
        f.dst.push(quote);
    }
}

impl ToSql for TableName<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let parts = self.schema.into_iter().chain(Some(self.table));
        fmt!(f, Period(parts.map(Ident)));
    }
}

impl ToSql for TableAlias {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "T", self.0);
    }
}

impl ToSql for ColumnRef<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, self.alias.map(|alias| (alias, ".")), Ident(self.name));
    }
}
