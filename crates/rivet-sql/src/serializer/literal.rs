use super::{Formatter, Params, ToSql};

use rivet_core::stmt::Value;

/// A value written inline as a SQL literal, used for column defaults.
pub(super) struct Literal<'a>(pub(super) &'a Value);

impl ToSql for Literal<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.0 {
            Value::Null => fmt!(f, "NULL"),
            Value::Bool(v) => fmt!(f, f.serializer.flavor.bool_literal(*v)),
            Value::I64(v) => fmt!(f, v.to_string()),
            Value::U64(v) => fmt!(f, *v),
            Value::F64(v) => fmt!(f, v.to_string()),
            Value::String(v) => Quoted(v).to_sql(f),
            Value::Date(v) => Quoted(&v.to_string()).to_sql(f),
            Value::Time(v) => Quoted(&v.to_string()).to_sql(f),
            Value::DateTime(v) => Quoted(&v.to_string()).to_sql(f),
            Value::Timestamp(v) => Quoted(&v.to_string()).to_sql(f),
            Value::Bytes(_) | Value::List(_) | Value::Model(_) => fmt!(f, "NULL"),
        }
    }
}

/// A single-quoted string literal.
struct Quoted<'a>(&'a str);

impl ToSql for Quoted<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push('\'');
        for c in self.0.chars() {
            if c == '\'' {
                f.dst.push('\'');
            }
            f.dst.push(c);
        }
        f.dst.push('\'');
    }
}
