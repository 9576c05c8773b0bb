use super::Serializer;

use jiff::tz::TimeZone;
use rivet_core::{
    driver::{Backend, Capability},
    schema::{Field, FieldKind},
    stmt::Operator,
    Schema,
};

/// The SQL dialect a statement is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

impl<'a> Serializer<'a> {
    pub fn sqlite(schema: &'a Schema) -> Serializer<'a> {
        Serializer::new(schema, &Capability::SQLITE)
    }

    pub fn postgresql(schema: &'a Schema) -> Serializer<'a> {
        Serializer::new(schema, &Capability::POSTGRESQL)
    }

    pub fn mysql(schema: &'a Schema) -> Serializer<'a> {
        Serializer::new(schema, &Capability::MYSQL)
    }

    /// A serializer for the backend a connection reports.
    pub fn for_capability(schema: &'a Schema, capability: &'static Capability) -> Serializer<'a> {
        Serializer::new(schema, capability)
    }

    fn new(schema: &'a Schema, capability: &'static Capability) -> Serializer<'a> {
        Serializer {
            schema,
            flavor: Flavor::from(capability.backend),
            capability,
            time_zone: TimeZone::UTC,
        }
    }

    /// Sets the time zone timestamps are converted into before binding.
    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }
}

impl From<Backend> for Flavor {
    fn from(backend: Backend) -> Flavor {
        match backend {
            Backend::Sqlite => Flavor::Sqlite,
            Backend::Postgresql => Flavor::Postgresql,
            Backend::Mysql => Flavor::Mysql,
        }
    }
}

impl Flavor {
    pub fn is_sqlite(self) -> bool {
        matches!(self, Flavor::Sqlite)
    }

    pub fn is_postgresql(self) -> bool {
        matches!(self, Flavor::Postgresql)
    }

    pub fn is_mysql(self) -> bool {
        matches!(self, Flavor::Mysql)
    }

    pub(super) fn quote(self) -> char {
        match self {
            Flavor::Mysql => '`',
            Flavor::Postgresql | Flavor::Sqlite => '"',
        }
    }

    /// SQL written before and after the placeholder of a single-argument
    /// comparison.
    ///
    /// Case-insensitive matching is left to the backend: SQLite's `LIKE` is
    /// case-insensitive already, MySQL's depends on the collation unless
    /// `BINARY` is given, and PostgreSQL upper-cases both sides.
    pub(super) fn operator(self, op: Operator) -> (&'static str, &'static str) {
        use Operator::*;

        match (self, op) {
            (_, Exact | Eq) => ("= ", ""),
            (_, Ne) => ("!= ", ""),
            (_, Gt) => ("> ", ""),
            (_, Gte) => (">= ", ""),
            (_, Lt) => ("< ", ""),
            (_, Lte) => ("<= ", ""),

            (Flavor::Sqlite, IExact | Contains | IContains)
            | (Flavor::Sqlite, StartsWith | EndsWith | IStartsWith | IEndsWith) => {
                ("LIKE ", " ESCAPE '\\'")
            }

            (Flavor::Mysql, Contains | StartsWith | EndsWith) => ("LIKE BINARY ", ""),
            (Flavor::Mysql, IExact | IContains | IStartsWith | IEndsWith) => ("LIKE ", ""),

            (Flavor::Postgresql, IExact) => ("= UPPER(", ")"),
            (Flavor::Postgresql, Contains | StartsWith | EndsWith) => ("LIKE ", ""),
            (Flavor::Postgresql, IContains | IStartsWith | IEndsWith) => ("LIKE UPPER(", ")"),

            // Multi-argument and argument-free operators are written by the
            // condition compiler itself.
            (_, In | Between | IsNull) => ("", ""),
        }
    }

    /// Whether `op` is written as a `LIKE` match, so its argument is a pattern.
    pub(super) fn is_like(self, op: Operator) -> bool {
        self.operator(op).0.starts_with("LIKE")
    }

    /// Whether the column side of a comparison is wrapped in `UPPER(..)`.
    pub(super) fn upper_column(self, op: Operator) -> bool {
        self.is_postgresql() && op.is_case_insensitive()
    }

    /// Column type for a field. Relation columns take the type of the key
    /// they reference, passed as `field`.
    pub(super) fn column_type(self, field: &Field) -> String {
        use FieldKind::*;

        let ty = match (self, field.kind) {
            (_, Boolean) => "bool",
            (_, Char) => return format!("varchar({})", field.size.unwrap_or(255)),
            (_, Text) => "text",
            (Flavor::Sqlite, Json | Jsonb) => "text",
            (Flavor::Mysql, Json | Jsonb) => "json",
            (Flavor::Postgresql, Json) => "json",
            (Flavor::Postgresql, Jsonb) => "jsonb",
            (_, Date) => "date",
            (_, Time) => "time",
            (Flavor::Postgresql, DateTime) => "timestamp",
            (_, DateTime) => "datetime",

            (
                Flavor::Sqlite,
                Bit | SmallInteger | Integer | BigInteger | PositiveBit | PositiveSmallInteger
                | PositiveInteger | PositiveBigInteger,
            ) => "integer",
            (Flavor::Postgresql, Bit | PositiveBit | SmallInteger) => "smallint",
            (Flavor::Postgresql, Integer | PositiveSmallInteger) => "integer",
            (Flavor::Postgresql, BigInteger | PositiveInteger | PositiveBigInteger) => "bigint",
            (Flavor::Mysql, Bit) => "tinyint",
            (Flavor::Mysql, SmallInteger) => "smallint",
            (Flavor::Mysql, Integer) => "integer",
            (Flavor::Mysql, BigInteger) => "bigint",
            (Flavor::Mysql, PositiveBit) => "tinyint unsigned",
            (Flavor::Mysql, PositiveSmallInteger) => "smallint unsigned",
            (Flavor::Mysql, PositiveInteger) => "integer unsigned",
            (Flavor::Mysql, PositiveBigInteger) => "bigint unsigned",

            (Flavor::Sqlite, Float) => "real",
            (_, Float) => "double precision",

            (_, Decimal) => {
                let name = if self.is_sqlite() { "decimal" } else { "numeric" };
                return format!(
                    "{name}({}, {})",
                    field.digits.unwrap_or(10),
                    field.decimals.unwrap_or(0)
                );
            }

            // Callers pass the referenced key instead
            (_, Relation(_)) => "integer",
        };

        ty.to_string()
    }

    /// Column type of an auto-increment key, when the flavor spells it as a
    /// type rather than a constraint.
    pub(super) fn auto_increment_type(self, kind: FieldKind) -> Option<&'static str> {
        match (self, kind) {
            (Flavor::Postgresql, FieldKind::BigInteger | FieldKind::PositiveBigInteger) => {
                Some("bigserial")
            }
            (Flavor::Postgresql, _) => Some("serial"),
            _ => None,
        }
    }

    /// Keyword written before `NOT NULL` on an auto-increment column.
    pub(super) fn auto_increment_prefix(self) -> Option<&'static str> {
        self.is_mysql().then_some("AUTO_INCREMENT")
    }

    /// Keyword written after `PRIMARY KEY` on an auto-increment column.
    pub(super) fn auto_increment_suffix(self) -> Option<&'static str> {
        self.is_sqlite().then_some("AUTOINCREMENT")
    }

    pub(super) fn bool_literal(self, value: bool) -> &'static str {
        match (self, value) {
            (Flavor::Sqlite, true) => "1",
            (Flavor::Sqlite, false) => "0",
            (_, true) => "TRUE",
            (_, false) => "FALSE",
        }
    }

    /// The `LIMIT` clause written when only an offset is given, for flavors
    /// that require one.
    pub(super) fn unbounded_limit(self) -> Option<&'static str> {
        match self {
            Flavor::Sqlite => Some("LIMIT -1"),
            Flavor::Mysql => Some("LIMIT 18446744073709551615"),
            Flavor::Postgresql => None,
        }
    }

    pub(super) fn supports_index_if_not_exists(self) -> bool {
        !self.is_mysql()
    }
}
