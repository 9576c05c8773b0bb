#[macro_use]
mod fmt;
use fmt::ToSql;

mod condition;
mod create_table;

mod delim;
use delim::{Comma, Period};

mod flatten;

mod flavor;
pub use flavor::Flavor;

mod ident;
use ident::{ColumnRef, Ident, TableAlias, TableName};

mod literal;
use literal::Literal;

mod params;
pub use params::{Params, Placeholder};

mod plan;

mod scope;
use scope::Scope;

mod select;
pub use select::Select;

use jiff::tz::TimeZone;
use rivet_core::{driver::Capability, schema::Model, stmt::Value, Result, Schema};

/// Serializes statements against a bootstrapped schema to SQL text.
///
/// A serializer is cheap to build and borrows the schema; the facade makes
/// one per operation. All SQL it writes uses the placeholder and quoting
/// conventions of its [`Flavor`].
#[derive(Debug, Clone)]
pub struct Serializer<'a> {
    /// Schema against which statements are serialized
    schema: &'a Schema,

    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,

    capability: &'static Capability,

    /// Time zone timestamps are converted into before they are bound
    time_zone: TimeZone,
}

/// SQL text and its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

struct Formatter<'a, P> {
    /// Handle to the serializer
    serializer: &'a Serializer<'a>,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut P,
}

impl<'a> Serializer<'a> {
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn capability(&self) -> &'static Capability {
        self.capability
    }

    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    /// Runs `f` against a fresh formatter writing into a new string.
    fn serialize<P: Params>(
        &self,
        params: &mut P,
        f: impl FnOnce(&mut Formatter<'_, P>) -> Result<()>,
    ) -> Result<String> {
        let mut dst = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut dst,
            params,
        };

        f(&mut fmt)?;
        Ok(dst)
    }

    fn table_name<'m>(&self, model: &'m Model) -> TableName<'m> {
        TableName {
            schema: model.schema_name.as_deref(),
            table: &model.table,
        }
    }
}

impl<P: Params> Formatter<'_, P> {
    /// Records a bound parameter and returns its placeholder.
    fn param(&mut self, param: P::Param) -> Placeholder {
        Params::push(self.params, param)
    }

    /// Writes into a separate string, sharing this formatter's parameters.
    fn nested(&mut self, write: impl FnOnce(&mut Formatter<'_, P>)) -> String {
        let mut dst = String::new();

        write(&mut Formatter {
            serializer: self.serializer,
            dst: &mut dst,
            params: &mut *self.params,
        });

        dst
    }
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Statement {
        Statement {
            sql: sql.into(),
            params: vec![],
        }
    }
}
