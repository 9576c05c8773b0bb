use super::{Flavor, Formatter, ToSql};

use rivet_core::{schema::plan::PlanArg, stmt::Value};

/// Collects bound parameters as a statement is serialized.
///
/// Filters and bulk statements collect concrete [`Value`]s. Bind plans are
/// generated without a record at hand and collect the [`PlanArg`] each
/// placeholder is later resolved from.
pub trait Params {
    type Param;

    fn push(&mut self, param: Self::Param) -> Placeholder;
}

/// The 1-based position of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    type Param = Value;

    fn push(&mut self, value: Value) -> Placeholder {
        self.push(value);
        Placeholder(self.len())
    }
}

impl Params for Vec<PlanArg> {
    type Param = PlanArg;

    fn push(&mut self, arg: PlanArg) -> Placeholder {
        self.push(arg);
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match f.serializer.flavor {
            Flavor::Mysql | Flavor::Sqlite => f.dst.push('?'),
            Flavor::Postgresql => fmt!(f, "$", self.0),
        }
    }
}
