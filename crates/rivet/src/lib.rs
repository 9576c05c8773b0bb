pub mod db;
pub use db::Db;

mod model;
pub use model::Model;

mod query_set;
pub use query_set::QuerySet;

pub mod relation;
pub use relation::M2m;

pub use rivet_core::{
    async_trait,
    driver::{self, Capability, Connection, Response, Rows},
    schema::{self, DeclaredTy, FieldDef, ModelDef},
    stmt::{self, Condition, FromValue, Record, Value, ValueRecord},
    Error, Result,
};
