mod capability;
pub use capability::{Backend, Capability};

mod response;
pub use response::{Response, Rows};

use crate::{async_trait, stmt::Value};

use std::fmt::Debug;

/// A connection to the database.
///
/// Rivet builds SQL text and an ordered parameter list; the connection
/// executes it and hands back either an affected-row count or the result
/// rows. Errors raised here should be wrapped with [`crate::Error::driver`];
/// rivet passes them to the caller unchanged.
#[async_trait]
pub trait Connection: Debug + Send + Sync + 'static {
    /// Describes the backend, which selects the SQL flavor.
    fn capability(&self) -> &'static Capability;

    /// Executes a statement.
    async fn exec(&self, sql: &str, params: &[Value]) -> crate::Result<Response>;
}
