mod exec_log;
pub use exec_log::ExecLog;

mod logging_connection;
pub use logging_connection::{ExecOp, LoggingConnection};

pub mod models;

use rivet::{db::Builder, Capability, Db};

/// Registers the given models on a fresh builder.
#[macro_export]
macro_rules! models {
    (
        $( $model:ty ),*
    ) => {{
        let mut builder = rivet::Db::builder();
        $( builder.register::<$model>(); )*
        builder
    }};
}

/// Builds a `Db` over a [`LoggingConnection`] for `capability`.
pub fn setup(mut builder: Builder, capability: &'static Capability) -> (Db, ExecLog) {
    init_tracing();

    let connection = LoggingConnection::new(capability);
    let log = ExecLog::new(connection.ops_log_handle(), connection.script_handle());
    let db = builder.build(connection).unwrap();

    (db, log)
}

pub fn sqlite(builder: Builder) -> (Db, ExecLog) {
    setup(builder, &Capability::SQLITE)
}

pub fn postgresql(builder: Builder) -> (Db, ExecLog) {
    setup(builder, &Capability::POSTGRESQL)
}

pub fn mysql(builder: Builder) -> (Db, ExecLog) {
    setup(builder, &Capability::MYSQL)
}

/// Installs a `RUST_LOG` driven subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
