/// The SQL backend a connection talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgresql,
    Mysql,
}

/// Describes what the backend supports.
#[derive(Debug)]
pub struct Capability {
    pub backend: Backend,

    /// Literal written in place of an auto-increment column on insert. When
    /// `None` the column is left out of the insert entirely.
    pub auto_increment_bind_value: Option<&'static str>,

    /// The backend reports generated keys through `INSERT ... RETURNING`
    /// rather than a last-insert id.
    pub returning_insert: bool,

    /// The backend has named schemas (`CREATE SCHEMA`).
    pub schemas: bool,
}

impl Capability {
    pub const SQLITE: Self = Self {
        backend: Backend::Sqlite,
        auto_increment_bind_value: None,
        returning_insert: false,
        schemas: false,
    };

    pub const POSTGRESQL: Self = Self {
        backend: Backend::Postgresql,
        auto_increment_bind_value: Some("DEFAULT"),
        returning_insert: true,
        schemas: true,
    };

    pub const MYSQL: Self = Self {
        backend: Backend::Mysql,
        auto_increment_bind_value: Some("NULL"),
        returning_insert: false,
        schemas: true,
    };
}
