use super::Db;
use crate::{Error, Result};

use once_cell::sync::OnceCell;

static GLOBAL: OnceCell<Db> = OnceCell::new();

impl Db {
    /// Installs `self` as the process-wide handle. Can only happen once.
    pub fn set_global(self) -> Result<()> {
        GLOBAL
            .set(self)
            .map_err(|_| Error::invalid_statement("the global database handle is already set"))
    }

    /// Returns the process-wide handle.
    pub fn global() -> Result<Db> {
        GLOBAL.get().cloned().ok_or_else(|| {
            Error::uninitialized("no global database handle; call `Db::set_global` first")
        })
    }
}
