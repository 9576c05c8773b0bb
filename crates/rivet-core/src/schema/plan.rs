//! Bind plans: SQL generated once per model, operation and backend, reused
//! for every call.
//!
//! A [`BindPlan`] holds the statement text and, for each placeholder, where
//! its value comes from. Executing an operation resolves those sources
//! against a concrete record; the text itself is never regenerated.
//!
//! Plans live in the model's [`PlanCache`]. Each slot is a
//! [`once_cell::sync::OnceCell`]: the first caller generates and publishes
//! the plan, concurrent callers block until it is published and then read
//! the same `Arc`.

use crate::{driver::Backend, Result};

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

/// Static shape of one operation on one model.
#[derive(Debug, Clone, PartialEq)]
pub struct BindPlan {
    pub sql: String,

    /// Source of each bound parameter, in placeholder order
    pub params: Vec<PlanArg>,

    /// Primary key field names bound in the `WHERE` clause, in key order
    pub keys: Vec<String>,

    /// Version field name, when the model has a version column
    pub version: Option<String>,

    /// The auto-increment key and its position in the insert column list
    pub auto_increment: Option<AutoIncrement>,

    /// Selected columns and the fields they are read back into
    pub columns: Vec<PlanColumn>,
}

/// Where a bound parameter's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanArg {
    /// The current value of a field of the record
    Field(String),

    /// The value a version field takes after the write: its current value
    /// plus one
    NextVersion(String),

    /// Field `key`, the primary key, of the `row`th related record of a
    /// many-to-many insert
    Target { row: usize, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoIncrement {
    /// Position of the column in the insert column list, `None` when the
    /// column is left out of the insert
    pub index: Option<usize>,

    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanColumn {
    pub column: String,
    pub field: String,
}

/// Identifies a cached plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlanKey {
    Insert,
    Update,
    Delete,
    Get,

    /// Update restricted to the named fields
    PartialUpdate(Vec<String>),

    /// Insert of `rows` junction rows for the many-to-many field at `field`
    M2mInsert { field: usize, rows: usize },

    /// Select of the models related through the many-to-many field at `field`
    M2mQuery { field: usize },
}

type Slot = OnceCell<Arc<BindPlan>>;

/// Per-model bind plan slots, one set per backend.
///
/// Plan text depends on the dialect, so a schema shared by serializers of
/// different backends keeps their plans apart.
#[derive(Default)]
pub struct PlanCache {
    sqlite: Slots,
    postgresql: Slots,
    mysql: Slots,
}

#[derive(Default)]
struct Slots {
    insert: Slot,
    update: Slot,
    delete: Slot,
    get: Slot,

    /// Plans parameterized by column set, relation or row count
    keyed: Mutex<HashMap<PlanKey, Arc<Slot>>>,
}

impl PlanCache {
    /// Returns the plan for `key` on `backend`, generating it with `init` on
    /// first use.
    ///
    /// If `init` fails the slot stays empty and the next caller tries again.
    pub fn get_or_try_init(
        &self,
        backend: Backend,
        key: &PlanKey,
        init: impl FnOnce() -> Result<BindPlan>,
    ) -> Result<Arc<BindPlan>> {
        let slots = self.slots(backend);
        let init = || init().map(Arc::new);

        match slots.fixed(key) {
            Some(slot) => slot.get_or_try_init(init).cloned(),
            None => {
                let slot = slots.keyed_slot(key);
                slot.get_or_try_init(init).cloned()
            }
        }
    }

    /// Returns the plan for `key` on `backend` if it has been generated.
    pub fn get(&self, backend: Backend, key: &PlanKey) -> Option<Arc<BindPlan>> {
        let slots = self.slots(backend);

        match slots.fixed(key) {
            Some(slot) => slot.get().cloned(),
            None => slots
                .keyed
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .and_then(|slot| slot.get().cloned()),
        }
    }

    /// Drops every generated plan.
    pub fn reset(&mut self) {
        *self = PlanCache::default();
    }

    fn slots(&self, backend: Backend) -> &Slots {
        match backend {
            Backend::Sqlite => &self.sqlite,
            Backend::Postgresql => &self.postgresql,
            Backend::Mysql => &self.mysql,
        }
    }
}

impl Slots {
    fn fixed(&self, key: &PlanKey) -> Option<&Slot> {
        match key {
            PlanKey::Insert => Some(&self.insert),
            PlanKey::Update => Some(&self.update),
            PlanKey::Delete => Some(&self.delete),
            PlanKey::Get => Some(&self.get),
            _ => None,
        }
    }

    // The map lock is only held to find the slot, not while generating.
    fn keyed_slot(&self, key: &PlanKey) -> Arc<Slot> {
        self.keyed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone()
    }

    fn generated(&self) -> usize {
        let fixed = [&self.insert, &self.update, &self.delete, &self.get]
            .iter()
            .filter(|slot| slot.get().is_some())
            .count();
        let keyed = self.keyed.lock().map(|keyed| keyed.len()).unwrap_or_default();
        fixed + keyed
    }
}

impl Clone for PlanCache {
    /// Plans are not carried over; the clone starts empty.
    fn clone(&self) -> Self {
        PlanCache::default()
    }
}

impl fmt::Debug for PlanCache {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("PlanCache")
            .field("sqlite", &self.sqlite.generated())
            .field("postgresql", &self.postgresql.generated())
            .field("mysql", &self.mysql.generated())
            .finish()
    }
}
