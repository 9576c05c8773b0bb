mod def;
pub use def::{DeclaredTy, FieldDef, ModelDef};

mod field;
pub use field::{DefaultValue, Field, FieldId};

mod kind;
pub use kind::{FieldKind, RelKind};

mod model;
pub use model::{Index, Model, ModelId};

mod name;
pub use name::Name;

pub mod plan;

mod reflect;

mod registry;
pub use registry::Registry;

mod relation;
pub use relation::{OnDelete, Relation};

mod resolve;

mod tag;
pub use tag::Tag;

use indexmap::IndexMap;
use std::collections::HashMap;

/// The bootstrapped, immutable set of models.
///
/// Produced by [`Registry::bootstrap`]. Relations between models are stored
/// as [`ModelId`]/[`FieldId`] handles into this arena.
#[derive(Debug, Default)]
pub struct Schema {
    models: Vec<Model>,
    by_table: IndexMap<String, ModelId>,
    by_full_name: HashMap<String, ModelId>,
}

impl Schema {
    /// Get a model by ID
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        &self.models[id.into().0]
    }

    /// Get a field by ID
    pub fn field(&self, id: FieldId) -> &Field {
        &self.model(id.model).fields[id.index]
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn model_by_table(&self, table: &str) -> Option<&Model> {
        self.by_table.get(table).map(|id| self.model(*id))
    }

    /// Looks up a model by its full `package.Type` name.
    pub fn model_by_name(&self, full_name: &str) -> Option<&Model> {
        self.by_full_name.get(full_name).map(|id| self.model(*id))
    }

    /// The model on the other side of a relation field.
    pub fn target(&self, field: &Field) -> &Model {
        self.model(field.expect_relation().expect_target())
    }
}
