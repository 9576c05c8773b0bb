use super::{Db, Shared};
use crate::{Connection, Model, ModelDef, Result};

use jiff::tz::TimeZone;
use rivet_core::schema::{Model as SchemaModel, ModelId, Registry};

use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    sync::Arc,
};

type Configure = Box<dyn FnOnce(&mut SchemaModel) -> Result<()> + Send>;

/// Collects models and options, then bootstraps a [`Db`].
#[derive(Default)]
pub struct Builder {
    models: Vec<Registration>,

    table_name_prefix: Option<String>,

    /// Time zone timestamps are stored in. Defaults to UTC.
    time_zone: Option<TimeZone>,

    configure: Vec<(TypeId, Configure)>,
}

struct Registration {
    ty: TypeId,
    name: &'static str,
    def: ModelDef,
    schema: Option<String>,
}

impl Builder {
    pub fn register<M: Model>(&mut self) -> &mut Self {
        self.push::<M>(None)
    }

    /// Registers a model whose table lives in a named database schema.
    pub fn register_with_schema<M: Model>(&mut self, schema: &str) -> &mut Self {
        self.push::<M>(Some(schema.to_string()))
    }

    /// Prefix prepended to every derived table name.
    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.table_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn time_zone(&mut self, time_zone: TimeZone) -> &mut Self {
        self.time_zone = Some(time_zone);
        self
    }

    /// Adjusts `M`'s reflected model before relations are resolved: keys,
    /// versions, indexes and column renames.
    pub fn configure<M: Model>(
        &mut self,
        f: impl FnOnce(&mut SchemaModel) -> Result<()> + Send + 'static,
    ) -> &mut Self {
        self.configure.push((TypeId::of::<M>(), Box::new(f)));
        self
    }

    pub fn build(&mut self, connection: impl Connection) -> Result<Db> {
        let registry = Registry::new();

        if let Some(prefix) = &self.table_name_prefix {
            registry.table_name_prefix(prefix);
        }

        let mut models = HashMap::new();

        for registration in std::mem::take(&mut self.models) {
            let id = match &registration.schema {
                Some(schema) => registry.register_with_schema(registration.def, schema)?,
                None => registry.register(registration.def)?,
            };
            tracing::trace!(model = registration.name, ?id, "registered");
            models.insert(registration.ty, id);
        }

        for (ty, f) in std::mem::take(&mut self.configure) {
            let id = lookup(&models, ty)?;
            registry.configure(id, f)?;
        }

        let schema = registry.bootstrap()?;

        Ok(Db {
            shared: Arc::new(Shared {
                schema,
                connection: Box::new(connection),
                time_zone: self.time_zone.take().unwrap_or(TimeZone::UTC),
                models,
            }),
        })
    }

    fn push<M: Model>(&mut self, schema: Option<String>) -> &mut Self {
        self.models.push(Registration {
            ty: TypeId::of::<M>(),
            name: type_name::<M>(),
            def: M::schema(),
            schema,
        });
        self
    }
}

fn lookup(models: &HashMap<TypeId, ModelId>, ty: TypeId) -> Result<ModelId> {
    models.get(&ty).copied().ok_or_else(|| {
        crate::Error::invalid_schema("configured a model that was never registered")
    })
}
