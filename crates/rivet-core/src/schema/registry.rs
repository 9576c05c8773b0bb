use super::{reflect, resolve, Model, ModelDef, ModelId, Name, Schema};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Collects model definitions and bootstraps them into a [`Schema`].
///
/// Models are registered during startup. [`Registry::bootstrap`] then
/// resolves relations across all of them and freezes the result. The
/// registry is internally locked so concurrent startup code may share it; a
/// second bootstrap returns the schema produced by the first.
#[derive(Debug, Default)]
pub struct Registry {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    models: Vec<Model>,

    /// Maps table names to identifiers
    by_table: IndexMap<String, ModelId>,

    /// Maps `package.Type` names to identifiers
    by_full_name: HashMap<String, ModelId>,

    /// If set, prefix all table names with this string
    table_name_prefix: Option<String>,

    /// Set once bootstrap succeeds
    schema: Option<Arc<Schema>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Prefixes the table names of models registered from now on.
    pub fn table_name_prefix(&self, prefix: &str) -> &Self {
        self.lock().table_name_prefix = Some(prefix.to_string());
        self
    }

    /// Registers a model.
    ///
    /// The table name is the one the definition provides, or the snake-cased
    /// type name. Both the table name and the `package.Type` name must be
    /// unique.
    pub fn register(&self, def: ModelDef) -> Result<ModelId> {
        self.register_model(def, None)
    }

    /// Registers a model whose table lives in the named database schema.
    pub fn register_with_schema(&self, def: ModelDef, schema: &str) -> Result<ModelId> {
        self.register_model(def, Some(schema))
    }

    fn register_model(&self, def: ModelDef, schema: Option<&str>) -> Result<ModelId> {
        let mut state = self.lock();
        state.check_open()?;

        let full_name = def.full_name();
        if state.by_full_name.contains_key(&full_name) {
            return Err(Error::invalid_schema(format!(
                "model `{full_name}` registered more than once, must be unique"
            )));
        }

        let table = format!(
            "{}{}",
            state.table_name_prefix.as_deref().unwrap_or_default(),
            def.table
                .clone()
                .unwrap_or_else(|| Name::new(&def.name).snake_case())
        );
        if state.by_table.contains_key(&table) {
            return Err(Error::invalid_schema(format!(
                "table name `{table}` registered more than once, must be unique"
            )));
        }

        let id = ModelId(state.models.len());
        let mut model = reflect::reflect(id, &def, table)?;
        model.schema_name = schema.map(str::to_string);

        tracing::debug!(
            table = %model.table,
            model = %model.full_name,
            columns = model.columns().count(),
            "registered model"
        );

        state.by_table.insert(model.table.clone(), id);
        state.by_full_name.insert(full_name, id);
        state.models.push(model);

        Ok(id)
    }

    /// Applies structural changes to a registered model before bootstrap.
    pub fn configure(&self, id: ModelId, f: impl FnOnce(&mut Model) -> Result<()>) -> Result<()> {
        let mut state = self.lock();
        state.check_open()?;

        let model = state
            .models
            .get_mut(id.0)
            .ok_or_else(|| Error::invalid_schema(format!("unknown model {id:?}")))?;
        f(model)
    }

    /// Returns the identifier of a registered model by `package.Type` name.
    pub fn model_id(&self, full_name: &str) -> Option<ModelId> {
        self.lock().by_full_name.get(full_name).copied()
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.lock().schema.is_some()
    }

    /// Resolves relations between all registered models and freezes them.
    ///
    /// Runs once. Later calls return the schema the first successful call
    /// produced. A failed bootstrap leaves the registered models untouched.
    pub fn bootstrap(&self) -> Result<Arc<Schema>> {
        let mut state = self.lock();

        if let Some(schema) = &state.schema {
            return Ok(schema.clone());
        }

        let schema = Arc::new(resolve::resolve(
            state.models.clone(),
            state.by_table.clone(),
            state.by_full_name.clone(),
        )?);

        tracing::info!(models = schema.models().count(), "schema bootstrapped");

        state.schema = Some(schema.clone());
        Ok(schema)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn check_open(&self) -> Result<()> {
        if self.schema.is_some() {
            return Err(Error::invalid_schema(
                "models cannot change after the schema is bootstrapped",
            ));
        }
        Ok(())
    }
}
