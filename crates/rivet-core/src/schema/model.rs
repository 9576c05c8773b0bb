use super::{plan::PlanCache, Field, FieldId, RelKind};
use crate::{Error, Result};

use std::fmt;

#[derive(Debug, Clone)]
pub struct Model {
    /// Uniquely identifies the model within the schema
    pub id: ModelId,

    /// Type name, e.g. `User`
    pub name: String,

    /// `package.Type`
    pub full_name: String,

    pub package: String,

    /// Name of the database table
    pub table: String,

    /// Database schema the table lives in, if any
    pub schema_name: Option<String>,

    /// Fields in declaration order, embedded struct fields flattened in place
    pub fields: Vec<Field>,

    /// Indices into `fields` of the primary key, in registration order
    pub primary_key: Vec<usize>,

    /// Index into `fields` of the optimistic-concurrency version column
    pub version: Option<usize>,

    /// Field name groups that must be unique together
    pub unique_together: Vec<Vec<String>>,

    pub indexes: Vec<Index>,

    /// `true` for models registered by the caller, `false` for synthesized
    /// junction models
    pub manual: bool,

    /// The model is the junction table of a many-to-many relation
    pub is_through: bool,

    /// Lazily generated SQL for this model's mutation and lookup operations
    pub plans: PlanCache,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

/// A named index over one or more columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,

    /// Index method, e.g. `btree` or `hash`. Empty for the backend default.
    pub kind: String,

    pub unique: bool,

    /// Field names covered by the index
    pub columns: Vec<String>,
}

impl Model {
    pub(crate) fn new(id: ModelId, package: &str, name: &str, table: String) -> Model {
        Model {
            id,
            name: name.to_string(),
            full_name: format!("{package}.{name}"),
            package: package.to_string(),
            table,
            schema_name: None,
            fields: vec![],
            primary_key: vec![],
            version: None,
            unique_together: vec![],
            indexes: vec![],
            manual: true,
            is_through: false,
            plans: PlanCache::default(),
        }
    }

    pub fn field(&self, field: impl Into<FieldId>) -> &Field {
        let field_id = field.into();
        assert_eq!(self.id, field_id.model);
        &self.fields[field_id.index]
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns a field for tweaking before bootstrap. Any change to a field
    /// may alter generated SQL, so the model's bind plans are reset.
    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field> {
        self.plans.reset();

        let table = &self.table;
        self.fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| missing_field(table, name))
    }

    /// Finds a field by name or column.
    ///
    /// Tries, in order: exact field name, case-insensitive field name, exact
    /// column name and case-insensitive column name.
    pub fn resolve(&self, name: &str) -> Option<&Field> {
        self.field_by_name(name)
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|field| field.name.eq_ignore_ascii_case(name))
            })
            .or_else(|| self.fields.iter().find(|field| field.column == name))
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|field| field.column.eq_ignore_ascii_case(name))
            })
    }

    /// Iterate over the fields used for the model's primary key.
    pub fn primary_key_fields(&self) -> impl ExactSizeIterator<Item = &'_ Field> {
        self.primary_key.iter().map(|index| &self.fields[*index])
    }

    /// The primary key field of a model keyed by exactly one field.
    pub fn single_primary_key(&self) -> Result<&Field> {
        match self.primary_key[..] {
            [index] => Ok(&self.fields[index]),
            _ => Err(Error::invalid_statement(format!(
                "only one primary key can be set in `{}`",
                self.full_name
            ))),
        }
    }

    pub fn version_field(&self) -> Option<&Field> {
        self.version.map(|index| &self.fields[index])
    }

    /// The auto-increment field, if the model has one.
    pub fn auto_increment_field(&self) -> Option<&Field> {
        self.primary_key_fields().find(|field| field.auto_increment)
    }

    /// Fields stored as columns of this model's table and not transient.
    pub fn columns(&self) -> impl Iterator<Item = &'_ Field> {
        self.fields.iter().filter(|field| field.is_mapped())
    }

    /// Relation fields of the given kind.
    pub fn relations(&self, kind: RelKind) -> impl Iterator<Item = &'_ Field> {
        self.fields
            .iter()
            .filter(move |field| field.rel_kind() == Some(kind))
    }

    /// Adds a field, keeping field names unique and column names unique among
    /// the fields stored in the table.
    pub(crate) fn add_field(&mut self, mut field: Field) -> Result<FieldId> {
        if self.field_by_name(&field.name).is_some() {
            return Err(Error::invalid_schema(format!(
                "duplicate field name: {}",
                field.name
            )));
        }

        if field.is_db_column() && self.has_column(&field.column) {
            return Err(Error::invalid_schema(format!(
                "duplicate column name: {}",
                field.column
            )));
        }

        let id = self.id.field(self.fields.len());
        field.id = id;

        if field.primary_key {
            self.primary_key.push(id.index);
        }

        self.fields.push(field);
        Ok(id)
    }

    pub(crate) fn has_column(&self, column: &str) -> bool {
        self.fields
            .iter()
            .any(|field| field.is_db_column() && field.column == column)
    }

    /// Replaces the primary key. With `auto` the key must be a single integer
    /// field, which becomes auto-increment.
    pub fn set_keys(&mut self, auto: bool, fields: &[&str]) -> Result<&mut Self> {
        if auto && fields.len() != 1 {
            return Err(Error::invalid_schema(format!(
                "auto-increment key of `{}` must be exactly one field, got {}",
                self.full_name,
                fields.len()
            )));
        }

        let mut indices = Vec::with_capacity(fields.len());
        for name in fields {
            let index = self.index_of(name)?;
            if auto && !self.fields[index].kind.is_integer() {
                return Err(Error::invalid_schema(format!(
                    "non-integer type cannot set auto: {}",
                    self.fields[index].full_name
                )));
            }
            indices.push(index);
        }

        for field in &mut self.fields {
            field.primary_key = false;
            field.auto_increment = false;
        }

        for index in &indices {
            let field = &mut self.fields[*index];
            field.primary_key = true;
            field.auto_increment = auto;
            field.nullable = false;
            field.unique = false;
            field.index = false;
            field.default = None;
        }

        self.primary_key = indices;
        self.plans.reset();
        Ok(self)
    }

    /// Adds a uniqueness constraint across two or more fields.
    pub fn set_unique_together(&mut self, fields: &[&str]) -> Result<&mut Self> {
        if fields.len() < 2 {
            return Err(Error::invalid_schema(format!(
                "unique together on `{}` needs at least two fields",
                self.full_name
            )));
        }

        for name in fields {
            self.index_of(name)?;
        }

        self.unique_together
            .push(fields.iter().map(|name| name.to_string()).collect());
        self.plans.reset();
        Ok(self)
    }

    /// Registers an index. Adding an index under a name that already exists
    /// leaves the existing one in place.
    pub fn add_index(&mut self, name: &str, kind: &str, columns: &[&str]) -> Result<&Index> {
        if let Some(pos) = self.indexes.iter().position(|index| index.name == name) {
            return Ok(&self.indexes[pos]);
        }

        for column in columns {
            if self.resolve(column).is_none() {
                return Err(Error::invalid_schema(format!(
                    "no column `{column}` in table `{}` to create index on",
                    self.table
                )));
            }
        }

        self.indexes.push(Index {
            name: name.to_string(),
            kind: kind.to_string(),
            unique: false,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self.plans.reset();
        Ok(&self.indexes[self.indexes.len() - 1])
    }

    /// Uses `field` as the optimistic-concurrency version column.
    pub fn set_version(&mut self, field: &str) -> Result<&Field> {
        let index = self.index_of(field)?;

        if !self.fields[index].kind.is_integer() {
            return Err(Error::invalid_schema(format!(
                "version field `{}` must be an integer",
                self.fields[index].full_name
            )));
        }

        self.version = Some(index);
        self.plans.reset();
        Ok(&self.fields[index])
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|field| field.name == name || field.column == name)
            .ok_or_else(|| missing_field(&self.table, name))
    }
}

fn missing_field(table: &str, name: &str) -> Error {
    Error::invalid_schema(format!("no field `{name}` in table `{table}`"))
}

impl ModelId {
    /// Create a `FieldId` representing the current model's field at index
    /// `index`.
    pub const fn field(self, index: usize) -> FieldId {
        FieldId { model: self, index }
    }
}

impl From<&Self> for ModelId {
    fn from(src: &Self) -> Self {
        *src
    }
}

impl From<&Model> for ModelId {
    fn from(value: &Model) -> Self {
        value.id
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ModelId({})", self.0)
    }
}

impl From<&Field> for FieldId {
    fn from(value: &Field) -> Self {
        value.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    fn user() -> Model {
        let id = ModelId(0);
        let mut model = Model::new(id, "app", "User", "user".to_string());

        let mut pk = Field::new(id.field(0), "ID", "id", FieldKind::BigInteger);
        pk.primary_key = true;
        pk.auto_increment = true;
        model.add_field(pk).unwrap();
        model
            .add_field(Field::new(id.field(0), "Name", "name", FieldKind::Char))
            .unwrap();
        model
            .add_field(Field::new(id.field(0), "Version", "version", FieldKind::Integer))
            .unwrap();
        model
    }

    #[test]
    fn resolve_order() {
        let model = user();
        assert_eq!(model.resolve("Name").unwrap().name, "Name");
        assert_eq!(model.resolve("name").unwrap().name, "Name");
        assert_eq!(model.resolve("ID").unwrap().column, "id");
        assert!(model.resolve("missing").is_none());
    }

    #[test]
    fn duplicate_column_rejected() {
        let mut model = user();
        let err = model
            .add_field(Field::new(ModelId(0).field(0), "Other", "name", FieldKind::Char))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid schema: duplicate column name: name");
    }

    #[test]
    fn set_keys_replaces_primary_key() {
        let mut model = user();
        model.set_keys(false, &["Name", "Version"]).unwrap();
        assert_eq!(model.primary_key, [1, 2]);
        assert!(!model.fields[0].primary_key);
        assert!(model.auto_increment_field().is_none());

        assert!(model.set_keys(true, &["Name", "Version"]).is_err());
        assert!(model.set_keys(true, &["Name"]).is_err());
    }

    #[test]
    fn structural_changes_validate_fields() {
        let mut model = user();
        assert!(model.set_unique_together(&["Name"]).is_err());
        assert!(model.set_unique_together(&["Name", "Nope"]).is_err());
        model.set_unique_together(&["Name", "Version"]).unwrap();

        assert!(model.set_version("Name").is_err());
        assert_eq!(model.set_version("Version").unwrap().column, "version");

        model.add_index("idx_name", "btree", &["name"]).unwrap();
        model.add_index("idx_name", "hash", &["version"]).unwrap();
        assert_eq!(model.indexes.len(), 1);
        assert_eq!(model.indexes[0].kind, "btree");
    }
}
