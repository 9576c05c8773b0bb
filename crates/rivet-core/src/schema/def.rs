/// Explicit description of a domain type, handed to [`Registry::register`].
///
/// This replaces runtime reflection: the caller (usually a `Model` impl)
/// lists each field with its declared Rust type and its tag string.
///
/// [`Registry::register`]: super::Registry::register
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    /// Type name, e.g. `User`
    pub name: String,

    /// Package (module path) the type lives in, e.g. `app::models`
    pub package: String,

    /// Table name provided by the type. Defaults to the snake-cased type name.
    pub table: Option<String>,

    pub fields: Vec<FieldDef>,

    /// Column groups to index, as provided by the type
    pub indexes: Vec<Vec<String>>,

    /// Column groups that must be unique together
    pub unique_together: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: DeclaredTy,

    /// `;`-separated attributes, e.g. `pk;auto` or `rel=fk;on_delete=set_null;null`
    pub tag: String,

    /// Private fields are not mapped.
    pub exported: bool,
}

/// The Rust type a field is declared with.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredTy {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Date,
    Time,
    DateTime,
    Timestamp,

    /// `Option<T>`
    Option(Box<DeclaredTy>),

    /// A reference to another model, by full `package.Type` name
    Ref(String),

    /// `Vec<T>`
    List(Box<DeclaredTy>),

    /// A model held by value rather than by reference
    Struct(String),

    /// An embedded struct whose fields are flattened into the parent
    Embedded(Vec<FieldDef>),
}

impl ModelDef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> ModelDef {
        ModelDef {
            name: name.into(),
            package: package.into(),
            table: None,
            fields: vec![],
            indexes: vec![],
            unique_together: vec![],
        }
    }

    /// `package.Type`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: DeclaredTy, tag: &str) -> Self {
        self.fields.push(FieldDef::new(name, ty, tag));
        self
    }

    pub fn private_field(mut self, name: impl Into<String>, ty: DeclaredTy) -> Self {
        self.fields.push(FieldDef::new(name, ty, "").private());
        self
    }

    pub fn embed(mut self, name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        self.fields
            .push(FieldDef::new(name, DeclaredTy::Embedded(fields), ""));
        self
    }

    pub fn index(mut self, columns: &[&str]) -> Self {
        self.indexes
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn unique_together(mut self, fields: &[&str]) -> Self {
        self.unique_together
            .push(fields.iter().map(|c| c.to_string()).collect());
        self
    }
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: DeclaredTy, tag: &str) -> FieldDef {
        FieldDef {
            name: name.into(),
            ty,
            tag: tag.to_string(),
            exported: true,
        }
    }

    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }
}

impl DeclaredTy {
    /// `Ref(path)` for a reference to the model at `path`.
    pub fn reference(path: impl Into<String>) -> DeclaredTy {
        DeclaredTy::Ref(path.into())
    }

    /// `List(Ref(path))` for a sequence of references to the model at `path`.
    pub fn list_of(path: impl Into<String>) -> DeclaredTy {
        DeclaredTy::List(Box::new(DeclaredTy::Ref(path.into())))
    }

    pub fn optional(self) -> DeclaredTy {
        DeclaredTy::Option(Box::new(self))
    }

    /// Target of a singular reference, looking through `Option`.
    pub fn reference_target(&self) -> Option<&str> {
        match self {
            DeclaredTy::Ref(path) => Some(path),
            DeclaredTy::Option(inner) => inner.reference_target(),
            _ => None,
        }
    }

    /// Target of a sequence of references.
    pub fn list_target(&self) -> Option<&str> {
        match self {
            DeclaredTy::List(inner) => match &**inner {
                DeclaredTy::Ref(path) => Some(path),
                _ => None,
            },
            DeclaredTy::Option(inner) => inner.list_target(),
            _ => None,
        }
    }
}
