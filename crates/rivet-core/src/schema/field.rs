use super::{FieldKind, ModelId, RelKind, Relation};
use crate::stmt::Value;

/// A mapped field: the column descriptor of one struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Uniquely identifies the field within the schema
    pub id: FieldId,

    /// Field name as declared on the struct
    pub name: String,

    /// Storage column name
    pub column: String,

    /// The column name came from a `column=` tag and must not be derived
    pub explicit_column: bool,

    /// `package.Type.Field`, used in diagnostics
    pub full_name: String,

    pub kind: FieldKind,

    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub index: bool,

    /// Set to the current time on every insert and update
    pub auto_now: bool,

    /// Set to the current time on insert
    pub auto_now_add: bool,

    /// Maximum length for character fields
    pub size: Option<u32>,

    /// Character field declared without a size; stored with the default
    /// size of 255.
    pub to_text: bool,

    pub digits: Option<u8>,
    pub decimals: Option<u8>,

    /// Static default. Never set on keys, unique or temporal fields.
    pub default: Option<DefaultValue>,

    /// Left out of every generated statement
    pub transient: bool,

    pub relation: Option<Relation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub model: ModelId,
    pub index: usize,
}

/// A default value as configured, and parsed against the field type.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    pub raw: String,
    pub value: Value,
}

impl Field {
    pub fn new(id: FieldId, name: impl Into<String>, column: impl Into<String>, kind: FieldKind) -> Field {
        Field {
            id,
            name: name.into(),
            column: column.into(),
            explicit_column: false,
            full_name: String::new(),
            kind,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            unique: false,
            index: false,
            auto_now: false,
            auto_now_add: false,
            size: None,
            to_text: false,
            digits: None,
            decimals: None,
            default: None,
            transient: false,
            relation: None,
        }
    }

    /// True if the field is stored in a column of its model's table.
    /// Many-to-many and reverse fields are not.
    pub fn is_db_column(&self) -> bool {
        match self.kind {
            FieldKind::Relation(kind) => kind.has_column(),
            _ => true,
        }
    }

    /// True if the field takes part in generated SQL.
    pub fn is_mapped(&self) -> bool {
        self.is_db_column() && !self.transient
    }

    pub fn rel_kind(&self) -> Option<RelKind> {
        self.kind.rel_kind()
    }

    /// Foreign-key, one-to-one or many-to-many
    pub fn is_relation(&self) -> bool {
        self.rel_kind().is_some_and(RelKind::is_forward)
    }

    /// Reverse-one or reverse-many
    pub fn is_reverse(&self) -> bool {
        self.rel_kind().is_some_and(RelKind::is_reverse)
    }

    #[track_caller]
    pub fn expect_relation(&self) -> &Relation {
        match &self.relation {
            Some(relation) => relation,
            None => panic!("field `{}` is not a relation", self.full_name),
        }
    }

    #[track_caller]
    pub fn expect_relation_mut(&mut self) -> &mut Relation {
        match &mut self.relation {
            Some(relation) => relation,
            None => panic!("field `{}` is not a relation", self.full_name),
        }
    }

    /// Renames the storage column.
    pub fn rename(&mut self, column: impl Into<String>) -> &mut Self {
        self.column = column.into();
        self.explicit_column = true;
        self
    }

    pub fn set_transient(&mut self, transient: bool) -> &mut Self {
        self.transient = transient;
        self
    }

    pub fn set_unique(&mut self, unique: bool) -> &mut Self {
        self.unique = unique;
        if unique {
            self.index = false;
            self.default = None;
        }
        self
    }

    pub fn set_not_null(&mut self, not_null: bool) -> &mut Self {
        self.nullable = !not_null;
        self
    }

    pub fn set_max_size(&mut self, size: u32) -> &mut Self {
        self.size = Some(size);
        self.to_text = false;
        self
    }
}
