use super::{FieldId, ModelId, RelKind};

/// Relation metadata carried by a relation or reverse field.
///
/// Targets and pairings are arena handles filled in during bootstrap; before
/// that only the declared `target_path` is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub kind: RelKind,

    /// Full name of the declared target type
    pub target_path: String,

    pub target: Option<ModelId>,

    /// `rel_table` override, or the junction table once resolved
    pub rel_table: Option<String>,

    /// `rel_through` override, naming an explicit junction model
    pub rel_through: Option<String>,

    /// The junction model, for many-to-many relations and the reverse side
    /// paired with one
    pub through: Option<ModelId>,

    /// The field on the other side of the relation.
    ///
    /// For foreign-key and one-to-one fields this is the reverse field on the
    /// target; for reverse fields it is the forward field. For many-to-many
    /// relations it is the junction field pointing back at the owner.
    pub pair: Option<FieldId>,

    /// Many-to-many only: the junction field pointing at the target.
    pub target_link: Option<FieldId>,

    /// The many-to-many field on the other model this field is paired with
    pub m2m_pair: Option<FieldId>,

    pub on_delete: Option<OnDelete>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
    SetDefault,
    DoNothing,
}

impl Relation {
    pub fn new(kind: RelKind, target_path: impl Into<String>) -> Relation {
        Relation {
            kind,
            target_path: target_path.into(),
            target: None,
            rel_table: None,
            rel_through: None,
            through: None,
            pair: None,
            target_link: None,
            m2m_pair: None,
            on_delete: None,
        }
    }

    #[track_caller]
    pub fn expect_target(&self) -> ModelId {
        self.target
            .expect("relation target not resolved; was the schema bootstrapped?")
    }

    #[track_caller]
    pub fn expect_through(&self) -> ModelId {
        self.through
            .expect("relation has no junction model; is it a many-to-many relation?")
    }
}

impl OnDelete {
    pub fn parse(src: &str) -> Option<OnDelete> {
        Some(match src {
            "cascade" => OnDelete::Cascade,
            "set_null" => OnDelete::SetNull,
            "set_default" => OnDelete::SetDefault,
            "do_nothing" => OnDelete::DoNothing,
            _ => return None,
        })
    }

    /// The referential action as written in SQL.
    pub fn as_sql(self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
            OnDelete::SetDefault => "SET DEFAULT",
            OnDelete::DoNothing => "NO ACTION",
        }
    }
}
