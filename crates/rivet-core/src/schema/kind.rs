use super::DeclaredTy;
use crate::{stmt::Value, Error, Result};

/// The semantic type of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,

    /// Variable length string, `varchar(size)`
    Char,
    Text,
    Json,
    Jsonb,

    Date,
    Time,
    DateTime,

    /// `i8`
    Bit,
    /// `i16`
    SmallInteger,
    /// `i32`
    Integer,
    /// `i64`
    BigInteger,
    /// `u8`
    PositiveBit,
    /// `u16`
    PositiveSmallInteger,
    /// `u32`
    PositiveInteger,
    /// `u64`
    PositiveBigInteger,

    Float,

    /// Fixed precision number with `digits` and `decimals`
    Decimal,

    Relation(RelKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelKind {
    ForeignKey,
    OneToOne,
    ManyToMany,
    ReverseOne,
    ReverseMany,
}

impl FieldKind {
    /// Maps a declared Rust type to its default semantic type. Returns `None`
    /// for types that can only be mapped as relations.
    pub fn from_declared(ty: &DeclaredTy) -> Option<FieldKind> {
        use FieldKind::*;

        Some(match ty {
            DeclaredTy::Bool => Boolean,
            DeclaredTy::I8 => Bit,
            DeclaredTy::I16 => SmallInteger,
            DeclaredTy::I32 => Integer,
            DeclaredTy::I64 => BigInteger,
            DeclaredTy::U8 => PositiveBit,
            DeclaredTy::U16 => PositiveSmallInteger,
            DeclaredTy::U32 => PositiveInteger,
            DeclaredTy::U64 => PositiveBigInteger,
            DeclaredTy::F32 | DeclaredTy::F64 => Float,
            DeclaredTy::String => Char,
            DeclaredTy::Date => Date,
            DeclaredTy::Time => Time,
            DeclaredTy::DateTime | DeclaredTy::Timestamp => DateTime,
            DeclaredTy::Option(inner) => return FieldKind::from_declared(inner),
            DeclaredTy::Ref(_)
            | DeclaredTy::List(_)
            | DeclaredTy::Struct(_)
            | DeclaredTy::Embedded(_) => return None,
        })
    }

    pub fn is_integer(self) -> bool {
        use FieldKind::*;

        matches!(
            self,
            Bit | SmallInteger
                | Integer
                | BigInteger
                | PositiveBit
                | PositiveSmallInteger
                | PositiveInteger
                | PositiveBigInteger
        )
    }

    pub fn is_unsigned(self) -> bool {
        use FieldKind::*;

        matches!(
            self,
            PositiveBit | PositiveSmallInteger | PositiveInteger | PositiveBigInteger
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::Time | FieldKind::DateTime)
    }

    pub fn rel_kind(self) -> Option<RelKind> {
        match self {
            FieldKind::Relation(kind) => Some(kind),
            _ => None,
        }
    }

    /// Parses a configured default against this type.
    pub fn parse_default(self, raw: &str) -> Result<Value> {
        use FieldKind::*;

        Ok(match self {
            Boolean => Value::Bool(parse_bool(raw)?),
            Float | Decimal => Value::F64(raw.parse()?),
            Bit => raw.parse::<i8>()?.into(),
            SmallInteger => raw.parse::<i16>()?.into(),
            Integer => raw.parse::<i32>()?.into(),
            BigInteger => raw.parse::<i64>()?.into(),
            PositiveBit => raw.parse::<u8>()?.into(),
            PositiveSmallInteger => raw.parse::<u16>()?.into(),
            PositiveInteger => raw.parse::<u32>()?.into(),
            PositiveBigInteger => raw.parse::<u64>()?.into(),
            Relation(_) => match raw.parse::<i64>() {
                Ok(key) => key.into(),
                Err(_) => raw.into(),
            },
            Char | Text | Json | Jsonb | Date | Time | DateTime => raw.into(),
        })
    }
}

impl RelKind {
    /// `fk`, `one` and `m2m`: the side that declares the relation.
    pub fn is_forward(self) -> bool {
        matches!(
            self,
            RelKind::ForeignKey | RelKind::OneToOne | RelKind::ManyToMany
        )
    }

    pub fn is_reverse(self) -> bool {
        !self.is_forward()
    }

    /// Many-to-many and reverse-many relations hold a collection and have no
    /// column of their own.
    pub fn is_collection(self) -> bool {
        matches!(self, RelKind::ManyToMany | RelKind::ReverseMany)
    }

    /// Only foreign-key and one-to-one relations are stored as a column.
    pub fn has_column(self) -> bool {
        matches!(self, RelKind::ForeignKey | RelKind::OneToOne)
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(Error::from_args(format_args!("invalid bool `{raw}`"))),
    }
}
