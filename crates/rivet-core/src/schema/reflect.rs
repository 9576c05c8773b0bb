use super::{
    DeclaredTy, DefaultValue, Field, FieldDef, FieldKind, Model, ModelDef, ModelId, Name, OnDelete,
    RelKind, Relation, Tag,
};
use crate::{Error, Result};

/// Size given to character fields declared without one.
pub(crate) const DEFAULT_CHAR_SIZE: u32 = 255;

/// Builds a model from its definition. Relation targets are left unresolved
/// until bootstrap.
pub(crate) fn reflect(id: ModelId, def: &ModelDef, table: String) -> Result<Model> {
    let mut model = Model::new(id, &def.package, &def.name, table);

    add_fields(&mut model, &def.fields, "")?;

    for columns in &def.indexes {
        let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
        let name = format!("idx_{}_{}", model.table, columns.join("_"));
        model.add_index(&name, "", &columns)?;
    }

    for fields in &def.unique_together {
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        model.set_unique_together(&fields)?;
    }

    Ok(model)
}

fn add_fields(model: &mut Model, fields: &[FieldDef], prefix: &str) -> Result<()> {
    for def in fields {
        if !def.exported {
            continue;
        }

        let full_name = format!("{}{prefix}.{}", model.full_name, def.name);
        let context = || format!("field `{full_name}`");

        let tag = Tag::parse(&def.tag).map_err(|err| err.context(context()))?;
        if tag.has("-") {
            continue;
        }

        if let DeclaredTy::Embedded(inner) = &def.ty {
            add_fields(model, inner, &format!("{prefix}.{}", def.name))?;
            continue;
        }

        let mut field = reflect_field(model.id, def, &tag).map_err(|err| err.context(context()))?;
        field.full_name = full_name.clone();

        model.add_field(field).map_err(|err| err.context(context()))?;
    }

    Ok(())
}

fn reflect_field(model: ModelId, def: &FieldDef, tag: &Tag) -> Result<Field> {
    let kind = field_kind(def, tag)?;

    let mut field = Field::new(model.field(0), &def.name, column_name(def, tag, kind), kind);
    field.explicit_column = tag.get("column").is_some();
    field.nullable = tag.has("null") || matches!(def.ty, DeclaredTy::Option(_));
    field.index = tag.has("index");
    field.unique = tag.has("unique");
    field.primary_key = tag.has("pk");
    field.auto_increment = tag.has("auto");

    let mut default = tag.get("default");

    if let FieldKind::Relation(rel_kind) = kind {
        field.relation = Some(relation(def, tag, rel_kind)?);

        match rel_kind {
            RelKind::ManyToMany | RelKind::ReverseMany | RelKind::ReverseOne => {
                field.nullable = false;
                field.index = false;
                field.auto_increment = false;
                field.primary_key = false;
                field.unique = false;
            }
            RelKind::OneToOne => field.unique = true,
            RelKind::ForeignKey => {}
        }

        if rel_kind.has_column() {
            let on_delete = on_delete(tag, field.nullable)?;
            field.expect_relation_mut().on_delete = Some(on_delete);
        }
    }

    match kind {
        FieldKind::Char | FieldKind::Json | FieldKind::Jsonb => match tag.get("size") {
            Some(size) => {
                let size = size
                    .parse()
                    .map_err(|_| Error::invalid_schema(format!("wrong size value `{size}`")))?;
                field.size = Some(size);
            }
            None => {
                field.size = Some(DEFAULT_CHAR_SIZE);
                field.to_text = true;
            }
        },
        FieldKind::Text => {
            field.index = false;
            field.unique = false;
        }
        FieldKind::Date | FieldKind::Time | FieldKind::DateTime => {
            if tag.has("auto_now") {
                field.auto_now = true;
            } else if tag.has("auto_now_add") {
                field.auto_now_add = true;
            }
        }
        FieldKind::Decimal => {
            let digits = tag.get("digits").unwrap_or_default();
            let decimals = tag.get("decimals").unwrap_or_default();
            match (digits.parse::<u8>(), decimals.parse::<u8>()) {
                (Ok(d), Ok(s)) => {
                    field.digits = Some(d);
                    field.decimals = Some(s);
                }
                _ => {
                    return Err(Error::invalid_schema(format!(
                        "wrong digits/decimals value {digits}/{decimals}"
                    )))
                }
            }
        }
        _ => {}
    }

    if field.auto_increment {
        if !kind.is_integer() {
            return Err(Error::invalid_schema("non-integer type cannot set auto"));
        }

        if !matches!(
            kind,
            FieldKind::Integer
                | FieldKind::BigInteger
                | FieldKind::PositiveInteger
                | FieldKind::PositiveBigInteger
        ) {
            return Err(Error::invalid_schema(format!(
                "auto primary key only supports i32, i64, u32 and u64 but found `{kind:?}`"
            )));
        }

        field.primary_key = true;
    }

    if field.primary_key {
        field.nullable = false;
        field.index = false;
        field.unique = false;
    }

    if field.unique {
        field.index = false;
    }

    if field.auto_increment || field.primary_key || field.unique || kind.is_temporal() {
        default = None;
    }

    if let Some(raw) = default {
        let value = kind.parse_default(raw).map_err(|err| {
            err.context(Error::invalid_schema(format!(
                "wrong tag value `default={raw}`"
            )))
        })?;
        field.default = Some(DefaultValue {
            raw: raw.to_string(),
            value,
        });
    }

    Ok(field)
}

fn field_kind(def: &FieldDef, tag: &Tag) -> Result<FieldKind> {
    if let Some(rel) = tag.get("rel") {
        let kind = match rel {
            "fk" => RelKind::ForeignKey,
            "one" => RelKind::OneToOne,
            "m2m" => RelKind::ManyToMany,
            _ => {
                return Err(Error::invalid_schema(format!(
                    "wrong tag value `rel={rel}`, rel only allows fk, one, m2m"
                )))
            }
        };
        return Ok(FieldKind::Relation(kind));
    }

    if let Some(reverse) = tag.get("reverse") {
        let kind = match reverse {
            "one" => RelKind::ReverseOne,
            "many" => RelKind::ReverseMany,
            _ => {
                return Err(Error::invalid_schema(format!(
                    "wrong tag value `reverse={reverse}`, reverse only allows one, many"
                )))
            }
        };
        return Ok(FieldKind::Relation(kind));
    }

    let Some(mut kind) = FieldKind::from_declared(&def.ty) else {
        return Err(Error::invalid_schema(format!(
            "wrong field type {:?}, references need a `rel` or `reverse` tag",
            def.ty
        )));
    };

    if let Some(ty) = tag.get("type") {
        kind = match (kind, ty) {
            (FieldKind::Char, "text") => FieldKind::Text,
            (FieldKind::Char, "json") => FieldKind::Json,
            (FieldKind::Char, "jsonb") => FieldKind::Jsonb,
            (FieldKind::DateTime, "date") => FieldKind::Date,
            (FieldKind::DateTime, "time") => FieldKind::Time,
            (_, "text" | "json" | "jsonb" | "date" | "time") => kind,
            _ => {
                return Err(Error::invalid_schema(format!(
                    "wrong tag value `type={ty}`"
                )))
            }
        };
    }

    if kind == FieldKind::Float && (tag.contains_key("digits") || tag.contains_key("decimals")) {
        kind = FieldKind::Decimal;
    }

    Ok(kind)
}

fn relation(def: &FieldDef, tag: &Tag, kind: RelKind) -> Result<Relation> {
    let target = if kind.is_collection() {
        def.ty.list_target().ok_or_else(|| {
            Error::invalid_schema("rel/reverse:many field must be a list of model references")
        })?
    } else {
        def.ty
            .reference_target()
            .ok_or_else(|| Error::invalid_schema("rel/reverse:one field must be a model reference"))?
    };

    let mut relation = Relation::new(kind, target);

    if kind.is_collection() {
        if let Some(table) = tag.get("rel_table") {
            relation.rel_table = Some(table.to_string());
        } else if let Some(through) = tag.get("rel_through") {
            relation.rel_through = Some(through.to_string());
        }
    }

    Ok(relation)
}

fn on_delete(tag: &Tag, nullable: bool) -> Result<OnDelete> {
    let Some(raw) = tag.get("on_delete") else {
        return Ok(OnDelete::Cascade);
    };

    let on_delete = OnDelete::parse(raw).ok_or_else(|| {
        Error::invalid_schema(format!(
            "on_delete value expected choice in `cascade,set_null,set_default,do_nothing`, unknown `{raw}`"
        ))
    })?;

    match on_delete {
        OnDelete::SetNull if !nullable => Err(Error::invalid_schema(
            "on_delete: set_null needs the field to be null",
        )),
        OnDelete::SetDefault if tag.get("default").is_none() => Err(Error::invalid_schema(
            "on_delete: set_default needs the field to have a default value",
        )),
        _ => Ok(on_delete),
    }
}

/// Column name from the `column` tag or the snake-cased field name.
/// Foreign-key and one-to-one columns get an `_id` suffix here; bootstrap
/// replaces it with the target's primary key column.
fn column_name(def: &FieldDef, tag: &Tag, kind: FieldKind) -> String {
    if let Some(column) = tag.get("column") {
        return column.to_string();
    }

    let name = Name::new(&def.name).snake_case();
    match kind.rel_kind() {
        Some(rel) if rel.has_column() => format!("{name}_id"),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflect_one(ty: DeclaredTy, tag: &str) -> Result<Field> {
        let def = ModelDef::new("app", "User")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .field("Value", ty, tag);
        let model = reflect(ModelId(0), &def, "user".to_string())?;
        Ok(model.fields[1].clone())
    }

    #[test]
    fn char_defaults_to_255() {
        let field = reflect_one(DeclaredTy::String, "").unwrap();
        assert_eq!(field.kind, FieldKind::Char);
        assert_eq!(field.size, Some(255));
        assert!(field.to_text);

        let field = reflect_one(DeclaredTy::String, "size=32").unwrap();
        assert_eq!(field.size, Some(32));
        assert!(!field.to_text);

        let err = reflect_one(DeclaredTy::String, "size=big").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `app.User.Value`: invalid schema: wrong size value `big`"
        );
    }

    #[test]
    fn type_overrides() {
        assert_eq!(
            reflect_one(DeclaredTy::String, "type=json").unwrap().kind,
            FieldKind::Json
        );
        assert_eq!(
            reflect_one(DeclaredTy::DateTime, "type=date").unwrap().kind,
            FieldKind::Date
        );
        let field = reflect_one(DeclaredTy::F64, "digits=10;decimals=2").unwrap();
        assert_eq!(field.kind, FieldKind::Decimal);
        assert_eq!((field.digits, field.decimals), (Some(10), Some(2)));

        assert!(reflect_one(DeclaredTy::F64, "digits=10").is_err());
        assert!(reflect_one(DeclaredTy::String, "type=blob").is_err());
    }

    #[test]
    fn relation_shapes() {
        let field = reflect_one(DeclaredTy::reference("app.Profile"), "rel=one").unwrap();
        assert_eq!(field.kind, FieldKind::Relation(RelKind::OneToOne));
        assert_eq!(field.column, "value_id");
        assert!(field.unique);
        assert_eq!(field.expect_relation().on_delete, Some(OnDelete::Cascade));

        let err = reflect_one(DeclaredTy::list_of("app.Profile"), "rel=fk").unwrap_err();
        assert!(err.is_invalid_schema());

        assert!(reflect_one(DeclaredTy::reference("app.Group"), "rel=m2m").is_err());

        let field = reflect_one(DeclaredTy::list_of("app.Group"), "rel=m2m;null;rel_table=memberships")
            .unwrap();
        assert!(!field.nullable);
        assert!(!field.is_db_column());
        assert_eq!(
            field.expect_relation().rel_table.as_deref(),
            Some("memberships")
        );
    }

    #[test]
    fn on_delete_rules() {
        assert!(reflect_one(DeclaredTy::reference("app.Profile"), "rel=fk;on_delete=set_null").is_err());
        assert!(reflect_one(
            DeclaredTy::reference("app.Profile").optional(),
            "rel=fk;on_delete=set_null"
        )
        .is_ok());
        assert!(reflect_one(DeclaredTy::reference("app.Profile"), "rel=fk;on_delete=set_default").is_err());
        assert!(reflect_one(
            DeclaredTy::reference("app.Profile"),
            "rel=fk;on_delete=set_default;default=1"
        )
        .is_ok());
        assert!(reflect_one(DeclaredTy::reference("app.Profile"), "rel=fk;on_delete=explode").is_err());
    }

    #[test]
    fn auto_rules() {
        let field = reflect_one(DeclaredTy::U32, "auto;null;unique").unwrap();
        assert!(field.primary_key);
        assert!(!field.nullable);
        assert!(!field.unique);

        let err = reflect_one(DeclaredTy::String, "auto").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `app.User.Value`: invalid schema: non-integer type cannot set auto"
        );
        assert!(reflect_one(DeclaredTy::I16, "auto").is_err());
    }

    #[test]
    fn defaults() {
        let field = reflect_one(DeclaredTy::I32, "default=18").unwrap();
        assert_eq!(field.default.unwrap().value, crate::stmt::Value::I64(18));

        assert!(reflect_one(DeclaredTy::I32, "unique;default=18")
            .unwrap()
            .default
            .is_none());
        assert!(reflect_one(DeclaredTy::DateTime, "default=now")
            .unwrap()
            .default
            .is_none());

        let err = reflect_one(DeclaredTy::I32, "default=abc").unwrap_err();
        assert!(err.is_invalid_schema());
        assert!(err.to_string().contains("wrong tag value `default=abc`"));
    }

    #[test]
    fn embedded_fields_flatten() {
        let def = ModelDef::new("app", "Post")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .embed(
                "Audit",
                vec![
                    FieldDef::new("CreatedAt", DeclaredTy::DateTime, "auto_now_add"),
                    FieldDef::new("Note", DeclaredTy::String, "-"),
                ],
            )
            .private_field("cache", DeclaredTy::String);

        let model = reflect(ModelId(0), &def, "post".to_string()).unwrap();
        let names: Vec<_> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["ID", "CreatedAt"]);
        assert_eq!(model.fields[1].full_name, "app.Post.Audit.CreatedAt");
        assert!(model.fields[1].auto_now_add);
    }
}
