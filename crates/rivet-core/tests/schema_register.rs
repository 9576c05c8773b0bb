use rivet_core::schema::*;

fn user() -> ModelDef {
    ModelDef::new("app", "User")
        .field("ID", DeclaredTy::I64, "pk;auto")
        .field("Name", DeclaredTy::String, "size=64")
        .field("Age", DeclaredTy::I32, "")
}

#[test]
fn table_name_defaults_to_snake_case() {
    let registry = Registry::new();
    registry
        .register(ModelDef::new("app", "UserProfile").field("ID", DeclaredTy::I64, "pk;auto"))
        .unwrap();

    let schema = registry.bootstrap().unwrap();
    let model = schema.model_by_table("user_profile").unwrap();
    assert_eq!(model.full_name, "app.UserProfile");
    assert!(model.manual);
}

#[test]
fn same_table_rejected() {
    let registry = Registry::new();
    registry.register(user()).unwrap();

    let other = ModelDef::new("admin", "Account")
        .table("user")
        .field("ID", DeclaredTy::I64, "pk;auto");

    let err = registry.register(other).unwrap_err();
    assert!(err.is_invalid_schema());
    assert_eq!(
        err.to_string(),
        "invalid schema: table name `user` registered more than once, must be unique"
    );
}

#[test]
fn same_type_rejected() {
    let registry = Registry::new();
    registry.register(user()).unwrap();

    let err = registry.register(user().table("people")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid schema: model `app.User` registered more than once, must be unique"
    );
}

#[test]
fn composite_primary_key() {
    let registry = Registry::new();
    registry
        .register(
            ModelDef::new("app", "Membership")
                .field("UserID", DeclaredTy::I64, "pk")
                .field("GroupID", DeclaredTy::I64, "pk")
                .field("Role", DeclaredTy::String, ""),
        )
        .unwrap();

    let schema = registry.bootstrap().unwrap();
    let model = schema.model_by_table("membership").unwrap();
    let keys: Vec<_> = model.primary_key_fields().map(|f| f.column.as_str()).collect();
    assert_eq!(keys, ["user_id", "group_id"]);
    assert!(model.single_primary_key().is_err());
}

#[test]
fn field_error_names_field() {
    let registry = Registry::new();
    let def = ModelDef::new("app", "User")
        .field("ID", DeclaredTy::I64, "pk;auto")
        .field("Age", DeclaredTy::I32, "column=name")
        .field("Name", DeclaredTy::String, "");

    let err = registry.register(def).unwrap_err();
    assert_eq!(
        err.to_string(),
        "field `app.User.Name`: invalid schema: duplicate column name: name"
    );
}

#[test]
fn schema_name_recorded() {
    let registry = Registry::new();
    registry.register_with_schema(user(), "accounts").unwrap();

    let schema = registry.bootstrap().unwrap();
    let model = schema.model_by_table("user").unwrap();
    assert_eq!(model.schema_name.as_deref(), Some("accounts"));
}

#[test]
fn configure_before_bootstrap() {
    let registry = Registry::new();
    let id = registry.register(user()).unwrap();

    registry
        .configure(id, |model| {
            model.field_mut("Name")?.rename("full_name").set_unique(true);
            model.field_mut("Age")?.set_transient(true);
            model.set_unique_together(&["Name", "Age"])?;
            model.add_index("idx_user_age", "", &["age"])?;
            Ok(())
        })
        .unwrap();

    let schema = registry.bootstrap().unwrap();
    let model = schema.model(id);
    let name = model.field_by_name("Name").unwrap();
    assert_eq!(name.column, "full_name");
    assert!(name.unique);

    let columns: Vec<_> = model.columns().map(|f| f.column.as_str()).collect();
    assert_eq!(columns, ["id", "full_name"]);
    assert_eq!(model.unique_together, [vec!["Name".to_string(), "Age".to_string()]]);
    assert_eq!(model.indexes[0].name, "idx_user_age");
}

#[test]
fn configure_rejects_unknown_fields() {
    let registry = Registry::new();
    let id = registry.register(user()).unwrap();

    let err = registry
        .configure(id, |model| {
            model.set_version("Revision")?;
            Ok(())
        })
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid schema: no field `Revision` in table `user`"
    );
}

#[test]
fn declared_indexes_and_unique_groups() {
    let registry = Registry::new();
    let id = registry
        .register(user().index(&["name", "age"]).unique_together(&["Name", "Age"]))
        .unwrap();

    let schema = registry.bootstrap().unwrap();
    let model = schema.model(id);
    assert_eq!(model.indexes[0].name, "idx_user_name_age");
    assert_eq!(model.indexes[0].columns, ["name", "age"]);
    assert_eq!(model.unique_together.len(), 1);
}
