use rivet_core::schema::*;

fn assert_missing_model_error(err: &rivet_core::Error, field: &str, target: &str) {
    let msg = err.to_string();
    assert!(err.is_invalid_schema(), "expected invalid schema, got: {msg}");
    assert!(
        msg.contains(field),
        "error should mention field `{field}`, got: {msg}"
    );
    assert!(
        msg.contains(target),
        "error should mention target `{target}`, got: {msg}"
    );
    assert!(
        msg.contains("missing registration"),
        "error should say 'missing registration', got: {msg}"
    );
}

fn registry_with(def: ModelDef) -> Registry {
    let registry = Registry::new();
    registry.register(def).unwrap();
    registry
}

#[test]
fn foreign_key_target_not_registered() {
    let registry = registry_with(
        ModelDef::new("app", "Talk")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .field("Speaker", DeclaredTy::reference("app.Speaker"), "rel=fk"),
    );

    let err = registry.bootstrap().unwrap_err();
    assert_missing_model_error(&err, "app.Talk.Speaker", "app.Speaker");
}

#[test]
fn many_to_many_target_not_registered() {
    let registry = registry_with(
        ModelDef::new("app", "Conference")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .field("Talks", DeclaredTy::list_of("app.Talk"), "rel=m2m"),
    );

    let err = registry.bootstrap().unwrap_err();
    assert_missing_model_error(&err, "app.Conference.Talks", "app.Talk");
}

#[test]
fn reverse_target_not_registered() {
    let registry = registry_with(
        ModelDef::new("app", "User")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .field("Posts", DeclaredTy::list_of("app.Post"), "reverse=many"),
    );

    let err = registry.bootstrap().unwrap_err();
    assert_missing_model_error(&err, "app.User.Posts", "app.Post");
}

#[test]
fn failed_bootstrap_can_be_retried() {
    let registry = registry_with(
        ModelDef::new("app", "Talk")
            .field("ID", DeclaredTy::I64, "pk;auto")
            .field("Speaker", DeclaredTy::reference("app.Speaker"), "rel=fk"),
    );
    assert!(registry.bootstrap().is_err());

    registry
        .register(ModelDef::new("app", "Speaker").field("ID", DeclaredTy::I64, "pk;auto"))
        .unwrap();

    let schema = registry.bootstrap().unwrap();
    let talk = schema.model_by_name("app.Talk").unwrap();
    assert_eq!(talk.field_by_name("Speaker").unwrap().column, "speaker_id");
}
