use pretty_assertions::assert_eq;
use rivet_core::{
    schema::{plan::PlanArg, DeclaredTy, ModelDef, ModelId, Registry},
    stmt::{Value, ValueRecord},
    Schema,
};
use rivet_sql::Serializer;
use std::sync::Arc;

fn schema() -> (Arc<Schema>, ModelId) {
    let registry = Registry::new();
    let article = registry
        .register(
            ModelDef::new("app", "Article")
                .field("ID", DeclaredTy::I64, "pk;auto")
                .field("Title", DeclaredTy::String, "")
                .field("Body", DeclaredTy::String, "type=text")
                .field("Version", DeclaredTy::I32, "")
                .field("Draft", DeclaredTy::Bool, "-"),
        )
        .unwrap();
    registry
        .configure(article, |model| model.set_version("Version").map(|_| ()))
        .unwrap();
    (registry.bootstrap().unwrap(), article)
}

fn record() -> ValueRecord {
    ValueRecord::new()
        .with("ID", 7)
        .with("Title", "t")
        .with("Body", "b")
        .with("Version", 3)
}

#[test]
fn update_bumps_and_checks_the_version() {
    let (schema, article) = schema();
    let serializer = Serializer::sqlite(&schema);
    let plan = serializer.update_plan(article, None).unwrap();

    assert_eq!(
        plan.sql,
        r#"UPDATE "article" SET "title" = ?, "body" = ?, "version" = ? WHERE "id" = ? AND "version" = ?"#
    );
    assert_eq!(
        plan.params,
        [
            PlanArg::Field("Title".into()),
            PlanArg::Field("Body".into()),
            PlanArg::NextVersion("Version".into()),
            PlanArg::Field("ID".into()),
            PlanArg::Field("Version".into()),
        ]
    );
    assert_eq!(plan.version.as_deref(), Some("Version"));

    let params = serializer.bind(article, &plan, &record(), &[]).unwrap();
    assert_eq!(
        params,
        [
            Value::from("t"),
            Value::from("b"),
            Value::I64(4),
            Value::I64(7),
            Value::I64(3)
        ]
    );
}

#[test]
fn missing_version_starts_at_one() {
    let (schema, article) = schema();
    let serializer = Serializer::sqlite(&schema);
    let plan = serializer.insert_plan(article).unwrap();

    assert_eq!(
        plan.sql,
        r#"INSERT INTO "article" ("title", "body", "version") VALUES (?, ?, ?)"#
    );

    let record = ValueRecord::new()
        .with("Title", "t")
        .with("Body", "b")
        .with("Version", Value::Null);
    let params = serializer.bind(article, &plan, &record, &[]).unwrap();
    assert_eq!(params[2], Value::I64(1));
}

#[test]
fn partial_update_in_model_order() {
    let (schema, article) = schema();
    let serializer = Serializer::postgresql(&schema);

    let plan = serializer
        .update_plan(article, Some(&["Body", "Title"]))
        .unwrap();
    assert_eq!(
        plan.sql,
        r#"UPDATE "article" SET "title" = $1, "body" = $2, "version" = $3 WHERE "id" = $4 AND "version" = $5"#
    );

    let same = serializer
        .update_plan(article, Some(&["title", "Body"]))
        .unwrap();
    assert!(Arc::ptr_eq(&plan, &same));

    let body = serializer.update_plan(article, Some(&["Body"])).unwrap();
    assert_eq!(
        body.sql,
        r#"UPDATE "article" SET "body" = $1, "version" = $2 WHERE "id" = $3 AND "version" = $4"#
    );
}

#[test]
fn partial_update_needs_a_settable_field() {
    let (schema, article) = schema();
    let serializer = Serializer::sqlite(&schema);

    let err = serializer.update_plan(article, Some(&["ID"])).unwrap_err();
    assert!(err.to_string().contains("no columns to update"), "{err}");

    let err = serializer.update_plan(article, Some(&["Nope"])).unwrap_err();
    assert!(err.is_invalid_statement());
}

#[test]
fn delete_checks_the_version() {
    let (schema, article) = schema();
    let plan = Serializer::sqlite(&schema).delete_plan(article).unwrap();

    assert_eq!(
        plan.sql,
        r#"DELETE FROM "article" WHERE "id" = ? AND "version" = ?"#
    );
}

#[test]
fn get_selects_every_column() {
    let (schema, article) = schema();
    let plan = Serializer::mysql(&schema).get_plan(article).unwrap();

    assert_eq!(
        plan.sql,
        "SELECT `id`, `title`, `body`, `version` FROM `article` WHERE `id` = ?"
    );
    let fields: Vec<_> = plan.columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, ["ID", "Title", "Body", "Version"]);
}

#[test]
fn version_must_be_an_integer() {
    let (schema, article) = schema();
    let serializer = Serializer::sqlite(&schema);
    let plan = serializer.update_plan(article, None).unwrap();

    let record = record().with("Version", "three");
    let err = serializer.bind(article, &plan, &record, &[]).unwrap_err();
    assert!(err.to_string().contains("is not an integer"), "{err}");
}

#[test]
fn one_schema_serves_each_backend_its_own_plan() {
    let (schema, article) = schema();

    let sqlite = Serializer::sqlite(&schema).update_plan(article, None).unwrap();
    let pg = Serializer::postgresql(&schema).update_plan(article, None).unwrap();

    assert!(!Arc::ptr_eq(&sqlite, &pg));
    assert!(sqlite.sql.contains("\"title\" = ?"), "{}", sqlite.sql);
    assert_eq!(
        pg.sql,
        r#"UPDATE "article" SET "title" = $1, "body" = $2, "version" = $3 WHERE "id" = $4 AND "version" = $5"#
    );

    let again = Serializer::sqlite(&schema).update_plan(article, None).unwrap();
    assert!(Arc::ptr_eq(&sqlite, &again));
}
