use pretty_assertions::assert_eq;
use tests::{
    models,
    models::{Group, User},
};

#[tokio::test]
async fn every_model_gets_a_table() {
    let (db, log) = tests::sqlite(models!(User, Group));

    db.create_tables(true).await.unwrap();

    let sql = log.sql();
    assert_eq!(log.count_prefix("CREATE TABLE IF NOT EXISTS"), 3);
    assert!(sql.iter().any(|s| s.starts_with(r#"CREATE TABLE IF NOT EXISTS "user_group""#)));
    assert!(sql.contains(&r#"CREATE INDEX IF NOT EXISTS "user_age" ON "user" ("age")"#.to_string()));
}

#[tokio::test]
async fn prefixed_tables_on_postgresql() {
    let mut builder = models!(User, Group);
    builder.table_name_prefix("t1_");
    let (db, log) = tests::postgresql(builder);

    db.create_tables(false).await.unwrap();

    let sql = log.sql();
    assert!(
        sql.iter().any(|s| s.starts_with(
            "CREATE TABLE \"t1_user\" (\n    \"id\" bigserial NOT NULL PRIMARY KEY,"
        )),
        "{sql:#?}"
    );
    assert!(sql.iter().any(|s| s.starts_with(r#"CREATE TABLE "t1_user_t1_group""#)), "{sql:#?}");
}
