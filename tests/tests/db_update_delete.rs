use pretty_assertions::assert_eq;
use rivet::{Response, Value, ValueRecord};
use tests::{
    models,
    models::{Article, Group, User},
};

fn articles() -> (rivet::Db, tests::ExecLog) {
    let mut builder = models!(Article);
    builder.configure::<Article>(|model| model.set_version("Version").map(|_| ()));
    tests::sqlite(builder)
}

fn saved_article() -> Article {
    Article {
        id: Some(7),
        title: "draft".into(),
        version: 3,
        ..Article::default()
    }
}

#[tokio::test]
async fn update_checks_and_bumps_the_version() {
    let (db, mut log) = articles();
    let mut article = saved_article();

    assert_eq!(db.update(&mut article).await.unwrap(), 1);
    assert_eq!(article.version, 4);
    assert!(article.updated_at.is_some());
    assert_eq!(article.created_at, None);

    let (sql, params) = log.pop().unwrap();
    assert_eq!(
        sql,
        r#"UPDATE "article" SET "title" = ?, "created_at" = ?, "updated_at" = ?, "version" = ? WHERE "id" = ? AND "version" = ?"#
    );
    assert_eq!(params[3], Value::I64(4));
    assert_eq!(params[4], Value::I64(7));
    assert_eq!(params[5], Value::I64(3));
}

#[tokio::test]
async fn stale_version_fails_the_update() {
    let (db, log) = articles();
    let mut article = saved_article();

    log.respond(Response::count(0));

    let err = db.update(&mut article).await.unwrap_err();
    assert!(err.is_condition_failed());
    assert_eq!(article.version, 3);
}

#[tokio::test]
async fn stale_version_fails_the_delete() {
    let (db, mut log) = articles();
    let article = saved_article();

    log.respond(Response::count(0));
    assert!(db.delete(&article).await.unwrap_err().is_condition_failed());

    let (sql, params) = log.pop().unwrap();
    assert_eq!(sql, r#"DELETE FROM "article" WHERE "id" = ? AND "version" = ?"#);
    assert_eq!(params, [Value::I64(7), Value::I64(3)]);
}

#[tokio::test]
async fn update_columns_writes_only_the_named_fields() {
    let (db, mut log) = tests::sqlite(models!(User, Group));
    let mut user = User {
        id: Some(2),
        name: "cy".into(),
        age: 40,
    };

    db.update_columns(&mut user, &["Name"]).await.unwrap();

    let (sql, params) = log.pop().unwrap();
    assert_eq!(sql, r#"UPDATE "user" SET "name" = ? WHERE "id" = ?"#);
    assert_eq!(params, [Value::from("cy"), Value::I64(2)]);
}

#[tokio::test]
async fn update_columns_adds_auto_now_fields() {
    let (db, mut log) = articles();
    let mut article = saved_article();

    db.update_columns(&mut article, &["Title"]).await.unwrap();

    let (sql, _) = log.pop().unwrap();
    assert_eq!(
        sql,
        r#"UPDATE "article" SET "title" = ?, "updated_at" = ?, "version" = ? WHERE "id" = ? AND "version" = ?"#
    );
}

#[tokio::test]
async fn unversioned_delete_reports_the_count() {
    let (db, log) = tests::sqlite(models!(User, Group));
    let user = User {
        id: Some(2),
        ..User::default()
    };

    log.respond(Response::count(0));
    assert_eq!(db.delete(&user).await.unwrap(), 0);
}

#[tokio::test]
async fn get_loads_by_primary_key() {
    let (db, mut log) = tests::sqlite(models!(User, Group));

    log.respond(Response::values(vec![ValueRecord::new()
        .with("id", 3)
        .with("name", "dee")
        .with("age", 52)]));

    let mut user = User {
        id: Some(3),
        ..User::default()
    };
    db.get(&mut user).await.unwrap();

    assert_eq!(
        user,
        User {
            id: Some(3),
            name: "dee".into(),
            age: 52,
        }
    );

    let (sql, params) = log.pop().unwrap();
    assert_eq!(sql, r#"SELECT "id", "name", "age" FROM "user" WHERE "id" = ?"#);
    assert_eq!(params, [Value::I64(3)]);
}

#[tokio::test]
async fn get_without_a_row_is_not_found() {
    let (db, _log) = tests::sqlite(models!(User, Group));

    let mut user = User {
        id: Some(404),
        ..User::default()
    };
    assert!(db.get(&mut user).await.unwrap_err().is_record_not_found());
}
