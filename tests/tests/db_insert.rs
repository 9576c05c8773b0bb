use pretty_assertions::assert_eq;
use rivet::{Error, Response, Value, ValueRecord};
use tests::{
    models,
    models::{Article, Group, Tag, User},
};

#[tokio::test]
async fn sqlite_writes_back_last_insert_id() {
    let (db, mut log) = tests::sqlite(models!(User, Group));

    log.respond(Response::count(1).with_last_insert_id(5));

    let mut user = User {
        name: "ann".into(),
        age: 30,
        ..User::default()
    };
    db.insert(&mut user).await.unwrap();

    assert_eq!(user.id, Some(5));
    assert_eq!(
        log.pop(),
        Some((
            r#"INSERT INTO "user" ("name", "age") VALUES (?, ?)"#.to_string(),
            vec![Value::from("ann"), Value::I64(30)]
        ))
    );
    assert!(log.is_empty());
}

#[tokio::test]
async fn postgresql_reads_the_key_from_returning() {
    let (db, mut log) = tests::postgresql(models!(User, Group));

    log.respond(Response::values(vec![ValueRecord::new().with("id", 9)]));

    let mut user = User {
        name: "bob".into(),
        ..User::default()
    };
    db.insert(&mut user).await.unwrap();

    assert_eq!(user.id, Some(9));
    let (sql, params) = log.pop().unwrap();
    assert_eq!(
        sql,
        r#"INSERT INTO "user" ("id", "name", "age") VALUES (DEFAULT, $1, $2) RETURNING "id""#
    );
    assert_eq!(params, [Value::from("bob"), Value::I64(0)]);
}

#[tokio::test]
async fn natural_keys_are_bound() {
    let (db, mut log) = tests::sqlite(models!(Tag));

    let mut tag = Tag {
        name: "rust".into(),
        hits: 3,
    };
    db.insert(&mut tag).await.unwrap();

    let (sql, params) = log.pop().unwrap();
    assert_eq!(sql, r#"INSERT INTO "tag" ("name", "hits") VALUES (?, ?)"#);
    assert_eq!(params, [Value::from("rust"), Value::I64(3)]);
}

#[tokio::test]
async fn insert_starts_the_version_and_stamps_times() {
    let mut builder = models!(Article);
    builder.configure::<Article>(|model| model.set_version("Version").map(|_| ()));
    let (db, mut log) = tests::sqlite(builder);

    log.respond(Response::count(1).with_last_insert_id(1));

    let mut article = Article {
        title: "hello".into(),
        ..Article::default()
    };
    db.insert(&mut article).await.unwrap();

    assert_eq!(article.id, Some(1));
    assert_eq!(article.version, 1);
    assert!(article.created_at.is_some());
    assert!(article.updated_at.is_some());

    let (sql, params) = log.pop().unwrap();
    assert_eq!(
        sql,
        r#"INSERT INTO "article" ("title", "version", "created_at", "updated_at") VALUES (?, ?, ?, ?)"#
    );
    assert_eq!(params[1], Value::I64(1));
    assert!(matches!(params[2], Value::DateTime(_)));
}

#[tokio::test]
async fn driver_errors_pass_through() {
    let (db, log) = tests::sqlite(models!(User, Group));

    log.fail(Error::driver(std::io::Error::other("disk full")));

    let mut user = User::default();
    let err = db.insert(&mut user).await.unwrap_err();
    assert!(err.is_driver());
    assert_eq!(user.id, None);
}

#[tokio::test]
async fn unregistered_models_are_rejected() {
    let (db, log) = tests::sqlite(models!(User, Group));

    let mut tag = Tag::default();
    let err = db.insert(&mut tag).await.unwrap_err();
    assert!(err.is_invalid_statement());
    assert!(log.is_empty());
}
