use pretty_assertions::assert_eq;
use rivet::{Response, Value, ValueRecord};
use tests::{
    models,
    models::{Group, User},
};

fn owner() -> User {
    User {
        id: Some(1),
        name: "ann".into(),
        age: 30,
    }
}

fn group(id: i64, name: &str) -> Group {
    Group {
        id: Some(id),
        name: name.into(),
    }
}

#[tokio::test]
async fn add_links_each_target() {
    let (db, mut log) = tests::sqlite(models!(User, Group));
    let user = owner();
    let (admins, staff) = (group(10, "admins"), group(11, "staff"));

    log.respond(Response::count(2));
    let added = db.m2m(&user, "Groups").add(&[&admins, &staff]).await.unwrap();
    assert_eq!(added, 2);

    let (sql, params) = log.pop().unwrap();
    assert_eq!(
        sql,
        r#"INSERT INTO "user_group" ("user_id", "group_id") VALUES (?, ?), (?, ?)"#
    );
    assert_eq!(
        params,
        [Value::I64(1), Value::I64(10), Value::I64(1), Value::I64(11)]
    );
}

#[tokio::test]
async fn add_needs_saved_targets() {
    let (db, log) = tests::sqlite(models!(User, Group));
    let user = owner();
    let unsaved = Group::default();

    let err = db.m2m(&user, "Groups").add(&[&unsaved]).await.unwrap_err();
    assert!(err.is_invalid_statement());
    assert!(log.is_empty());
}

#[tokio::test]
async fn all_loads_through_the_junction() {
    let (db, mut log) = tests::sqlite(models!(User, Group));
    let user = owner();

    log.respond(Response::values(vec![ValueRecord::new()
        .with("id", 10)
        .with("name", "admins")]));

    let groups: Vec<Group> = db.m2m(&user, "Groups").all().await.unwrap();
    assert_eq!(groups, [group(10, "admins")]);

    let (sql, params) = log.pop().unwrap();
    assert_eq!(
        sql,
        r#"SELECT T0."id", T0."name" FROM "group" T0 LEFT OUTER JOIN "user_group" T1 ON T1."group_id" = T0."id" WHERE T1."user_id" = ?"#
    );
    assert_eq!(params, [Value::I64(1)]);
}

#[tokio::test]
async fn reverse_side_shares_the_junction() {
    let (db, mut log) = tests::sqlite(models!(User, Group));
    let admins = group(10, "admins");

    let _: Vec<User> = db.m2m(&admins, "Users").all().await.unwrap();

    let (sql, params) = log.pop().unwrap();
    assert!(sql.contains(r#"FROM "user" T0 LEFT OUTER JOIN "user_group" T1"#), "{sql}");
    assert!(sql.ends_with(r#"WHERE T1."group_id" = ?"#), "{sql}");
    assert_eq!(params, [Value::I64(10)]);
}

#[tokio::test]
async fn wrong_target_type_is_rejected() {
    let (db, _log) = tests::sqlite(models!(User, Group));
    let user = owner();

    let err = db.m2m(&user, "Groups").all::<User>().await.unwrap_err();
    assert!(err.is_invalid_statement());

    let err = db.m2m(&user, "Name").all::<Group>().await.unwrap_err();
    assert!(err.to_string().contains("is not a many-to-many relation"), "{err}");
}

#[tokio::test]
async fn count_remove_and_clear() {
    let (db, mut log) = tests::sqlite(models!(User, Group));
    let user = owner();
    let admins = group(10, "admins");
    let m2m = db.m2m(&user, "Groups");

    log.respond(Response::values(vec![
        ValueRecord::new().with("COUNT(*)", 2)
    ]));
    assert_eq!(m2m.count().await.unwrap(), 2);
    m2m.remove(&[&admins]).await.unwrap();
    m2m.clear().await.unwrap();

    assert_eq!(
        log.sql(),
        [
            r#"SELECT COUNT(*) FROM "user_group" WHERE "user_id" = ?"#,
            r#"DELETE FROM "user_group" WHERE "user_id" = ? AND ("group_id" IN (?))"#,
            r#"DELETE FROM "user_group" WHERE "user_id" = ?"#,
        ]
    );
    log.clear();
}
