use pretty_assertions::assert_eq;
use rivet::{Condition, Response, Value, ValueRecord};
use tests::{
    models,
    models::{Article, Group, User},
};

fn user_row(id: i64, name: &str, age: i64) -> ValueRecord {
    ValueRecord::new()
        .with("id", id)
        .with("name", name)
        .with("age", age)
}

#[tokio::test]
async fn all_loads_every_row() {
    let (db, mut log) = tests::sqlite(models!(User, Group));

    log.respond(Response::values(vec![
        user_row(1, "ann", 30),
        user_row(2, "bob", 25),
    ]));

    let users = db
        .query::<User>()
        .unwrap()
        .filter("age__gte", 18)
        .order_by(&["-age"])
        .limit(10)
        .all()
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name, "bob");
    assert_eq!(users[1].id, Some(2));

    let (sql, params) = log.pop().unwrap();
    assert_eq!(
        sql,
        r#"SELECT "id", "name", "age" FROM "user" WHERE "age" >= ? ORDER BY "age" DESC LIMIT 10"#
    );
    assert_eq!(params, [Value::I64(18)]);
}

#[tokio::test]
async fn count_and_exists() {
    let (db, mut log) = tests::sqlite(models!(User, Group));

    log.respond(Response::values(vec![
        ValueRecord::new().with("COUNT(*)", 3)
    ]));
    log.respond(Response::values(vec![
        ValueRecord::new().with("COUNT(*)", 0)
    ]));

    let query = db.query::<User>().unwrap().exclude("name", "ann");
    assert_eq!(query.count().await.unwrap(), 3);
    assert!(!query.exists().await.unwrap());

    let (sql, params) = log.pop().unwrap();
    assert_eq!(sql, r#"SELECT COUNT(*) FROM "user" WHERE NOT "name" = ?"#);
    assert_eq!(params, [Value::from("ann")]);
}

#[tokio::test]
async fn one_needs_exactly_one_row() {
    let (db, mut log) = tests::sqlite(models!(User, Group));
    let query = db.query::<User>().unwrap().filter("name", "ann");

    assert!(query.one().await.unwrap_err().is_record_not_found());

    log.respond(Response::values(vec![user_row(1, "ann", 30)]));
    assert_eq!(query.one().await.unwrap().age, 30);

    log.respond(Response::values(vec![
        user_row(1, "ann", 30),
        user_row(5, "ann", 31),
    ]));
    assert!(query.one().await.unwrap_err().is_too_many_records());

    let (sql, _) = log.pop().unwrap();
    assert_eq!(
        sql,
        r#"SELECT "id", "name", "age" FROM "user" WHERE "name" = ? LIMIT 2"#
    );
}

#[tokio::test]
async fn filters_through_relations_join() {
    let (db, mut log) = tests::sqlite(models!(User, Group));

    db.query::<User>()
        .unwrap()
        .filter("groups__name", "admins")
        .all()
        .await
        .unwrap();

    let (sql, params) = log.pop().unwrap();
    assert!(sql.starts_with(r#"SELECT T0."id", T0."name", T0."age" FROM "user" T0 LEFT OUTER JOIN"#), "{sql}");
    assert!(sql.contains(r#""user_group""#), "{sql}");
    assert_eq!(params, [Value::from("admins")]);
}

#[tokio::test]
async fn bulk_update_and_delete() {
    let (db, mut log) = tests::sqlite(models!(User, Group));

    log.respond(Response::count(4));
    let updated = db
        .query::<User>()
        .unwrap()
        .filter("name", "ann")
        .update(ValueRecord::new().with("Age", 31))
        .await
        .unwrap();
    assert_eq!(updated, 4);

    let cond = Condition::new().and("age__lt", 18).or("age__gt", 99);
    db.query::<User>()
        .unwrap()
        .set_cond(cond)
        .delete()
        .await
        .unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"UPDATE "user" SET "age" = ? WHERE "name" = ?"#.to_string(),
            vec![Value::I64(31), Value::from("ann")]
        ))
    );
    assert_eq!(
        log.pop(),
        Some((
            r#"DELETE FROM "user" WHERE "age" < ? OR "age" > ?"#.to_string(),
            vec![Value::I64(18), Value::I64(99)]
        ))
    );
}

#[tokio::test]
async fn bulk_writes_cannot_join() {
    let (db, log) = tests::sqlite(models!(User, Group));

    let err = db
        .query::<User>()
        .unwrap()
        .filter("groups__name", "admins")
        .delete()
        .await
        .unwrap_err();

    assert!(err.is_invalid_statement());
    assert!(log.is_empty());
}

#[tokio::test]
async fn timestamps_use_the_configured_time_zone() {
    let mut builder = models!(Article);
    builder.time_zone(jiff::tz::TimeZone::fixed(jiff::tz::offset(2)));
    let (db, mut log) = tests::sqlite(builder);

    db.query::<Article>()
        .unwrap()
        .filter("created_at__gte", jiff::Timestamp::UNIX_EPOCH)
        .all()
        .await
        .unwrap();

    let (_, params) = log.pop().unwrap();
    assert_eq!(
        params,
        [Value::DateTime(jiff::civil::date(1970, 1, 1).at(2, 0, 0, 0))]
    );
}
