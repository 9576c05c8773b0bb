use rivet::Db;
use tests::{
    models,
    models::{Group, User},
};

// The handle is process-wide, so the whole lifecycle lives in one test.
#[tokio::test]
async fn global_handle_lifecycle() {
    assert!(Db::global().unwrap_err().is_uninitialized());

    let (db, log) = tests::sqlite(models!(User, Group));
    db.clone().set_global().unwrap();

    let global = Db::global().unwrap();
    global.query::<User>().unwrap().all().await.unwrap();
    assert_eq!(log.len(), 1);

    let (other, _) = tests::sqlite(models!(User, Group));
    assert!(other.set_global().is_err());
}
