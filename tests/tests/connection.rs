use dabo::{ConnectInfo, Connection, ConnectionDefs, Value};
use pretty_assertions::assert_eq;
use tests::{assert_err, assert_err_is, assert_ok};

#[tokio::test]
async fn connect_from_url() {
    let info = ConnectInfo::from_url("sqlite::memory:").unwrap();
    assert_eq!(info.backend_name(), "sqlite");
    assert_eq!(info.database(), ":memory:");

    let conn = assert_ok!(Connection::connect(&info).await);
    assert!(!conn.is_remote());

    conn.exec("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", &[])
        .await
        .unwrap();
    assert_eq!(conn.tables(false).await.unwrap(), ["t"]);

    let mut cursor = conn.cursor("t");
    cursor.set_key_field("id");
    cursor.requery(&[]).await.unwrap();
    assert_eq!(cursor.row_count(), 0);
}

#[tokio::test]
async fn connect_from_named_definition() {
    let defs: ConnectionDefs = r#"
[connections.local]
backend = "sqlite"
database = ":memory:"
"#
    .parse()
    .unwrap();

    let info = defs.connect_info("local").unwrap();
    let conn = assert_ok!(Connection::connect(&info).await);
    assert_eq!(conn.connect_info().database(), ":memory:");

    assert_err_is!(defs.connect_info("missing"), is_invalid_configuration);
}

#[tokio::test]
async fn unknown_backend_is_rejected() {
    let err = assert_err!(ConnectInfo::new("oracle"));
    assert!(err.is_invalid_configuration());
}

#[tokio::test]
async fn temp_pks_are_shared_by_clones() {
    let info = ConnectInfo::from_url("sqlite::memory:").unwrap();
    let conn = Connection::connect(&info).await.unwrap();

    assert_eq!(conn.next_temp_pk(), Value::from("-1-dabotmp"));
    assert_eq!(conn.clone().next_temp_pk(), Value::from("-2-dabotmp"));
}
