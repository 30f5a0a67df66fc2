use dabo::{FieldType, TableDef, TableRegistry, Value};
use pretty_assertions::assert_eq;
use tests::{assert_err, TestDb};

fn registry() -> TableRegistry {
    let mut registry = TableRegistry::new();
    registry.register(
        TableDef::new("cust")
            .auto_key("id")
            .field("name", FieldType::Char),
    );
    registry.register(
        TableDef::new("ord")
            .auto_key("id")
            .field("cust_id", FieldType::Int)
            .field("qty", FieldType::Int),
    );
    registry
}

#[tokio::test]
async fn creates_missing_tables() {
    let mut db = TestDb::new().await;
    db.exec_all(&["CREATE TABLE ord (id INTEGER PRIMARY KEY, cust_id INTEGER, qty INTEGER)"])
        .await;

    let created = registry().ensure_tables(&db.conn).await.unwrap();
    assert_eq!(created, ["cust"]);
    assert_eq!(
        db.log.statements(),
        ["CREATE TABLE \"cust\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT)"]
    );

    db.log.clear();
    let created = registry().ensure_tables(&db.conn).await.unwrap();
    assert!(created.is_empty());
    assert!(db.log.is_empty());
}

#[tokio::test]
async fn created_tables_are_usable() {
    let db = TestDb::new().await;
    registry().ensure_tables(&db.conn).await.unwrap();

    let mut cursor = db.conn.cursor("cust");
    cursor.set_key_field("id");
    cursor.requery(&[]).await.unwrap();
    assert_eq!(cursor.row_count(), 0);

    cursor.new_record().await.unwrap();
    cursor.set_field_val("name", "Alice").unwrap();
    cursor.save(false).await.unwrap();
    assert_eq!(cursor.current_pk(), Some(Value::Int(1)));
}

#[tokio::test]
async fn refused_ddl_is_written_to_queries_file() {
    let db = TestDb::new().await;
    db.deny_ddl();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queries.sql");

    let mut registry = registry();
    registry.set_queries_path(Some(path.clone()));

    let err = assert_err!(registry.ensure_tables(&db.conn).await);
    assert!(err.is_db_no_access());

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "#Queries for DB ':memory:' on host '':\n\
         CREATE TABLE \"cust\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT);\n\
         CREATE TABLE \"ord\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"cust_id\" INTEGER, \"qty\" INTEGER);\n"
    );

    // A second refusal appends
    assert_err!(registry.ensure_tables(&db.conn).await);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("#Queries for DB").count(), 2);
}

#[tokio::test]
async fn refused_ddl_without_queries_file() {
    let db = TestDb::new().await;
    db.deny_ddl();

    let mut registry = registry();
    registry.set_queries_path(None);

    let err = assert_err!(registry.ensure_tables(&db.conn).await);
    assert!(err.is_db_no_access());
}
