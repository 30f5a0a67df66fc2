use dabo::{
    cursor::{KeyChange, SortDirection},
    Cursor, FieldType, Value,
};
use pretty_assertions::assert_eq;
use tests::{assert_err, assert_err_is, assert_ok, ExecOp, TestDb};

async fn cust_cursor(db: &TestDb) -> Cursor {
    let mut cursor = db.conn.cursor("cust");
    cursor.set_key_field("id");
    cursor.requery(&[]).await.unwrap();
    cursor
}

fn names(cursor: &Cursor) -> Vec<String> {
    cursor
        .rows()
        .iter()
        .map(|row| row.get("n").unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn requery_snapshots_every_row() {
    let db = TestDb::cust_ord().await;
    let cursor = cust_cursor(&db).await;

    assert_eq!(cursor.row_count(), 3);
    assert_eq!(cursor.row_number(), Some(0));
    assert_eq!(cursor.last_sql(), "SELECT * FROM cust LIMIT 1000");
    assert_eq!(cursor.fields().collect::<Vec<_>>(), ["id", "name"]);
    assert_eq!(cursor.field_type("id"), Some(FieldType::Int));
    assert!(cursor.non_update_fields().is_empty());

    assert!(!cursor.is_changed(true));
    for row in cursor.rows() {
        assert_eq!(row.memento().unwrap().values(), row.values());
    }
}

#[tokio::test]
async fn requery_requires_a_key() {
    let db = TestDb::cust_ord().await;
    let mut cursor = db.conn.cursor("cust");

    let err = assert_err!(cursor.requery(&[]).await);
    assert!(err.is_missing_pk());
    assert!(db.log.is_empty());
}

#[tokio::test]
async fn navigation_boundaries() {
    let db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;

    assert_err_is!(cursor.prior(), is_beginning_of_file);
    assert_eq!(cursor.row_number(), Some(0));

    assert_eq!(assert_ok!(cursor.last()), 2);
    assert_err_is!(cursor.next(), is_end_of_file);
    assert_eq!(cursor.row_number(), Some(2));

    assert_ok!(cursor.move_to_row_num(1));
    assert_ok!(cursor.next());
    assert_ok!(cursor.prior());
    assert_eq!(cursor.row_number(), Some(1));

    assert_err_is!(cursor.move_to_row_num(7), is_row_not_found);
    assert_eq!(cursor.row_number(), Some(1));
}

#[tokio::test]
async fn move_to_pk() {
    let db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;

    assert!(cursor.move_to_pk(&Value::Int(3)));
    assert_eq!(cursor.row_number(), Some(2));

    assert!(!cursor.move_to_pk(&Value::Int(42)));
    assert_eq!(cursor.row_number(), Some(0));
}

#[tokio::test]
async fn empty_result_set() {
    let db = TestDb::cust_ord().await;
    let mut cursor = db.conn.cursor("cust");
    cursor.set_key_field("id");
    cursor.sql_builder_mut().set_where_clause("name = 'Nobody'");
    cursor.requery(&[]).await.unwrap();

    assert_eq!(cursor.row_count(), 0);
    assert_eq!(cursor.row_number(), None);
    assert_eq!(cursor.fields().count(), 2);

    assert_err_is!(cursor.first(), is_no_records);
    assert_err_is!(cursor.next(), is_no_records);
    assert_err_is!(cursor.delete(None).await, is_no_records);
    assert_err_is!(cursor.get_field_val("name"), is_no_records);
}

#[tokio::test]
async fn update_uses_original_key() {
    let mut db = TestDb::new().await;
    db.exec_all(&[
        "CREATE TABLE t (k INTEGER PRIMARY KEY, n TEXT)",
        "INSERT INTO t (k, n) VALUES (7, 'x')",
    ])
    .await;

    let mut cursor = db.conn.cursor("t");
    cursor.set_key_field("k");
    cursor.requery(&[]).await.unwrap();
    db.log.clear();

    cursor.set_field_val("k", 9).unwrap();
    cursor.set_field_val("n", "y").unwrap();
    assert!(cursor.is_changed(false));
    assert!(cursor.save(false).await.unwrap().is_empty());

    assert_eq!(
        db.log.pop(),
        Some(ExecOp::Exec {
            sql: "UPDATE t SET k = ?, n = ? WHERE k = 7".to_string(),
            params: vec![Value::Int(9), Value::from("y")],
        })
    );
    assert!(db.log.is_empty());

    assert_eq!(cursor.get_orig_val("k").unwrap(), &Value::Int(9));
    assert!(!cursor.is_changed(true));

    cursor.requery(&[]).await.unwrap();
    assert_eq!(cursor.get_field_val("n").unwrap(), &Value::from("y"));
    assert_eq!(cursor.current_pk(), Some(Value::Int(9)));
}

#[tokio::test]
async fn restoring_a_value_emits_no_update() {
    let mut db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;
    db.log.clear();

    cursor.set_field_val("name", "Zed").unwrap();
    cursor.set_field_val("name", "Alice").unwrap();
    assert!(!cursor.is_changed(false));

    cursor.save(true).await.unwrap();
    assert!(db.log.is_empty());
}

#[tokio::test]
async fn set_field_val_coerces() {
    let db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;

    cursor.set_field_val("id", "12").unwrap();
    assert_eq!(cursor.get_field_val("id").unwrap(), &Value::Int(12));

    // A value that does not convert is ignored, not fatal
    assert_ok!(cursor.set_field_val("id", "twelve"));
    assert_eq!(cursor.get_field_val("id").unwrap(), &Value::Int(12));

    let err = assert_err!(cursor.set_field_val("nmae", "x"));
    assert!(err.is_field_not_found());
}

#[tokio::test]
async fn new_then_cancel_is_a_no_op() {
    let db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;
    cursor.move_to_row_num(1).unwrap();

    assert_eq!(cursor.new_record().await.unwrap(), 3);
    assert!(cursor.is_adding());
    assert_eq!(cursor.row_count(), 4);

    let temp_pk = cursor.get_field_val("id").unwrap().clone();
    assert_eq!(temp_pk, Value::from("-1-dabotmp"));
    assert_eq!(cursor.current_row().unwrap().temp_pk(), Some(&temp_pk));
    assert_eq!(cursor.get_field_val("name").unwrap(), &Value::from(""));

    cursor.cancel(false);
    assert_eq!(cursor.row_count(), 3);
    assert!(!cursor.is_changed(true));
}

#[tokio::test]
async fn temp_pks_are_unique_per_connection() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_cursor(&db).await;
    let mut ord = db.conn.cursor("ord");
    ord.set_key_field("id");

    cust.new_record().await.unwrap();
    ord.new_record().await.unwrap();
    cust.new_record().await.unwrap();

    assert_eq!(ord.current_pk(), Some(Value::from("-2-dabotmp")));
    assert_eq!(cust.current_pk(), Some(Value::from("-3-dabotmp")));
}

#[tokio::test]
async fn insert_replaces_temp_pk() {
    let mut db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;

    cursor.new_record().await.unwrap();
    cursor.set_field_val("name", "Dave").unwrap();
    db.log.clear();

    let changes = cursor.save(false).await.unwrap();
    assert_eq!(
        changes,
        vec![KeyChange {
            old: Value::from("-1-dabotmp"),
            new: Value::Int(4),
        }]
    );

    assert_eq!(
        db.log.pop(),
        Some(ExecOp::Exec {
            sql: "INSERT INTO cust (name) VALUES (?)".to_string(),
            params: vec![Value::from("Dave")],
        })
    );

    let row = cursor.current_row().unwrap();
    assert!(!row.is_new());
    assert_eq!(row.get("id"), Some(&Value::Int(4)));
    assert_eq!(row.temp_pk(), Some(&Value::Int(4)));
    assert!(!cursor.is_changed(true));
}

#[tokio::test]
async fn new_record_loads_structure() {
    let mut db = TestDb::cust_ord().await;
    let mut cursor = db.conn.cursor("ord");
    cursor.set_key_field("id");

    cursor.new_record().await.unwrap();
    assert_eq!(
        db.log.statements(),
        ["SELECT * FROM ord WHERE 1 = 0 LIMIT 1000"]
    );
    assert_eq!(cursor.fields().collect::<Vec<_>>(), ["id", "cust_id", "qty"]);
    assert_eq!(cursor.get_field_val("qty").unwrap(), &Value::Null);

    db.log.clear();
    cursor.set_field_val("cust_id", 2).unwrap();
    cursor.set_field_val("qty", 4).unwrap();
    cursor.save(false).await.unwrap();
    assert_eq!(
        db.log.statements(),
        ["INSERT INTO ord (cust_id, qty) VALUES (?, ?)"]
    );
}

#[tokio::test]
async fn delete_by_key() {
    let mut db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;
    cursor.move_to_row_num(1).unwrap();
    db.log.clear();

    cursor.delete(None).await.unwrap();
    assert_eq!(db.log.statements(), ["DELETE FROM cust WHERE id = 2"]);
    assert_eq!(cursor.row_count(), 2);
    assert_eq!(cursor.get_field_val("name").unwrap(), &Value::from("Carol"));
}

#[tokio::test]
async fn delete_new_row_stays_in_memory() {
    let mut db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;
    cursor.new_record().await.unwrap();
    db.log.clear();

    cursor.delete(None).await.unwrap();
    assert!(db.log.is_empty());
    assert_eq!(cursor.row_count(), 3);
    assert_eq!(cursor.row_number(), Some(2));
}

#[tokio::test]
async fn stale_rows_are_reported() {
    let db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;

    db.conn.exec("DELETE FROM cust WHERE id = 1", &[]).await.unwrap();

    cursor.set_field_val("name", "Zed").unwrap();
    let err = assert_err!(cursor.save(false).await);
    assert!(err.is_db_query());
    assert!(err.to_string().contains("another user"));
    assert!(cursor.is_changed(false));

    let err = assert_err!(cursor.delete(None).await);
    assert!(err.is_db_query());
    assert_eq!(cursor.row_count(), 3);
}

#[tokio::test]
async fn sort_cycles() {
    let mut db = TestDb::new().await;
    db.exec_all(&[
        "CREATE TABLE s (k INTEGER PRIMARY KEY, n TEXT)",
        "INSERT INTO s (k, n) VALUES (1, 'b'), (2, 'a'), (3, 'c')",
    ])
    .await;

    let mut cursor = db.conn.cursor("s");
    cursor.set_key_field("k");
    cursor.requery(&[]).await.unwrap();
    assert_eq!(names(&cursor), ["b", "a", "c"]);

    cursor.sort("n", None, false).unwrap();
    assert_eq!(names(&cursor), ["a", "b", "c"]);
    assert_eq!(cursor.sort_order().unwrap().direction, SortDirection::Asc);

    // The pointer follows its row
    assert_eq!(cursor.row_number(), Some(1));
    assert_eq!(cursor.current_pk(), Some(Value::Int(1)));

    cursor.sort("n", None, false).unwrap();
    assert_eq!(names(&cursor), ["c", "b", "a"]);

    cursor.sort("n", None, false).unwrap();
    assert_eq!(names(&cursor), ["b", "a", "c"]);
    assert!(cursor.sort_order().is_none());

    cursor.sort("n", Some(SortDirection::Asc), false).unwrap();
    cursor.sort("n", Some(SortDirection::Asc), false).unwrap();
    assert_eq!(names(&cursor), ["a", "b", "c"]);

    assert_err_is!(cursor.sort("m", None, false), is_field_not_found);
}

#[tokio::test]
async fn sort_nulls_low_and_case() {
    let mut db = TestDb::new().await;
    db.exec_all(&[
        "CREATE TABLE s (k INTEGER PRIMARY KEY, n TEXT)",
        "INSERT INTO s (k, n) VALUES (1, 'b'), (2, NULL), (3, 'A')",
    ])
    .await;

    let mut cursor = db.conn.cursor("s");
    cursor.set_key_field("k");
    cursor.requery(&[]).await.unwrap();

    cursor.sort("n", Some(SortDirection::Asc), false).unwrap();
    assert_eq!(names(&cursor), ["NULL", "A", "b"]);

    cursor.sort("n", Some(SortDirection::Desc), true).unwrap();
    assert_eq!(names(&cursor), ["b", "A", "NULL"]);
}

#[tokio::test]
async fn seek() {
    let mut db = TestDb::new().await;
    db.exec_all(&[
        "CREATE TABLE s (k INTEGER PRIMARY KEY, n TEXT)",
        "INSERT INTO s (k, n) VALUES (1, 'b'), (2, 'a'), (3, 'd')",
    ])
    .await;

    let mut cursor = db.conn.cursor("s");
    cursor.set_key_field("k");
    cursor.requery(&[]).await.unwrap();

    // Defaults to the key field, coercing the value
    assert_eq!(cursor.seek("2", None, false, false).unwrap(), Some(1));
    assert_eq!(cursor.row_number(), Some(1));

    cursor.sort("n", None, false).unwrap();
    assert_eq!(cursor.seek("B", None, false, false).unwrap(), Some(1));
    assert_eq!(cursor.seek("B", None, true, false).unwrap(), None);
    assert_eq!(cursor.row_number(), Some(1));

    // Near lands on the largest value below
    assert_eq!(cursor.seek("c", None, false, true).unwrap(), Some(1));
    assert_eq!(cursor.current_pk(), Some(Value::Int(1)));

    assert_err_is!(cursor.seek("x", Some("m"), false, false), is_field_not_found);
}

#[tokio::test]
async fn derived_fields_are_not_written() {
    let mut db = TestDb::cust_ord().await;
    let mut cursor = db.conn.cursor("cust");
    cursor.set_key_field("id");
    cursor
        .sql_builder_mut()
        .set_field_clause("id, name, upper(name) AS shout");
    cursor.requery(&[]).await.unwrap();

    assert_eq!(cursor.non_update_fields(), ["shout"]);
    assert_eq!(
        db.log.count_sql("SELECT * FROM cust WHERE 1 = 0"),
        1,
        "structure query runs once per field clause"
    );

    cursor.requery(&[]).await.unwrap();
    assert_eq!(db.log.count_sql("SELECT * FROM cust WHERE 1 = 0"), 1);

    db.log.clear();
    cursor.set_field_val("shout", "IGNORED").unwrap();
    assert!(!cursor.is_changed(false));

    cursor.set_field_val("name", "Zed").unwrap();
    cursor.save(false).await.unwrap();
    assert_eq!(
        db.log.statements(),
        ["UPDATE cust SET name = ? WHERE id = 1"]
    );
}

#[tokio::test]
async fn scan_visits_every_row() {
    let db = TestDb::cust_ord().await;
    let mut cursor = db.conn.cursor("ord");
    cursor.set_key_field("id");
    cursor.requery(&[]).await.unwrap();
    cursor.move_to_row_num(1).unwrap();

    let mut total = 0;
    cursor
        .scan(|cursor| {
            total += cursor.get_field_val("qty")?.as_i64().unwrap_or_default();
            Ok(())
        })
        .unwrap();

    assert_eq!(total, 13);
    assert_eq!(cursor.row_number(), Some(1));
}

#[tokio::test]
async fn rollback_discards_writes() {
    let mut db = TestDb::cust_ord().await;
    let mut cursor = cust_cursor(&db).await;
    db.log.clear();

    cursor.begin_transaction().await.unwrap();
    cursor.new_record().await.unwrap();
    cursor.set_field_val("name", "Dave").unwrap();
    cursor.save(false).await.unwrap();
    cursor.rollback_transaction().await.unwrap();

    let ops = db.log.ops();
    assert_eq!(ops.first(), Some(&ExecOp::Begin));
    assert_eq!(ops.last(), Some(&ExecOp::Rollback));

    cursor.requery(&[]).await.unwrap();
    assert_eq!(cursor.row_count(), 3);
}

#[tokio::test]
async fn composite_key_where() {
    let mut db = TestDb::new().await;
    db.exec_all(&[
        "CREATE TABLE line (ord_id INTEGER, seq INTEGER, item TEXT, PRIMARY KEY (ord_id, seq))",
        "INSERT INTO line (ord_id, seq, item) VALUES (1, 1, 'nut'), (1, 2, 'bolt')",
    ])
    .await;

    let mut cursor = db.conn.cursor("line");
    cursor.set_key_field("ord_id, seq");
    cursor.requery(&[]).await.unwrap();
    assert_eq!(cursor.key_field(), "ord_id,seq");
    assert_eq!(
        cursor.pk_at(1),
        Some(Value::List(vec![Value::Int(1), Value::Int(2)]))
    );

    cursor.move_to_row_num(1).unwrap();
    cursor.set_field_val("item", "washer").unwrap();
    db.log.clear();
    cursor.save(false).await.unwrap();

    assert_eq!(
        db.log.statements(),
        ["UPDATE line SET item = ? WHERE ord_id = 1 AND seq = 2"]
    );
}
