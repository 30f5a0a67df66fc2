use dabo::{
    bizobj::{Operation, Phase, RiPolicy},
    Bizobj, Row, Value,
};
use pretty_assertions::assert_eq;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tests::{assert_err, assert_err_is, assert_ok, assert_some, ExecOp, TestDb};

async fn cust_with_orders(db: &TestDb) -> Bizobj {
    let mut cust = Bizobj::new(&db.conn, "cust", "id");
    let ord = Bizobj::new(&db.conn, "ord", "id").with_link_field("cust_id");
    cust.add_child(ord).unwrap();
    cust.requery().await.unwrap();
    cust
}

fn orders(cust: &mut Bizobj) -> &mut Bizobj {
    assert_some!(cust.child_mut("ord"))
}

async fn count(db: &TestDb, sql: &str) -> i64 {
    let response = db.conn.exec(sql, &[]).await.unwrap();
    let rows = response.rows.into_values().unwrap();
    rows.scalar().and_then(Value::as_i64).unwrap()
}

#[tokio::test]
async fn child_follows_parent() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    assert_eq!(orders(&mut cust).row_count(), 2);

    db.log.clear();
    cust.next().await.unwrap();
    assert_eq!(orders(&mut cust).row_count(), 1);
    assert_eq!(
        db.log.statements(),
        ["SELECT * FROM ord WHERE ord.cust_id = 2 LIMIT 1000"]
    );

    cust.next().await.unwrap();
    assert_eq!(orders(&mut cust).row_count(), 0);
    assert_err_is!(cust.next().await, is_end_of_file);
}

#[tokio::test]
async fn insert_child_under_unsaved_parent() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;

    cust.new_record().await.unwrap();
    cust.set_field_val("name", "Dave").unwrap();

    let ord = orders(&mut cust);
    ord.new_record().await.unwrap();
    ord.set_field_val("qty", 3).unwrap();
    assert_eq!(ord.get_field_val("cust_id").unwrap(), &Value::from("-1-dabotmp"));

    db.log.clear();
    cust.save().await.unwrap();

    assert_eq!(
        db.log.ops(),
        [
            ExecOp::Begin,
            ExecOp::Exec {
                sql: "INSERT INTO cust (name) VALUES (?)".to_string(),
                params: vec![Value::from("Dave")],
            },
            ExecOp::Exec {
                sql: "INSERT INTO ord (cust_id, qty) VALUES (?, ?)".to_string(),
                params: vec![Value::Int(4), Value::Int(3)],
            },
            ExecOp::Commit,
        ]
    );

    assert!(!cust.is_changed());
    assert!(!cust.is_any_changed());
    assert_eq!(cust.current_pk(), Some(Value::Int(4)));

    let ord = orders(&mut cust);
    assert_eq!(ord.get_field_val("cust_id").unwrap(), &Value::Int(4));
    let row = ord.cursor().current_row().unwrap();
    assert_eq!(row.get("id"), row.temp_pk());
    assert_eq!(count(&db, "SELECT COUNT(*) FROM ord WHERE cust_id = 4").await, 1);
}

#[tokio::test]
async fn child_of_new_parent_is_empty() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    db.log.clear();

    cust.new_record().await.unwrap();
    assert!(cust.is_adding());
    assert_eq!(orders(&mut cust).row_count(), 0);
    assert_eq!(
        db.log.statements(),
        ["SELECT * FROM ord WHERE 1 = 0 LIMIT 1000"]
    );
}

#[tokio::test]
async fn sibling_edits_survive_navigation() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;

    orders(&mut cust).set_field_val("qty", 99).unwrap();

    cust.next().await.unwrap();
    assert_eq!(orders(&mut cust).row_count(), 1);
    assert!(!orders(&mut cust).is_changed());

    db.log.clear();
    cust.prior().await.unwrap();
    assert!(db.log.statements().is_empty());

    let ord = orders(&mut cust);
    assert_eq!(ord.row_count(), 2);
    assert_eq!(ord.get_field_val("qty").unwrap(), &Value::Int(99));
    assert!(ord.is_changed());
    assert!(cust.is_any_changed());
}

#[tokio::test]
async fn restrict_delete_with_children() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    db.log.clear();

    let err = assert_err!(cust.delete().await);
    assert!(err.is_business_rule());
    assert_eq!(cust.row_count(), 3);
    assert!(db.log.is_empty());
}

#[tokio::test]
async fn restrict_delete_without_children() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.last().await.unwrap();

    assert_ok!(cust.delete().await);
    assert_eq!(cust.row_count(), 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM cust").await, 2);
}

#[tokio::test]
async fn cascade_delete() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_delete_policy(RiPolicy::Cascade);
    db.log.clear();

    cust.delete().await.unwrap();

    assert_eq!(db.log.count_sql("DELETE"), 3);
    assert_eq!(db.log.ops().first(), Some(&ExecOp::Begin));
    assert!(db.log.ops().contains(&ExecOp::Commit));
    assert_eq!(count(&db, "SELECT COUNT(*) FROM ord WHERE cust_id = 1").await, 0);

    assert_eq!(cust.row_count(), 2);
    assert_eq!(cust.current_pk(), Some(Value::Int(2)));
    assert_eq!(orders(&mut cust).row_count(), 1);
}

#[tokio::test]
async fn ignore_delete_orphans_children() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_delete_policy(RiPolicy::Ignore);
    orders(&mut cust).set_field_val("qty", 50).unwrap();

    cust.delete().await.unwrap();
    assert!(!cust.is_any_changed());
    assert_eq!(count(&db, "SELECT COUNT(*) FROM ord WHERE cust_id = 1").await, 2);
}

#[tokio::test]
async fn update_policy_restrict() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_update_policy(RiPolicy::Restrict);

    let err = assert_err!(cust.set_field_val("id", 10));
    assert!(err.is_business_rule());
    assert_eq!(cust.get_field_val("id").unwrap(), &Value::Int(1));

    // Other fields are not affected
    assert_ok!(cust.set_field_val("name", "Alicia"));
}

#[tokio::test]
async fn update_policy_cascade() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_update_policy(RiPolicy::Cascade);

    cust.set_field_val("id", 10).unwrap();
    {
        let ord = orders(&mut cust);
        for idx in 0..ord.row_count() {
            assert_eq!(
                ord.cursor().get_field_val_at(idx, "cust_id").unwrap(),
                &Value::Int(10)
            );
        }
    }

    db.log.clear();
    cust.save().await.unwrap();
    assert_eq!(
        db.log.statements(),
        [
            "UPDATE cust SET id = ? WHERE id = 1",
            "UPDATE ord SET cust_id = ? WHERE id = 1",
            "UPDATE ord SET cust_id = ? WHERE id = 2",
        ]
    );
    assert_eq!(count(&db, "SELECT COUNT(*) FROM ord WHERE cust_id = 10").await, 2);
}

#[tokio::test]
async fn insert_policy_restrict_needs_a_parent() {
    let db = TestDb::cust_ord().await;
    let mut ord = Bizobj::new(&db.conn, "ord", "id").with_link_field("cust_id");
    ord.set_insert_policy(RiPolicy::Restrict);

    let err = assert_err!(ord.new_record().await);
    assert!(err.is_business_rule());
}

#[tokio::test]
async fn insert_policy_cascade_adds_child() {
    let db = TestDb::cust_ord().await;
    let mut cust = Bizobj::new(&db.conn, "cust", "id");
    let mut ord = Bizobj::new(&db.conn, "ord", "id").with_link_field("cust_id");
    ord.set_insert_policy(RiPolicy::Cascade);
    cust.add_child(ord).unwrap();
    cust.requery().await.unwrap();

    cust.new_record().await.unwrap();
    let parent_pk = cust.current_pk().unwrap();

    let ord = orders(&mut cust);
    assert_eq!(ord.row_count(), 1);
    assert!(ord.is_adding());
    assert_eq!(ord.get_field_val("cust_id").unwrap(), &parent_pk);
}

#[tokio::test]
async fn defaults_apply_to_new_records() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_default_value("name", "anonymous");

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    orders(&mut cust).set_default_fn("qty", move || {
        Value::from(counter.fetch_add(1, Ordering::SeqCst) as i64 + 1)
    });

    cust.new_record().await.unwrap();
    assert_eq!(cust.get_field_val("name").unwrap(), &Value::from("anonymous"));

    let ord = orders(&mut cust);
    ord.new_record().await.unwrap();
    ord.new_record().await.unwrap();
    assert_eq!(ord.get_field_val("qty").unwrap(), &Value::Int(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn before_hook_vetoes_save() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.on(Operation::Save, Phase::Before, |_| Err("read only".to_string()));

    cust.set_field_val("name", "Zed").unwrap();
    db.log.clear();

    let err = assert_err!(cust.save().await);
    assert!(err.is_aborted());
    assert_eq!(err.aborted_message(), Some("read only"));
    assert!(db.log.is_empty());
    assert!(cust.is_changed());
}

#[tokio::test]
async fn hooks_observe_navigation() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;

    let moves = Arc::new(AtomicUsize::new(0));
    let counter = moves.clone();
    cust.on(Operation::PointerMove, Phase::After, move |event| {
        assert_eq!(event.data_source, "cust");
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    cust.on(Operation::Next, Phase::After, |_| Err("advisory".to_string()));

    cust.next().await.unwrap();
    cust.move_to_row_number(0).await.unwrap();
    assert_eq!(moves.load(Ordering::SeqCst), 2);

    cust.on(Operation::Last, Phase::Before, |_| Err("stay".to_string()));
    assert_err_is!(cust.last().await, is_aborted);
    assert_eq!(cust.row_number(), Some(0));
}

#[tokio::test]
async fn validation_blocks_save() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_rules(|row: &Row| match row.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => Ok(()),
        _ => Err("name is required".to_string()),
    });

    cust.new_record().await.unwrap();
    cust.set_field_val("name", "  ").unwrap();
    db.log.clear();

    let err = assert_err!(cust.save().await);
    assert!(err.is_business_rule());
    assert!(!db.log.has_insert());

    cust.set_field_val("name", "Dave").unwrap();
    assert_ok!(cust.save().await);
    assert!(db.log.has_insert());
}

#[tokio::test]
async fn failed_save_rolls_back() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;

    db.conn.exec("DELETE FROM cust WHERE id = 1", &[]).await.unwrap();
    cust.set_field_val("name", "Zed").unwrap();
    db.log.clear();

    let err = assert_err!(cust.save().await);
    assert!(err.is_db_query());
    assert_eq!(db.log.ops().last(), Some(&ExecOp::Rollback));
}

#[tokio::test]
async fn cancel_all_reverts_the_tree() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;

    cust.set_field_val("name", "Zed").unwrap();
    orders(&mut cust).set_field_val("qty", 99).unwrap();
    orders(&mut cust).new_record().await.unwrap();
    assert!(cust.is_any_changed());

    cust.cancel_all().await.unwrap();
    assert!(!cust.is_any_changed());
    assert_eq!(cust.get_field_val("name").unwrap(), &Value::from("Alice"));
    assert_eq!(orders(&mut cust).row_count(), 2);
}

#[tokio::test]
async fn save_all_writes_every_row() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;

    cust.set_field_val("name", "Alicia").unwrap();
    cust.last().await.unwrap();
    cust.set_field_val("name", "Caroline").unwrap();
    db.log.clear();

    cust.save_all().await.unwrap();
    assert_eq!(db.log.count_sql("UPDATE cust"), 2);
    assert!(!cust.is_any_changed());
}

#[tokio::test]
async fn requery_restores_position() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_restore_position_on_requery(true);
    cust.last().await.unwrap();

    cust.requery().await.unwrap();
    assert_eq!(cust.row_number(), Some(2));
    assert_eq!(cust.current_pk(), Some(Value::Int(3)));
}

#[tokio::test]
async fn child_without_link_field_is_rejected() {
    let db = TestDb::cust_ord().await;
    let mut cust = Bizobj::new(&db.conn, "cust", "id");
    let err = assert_err!(cust.add_child(Bizobj::new(&db.conn, "ord", "id")));
    assert!(err.is_invalid_configuration());
}

#[tokio::test]
async fn failed_child_save_restores_the_tree() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    orders(&mut cust).set_rules(|row: &Row| match row.get("qty") {
        Some(Value::Int(qty)) if *qty > 0 => Ok(()),
        _ => Err("qty must be positive".to_string()),
    });

    cust.new_record().await.unwrap();
    cust.set_field_val("name", "Dave").unwrap();
    let temp_pk = cust.current_pk().unwrap();
    orders(&mut cust).new_record().await.unwrap();
    orders(&mut cust).set_field_val("qty", 0).unwrap();

    assert_err_is!(cust.save().await, is_business_rule);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM cust WHERE name = 'Dave'").await, 0);

    // The parent is still an unsaved record with its temp key
    assert!(cust.is_adding());
    assert!(cust.is_changed());
    assert_eq!(cust.current_pk(), Some(temp_pk.clone()));
    assert_eq!(orders(&mut cust).get_field_val("cust_id").unwrap(), &temp_pk);

    orders(&mut cust).set_field_val("qty", 2).unwrap();
    assert_ok!(cust.save().await);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM cust WHERE name = 'Dave'").await, 1);
    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM ord JOIN cust ON cust.id = ord.cust_id \
             WHERE cust.name = 'Dave' AND ord.qty = 2"
        )
        .await,
        1
    );
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM ord WHERE cust_id NOT IN (SELECT id FROM cust)").await,
        0
    );
}

#[tokio::test]
async fn lost_connection_rolls_back() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;

    cust.new_record().await.unwrap();
    cust.set_field_val("name", "Dave").unwrap();
    orders(&mut cust).new_record().await.unwrap();
    orders(&mut cust).set_field_val("qty", 3).unwrap();

    db.lose_connection_on("INSERT INTO ord");
    db.log.clear();

    assert_err_is!(cust.save().await, is_connection_lost);
    assert_eq!(db.log.ops().last(), Some(&ExecOp::Rollback));
    assert!(cust.is_adding());

    db.reconnect();
    assert_eq!(count(&db, "SELECT COUNT(*) FROM cust").await, 3);

    assert_ok!(cust.save().await);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM cust").await, 4);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM ord").await, 4);
}

#[tokio::test]
async fn untouched_new_child_is_not_inserted() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_new_child_on_new(true);

    cust.new_record().await.unwrap();
    assert_eq!(orders(&mut cust).row_count(), 1);
    assert!(orders(&mut cust).is_adding());
    assert!(!orders(&mut cust).is_changed());

    cust.set_field_val("name", "Dave").unwrap();
    db.log.clear();

    cust.save().await.unwrap();
    assert_eq!(db.log.statements(), ["INSERT INTO cust (name) VALUES (?)"]);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM ord").await, 3);
}

#[tokio::test]
async fn defaults_alone_do_not_change_a_new_record() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.set_default_value("name", "anonymous");

    cust.new_record().await.unwrap();
    assert!(!cust.is_changed());

    cust.set_field_val("name", "Dave").unwrap();
    assert!(cust.is_changed());
}

#[tokio::test]
async fn parent_link_field_on_the_parent_key() {
    let db = TestDb::new().await;
    db.conn
        .exec("CREATE TABLE cust (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)", &[])
        .await
        .unwrap();
    db.conn
        .exec(
            "CREATE TABLE line (line_id INTEGER PRIMARY KEY AUTOINCREMENT, cust_ref INTEGER, item TEXT)",
            &[],
        )
        .await
        .unwrap();

    let mut cust = Bizobj::new(&db.conn, "cust", "id");
    let mut line = Bizobj::new(&db.conn, "line", "line_id").with_link_field("cust_ref");
    line.set_parent_link_field("id");
    cust.add_child(line).unwrap();
    cust.requery().await.unwrap();

    cust.new_record().await.unwrap();
    cust.set_field_val("name", "Dave").unwrap();
    let line = assert_some!(cust.child_mut("line"));
    line.new_record().await.unwrap();
    line.set_field_val("item", "nut").unwrap();
    db.log.clear();

    cust.save().await.unwrap();
    assert_eq!(
        db.log.statements(),
        [
            "INSERT INTO cust (name) VALUES (?)",
            "INSERT INTO line (cust_ref, item) VALUES (?, ?)",
        ]
    );
    assert_eq!(count(&db, "SELECT COUNT(*) FROM line WHERE cust_ref = 1").await, 1);
}

#[tokio::test]
async fn parent_link_field_on_another_column() {
    let mut db = TestDb::new().await;
    db.exec_all(&[
        "CREATE TABLE cust (id INTEGER PRIMARY KEY AUTOINCREMENT, code TEXT)",
        "CREATE TABLE note (id INTEGER PRIMARY KEY AUTOINCREMENT, cust_code TEXT, body TEXT)",
        "INSERT INTO cust (code) VALUES ('A1'), ('B2')",
        "INSERT INTO note (cust_code, body) VALUES ('B2', 'call back'), ('B2', 'paid')",
    ])
    .await;

    let mut cust = Bizobj::new(&db.conn, "cust", "id");
    let mut note = Bizobj::new(&db.conn, "note", "id").with_link_field("cust_code");
    note.set_parent_link_field("code");
    cust.add_child(note).unwrap();
    cust.requery().await.unwrap();

    assert_eq!(assert_some!(cust.child("note")).row_count(), 0);

    cust.next().await.unwrap();
    let note = assert_some!(cust.child_mut("note"));
    assert_eq!(note.row_count(), 2);

    note.new_record().await.unwrap();
    assert_eq!(note.get_field_val("cust_code").unwrap(), &Value::from("B2"));
}

#[tokio::test]
async fn cancelled_parent_drops_its_child_cursor() {
    let db = TestDb::cust_ord().await;
    let mut cust = cust_with_orders(&db).await;
    cust.last().await.unwrap();
    let cursors = orders(&mut cust).cursor_count();

    cust.new_record().await.unwrap();
    orders(&mut cust).new_record().await.unwrap();
    orders(&mut cust).set_field_val("qty", 1).unwrap();
    assert_eq!(orders(&mut cust).cursor_count(), cursors + 1);

    cust.cancel().await.unwrap();
    assert!(!cust.is_adding());
    assert_eq!(orders(&mut cust).cursor_count(), cursors);
    assert!(!cust.is_any_changed());
}
