use super::*;
use tempfile::tempdir;

#[test]
fn in_memory_opens_successfully() {
    let result = Database::in_memory();
    assert!(result.is_ok());
}

#[test]
fn schema_table_exists() {
    let db = Database::in_memory().unwrap();

    let tables: Vec<String> = db
        .connection()
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .filter_map(|r| r.ok())
        .collect();

    assert!(tables.contains(&"local_storage".to_string()));
}

#[test]
fn missing_key_reads_as_none() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.get_item("NOTES").unwrap(), None);
}

#[test]
fn set_item_overwrites_previous_value() {
    let db = Database::in_memory().unwrap();

    db.set_item("TAGS", "[]").unwrap();
    db.set_item("TAGS", r#"[{"id":"t1","label":"work"}]"#).unwrap();

    assert_eq!(
        db.get_item("TAGS").unwrap().as_deref(),
        Some(r#"[{"id":"t1","label":"work"}]"#)
    );

    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM local_storage", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn set_items_writes_all_slots() {
    let db = Database::in_memory().unwrap();

    db.set_items(&[("NOTES", "[]".to_string()), ("TAGS", "[]".to_string())])
        .unwrap();

    assert_eq!(db.get_item("NOTES").unwrap().as_deref(), Some("[]"));
    assert_eq!(db.get_item("TAGS").unwrap().as_deref(), Some("[]"));
}

#[test]
fn failed_set_items_leaves_no_partial_write() {
    let db = Database::in_memory().unwrap();
    db.set_item("NOTES", "old").unwrap();

    // Make every write after the first one fail
    db.connection()
        .execute_batch(
            "CREATE TRIGGER reject_tags BEFORE INSERT ON local_storage
             WHEN NEW.key = 'TAGS'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

    let result = db.set_items(&[("NOTES", "new".to_string()), ("TAGS", "[]".to_string())]);

    assert!(result.is_err());
    assert_eq!(db.get_item("NOTES").unwrap().as_deref(), Some("old"));
    assert_eq!(db.get_item("TAGS").unwrap(), None);
}

#[test]
fn remove_item_deletes_slot() {
    let db = Database::in_memory().unwrap();
    db.set_item("OPTIONS", "{}").unwrap();

    db.remove_item("OPTIONS").unwrap();

    assert_eq!(db.get_item("OPTIONS").unwrap(), None);
}

#[test]
fn slot_info_reports_size_and_time() {
    let db = Database::in_memory().unwrap();
    let before = OffsetDateTime::now_utc().unix_timestamp();
    db.set_item("TAGS", "[]").unwrap();
    db.set_item("NOTES", "[1,2]").unwrap();

    let slots = db.slot_info().unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].key, "NOTES");
    assert_eq!(slots[0].bytes, 5);
    assert_eq!(slots[1].key, "TAGS");
    assert!(slots[1].updated_at.unix_timestamp() >= before);
}

#[test]
fn open_creates_database_file() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");

    let result = Database::open(&db_path);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn reopen_keeps_data() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");

    {
        let db = Database::open(&db_path).unwrap();
        db.set_item("NOTES", "[]").unwrap();
    }

    // Reopen - schema initialization should not fail
    let db2 = Database::open(&db_path).unwrap();
    assert_eq!(db2.get_item("NOTES").unwrap().as_deref(), Some("[]"));
}
