//! Integration tests for the sqlstring-sqlite crate.

use std::collections::{BTreeMap, HashMap};

use chrono::{TimeZone, Utc};
use serde::Serialize;
use sqlstring_core::{ByteBuf, Cursor, Escaping, NullString, params};
use sqlstring_sqlite::{Config, Database, SqliteError};

#[derive(Serialize)]
struct UserPatch<'a> {
    name: &'a str,
    data: Option<&'a str>,
}

#[derive(Serialize)]
#[allow(non_snake_case)]
struct Key {
    ID: i64,
}

/// Opens an in-memory database with a populated `users` table.
fn setup_users() -> Database {
    let mut config = Config::default();
    config.multi_statements = true;
    let db = Database::open(&config).unwrap();
    db.exec(
        "CREATE TABLE users (
            ID INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            data TEXT,
            created_at TEXT
        );",
        &[],
    )
    .unwrap();
    db.insert(
        "users",
        &["ID", "name", "data"],
        &[
            params![1, "Vinh", None::<&str>],
            params![2, "Lan", "x"],
            params![3, "Vinh 3", "y"],
        ],
    )
    .unwrap();
    db
}

fn name_of(db: &Database, id: i64) -> Option<String> {
    db.single("SELECT name FROM users WHERE ID = ?", params![id])
        .unwrap()
        .and_then(|name| name.as_deref().map(str::to_string))
}

// =============================================================================
// Opening and configuration
// =============================================================================

#[test]
fn test_open_file_from_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("app.db");
    let config_path = dir.path().join("sqlstring.yml");
    Config::with_path(&db_path).save(&config_path).unwrap();

    let db = Database::open_config_file(&config_path).unwrap();
    db.exec("CREATE TABLE t (x INTEGER)", &[]).unwrap();
    db.insert("t", &["x"], &[[7]]).unwrap();
    drop(db);

    assert!(db_path.exists());
    let reopened = Database::open(&Config::with_path(&db_path)).unwrap();
    let x = reopened.single("SELECT x FROM t", &[]).unwrap();
    assert_eq!(x, Some(NullString::new("7")));
}

#[test]
fn test_read_only_database_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ro.db");
    Database::open(&Config::with_path(&db_path))
        .unwrap()
        .exec("CREATE TABLE t (x INTEGER)", &[])
        .unwrap();

    let config = Config {
        read_only: true,
        create_if_missing: false,
        ..Config::with_path(&db_path)
    };
    let db = Database::open(&config).unwrap();
    assert!(db.single("SELECT count(*) FROM t", &[]).unwrap().is_some());
    assert!(matches!(
        db.exec("INSERT INTO t VALUES (1)", &[]),
        Err(SqliteError::DatabaseError(_))
    ));
}

#[test]
fn test_missing_file_without_create() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        create_if_missing: false,
        ..Config::with_path(dir.path().join("absent.db"))
    };
    assert!(matches!(
        Database::open(&config),
        Err(SqliteError::DatabaseError(_))
    ));
}

#[test]
fn test_from_connection_applies_settings() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let config = Config {
        foreign_keys: false,
        escaping: Escaping::Backslash,
        ..Config::default()
    };
    let db = Database::from_connection(conn, config).unwrap();
    let fk = db.single("PRAGMA foreign_keys", &[]).unwrap();
    assert_eq!(fk, Some(NullString::new("0")));
    assert_eq!(db.encoder().quote("it's"), "'it\\'s'");
}

// =============================================================================
// Reads
// =============================================================================

#[test]
fn test_single() {
    let db = setup_users();
    assert_eq!(name_of(&db, 2).as_deref(), Some("Lan"));
    assert_eq!(name_of(&db, 99), None);

    let data = db.single("SELECT data FROM users WHERE ID = 1", &[]).unwrap();
    assert_eq!(data, Some(NullString::null()));
}

#[test]
fn test_single_with_two_columns_fails() {
    let db = setup_users();
    let err = db.single("SELECT ID, name FROM users", &[]).unwrap_err();
    assert!(matches!(err, SqliteError::CodecError(_)));
}

#[test]
fn test_row() {
    let db = setup_users();
    let row = db
        .row("SELECT ID, name, data FROM users WHERE ID = ?", params![1])
        .unwrap()
        .unwrap();
    assert_eq!(row.len(), 3);
    assert_eq!(row["ID"].as_deref(), Some("1"));
    assert_eq!(row["name"].as_deref(), Some("Vinh"));
    assert!(row["data"].is_null());

    assert!(db.row("SELECT * FROM users WHERE ID = 42", &[]).unwrap().is_none());
}

#[test]
fn test_row_with_null_select() {
    let db = setup_users();
    let row = db.row("SELECT NULL AS nil_col", &[]).unwrap().unwrap();
    assert!(row["nil_col"].is_null());
}

#[test]
fn test_rows() {
    let db = setup_users();
    let rows = db
        .rows("SELECT name FROM users WHERE name LIKE ? ORDER BY ID", params!["Vinh%"])
        .unwrap();
    let names: Vec<_> = rows.iter().map(|r| r["name"].to_string()).collect();
    assert_eq!(names, vec!["Vinh", "Vinh 3"]);

    assert!(db.rows("SELECT name FROM users WHERE 0", &[]).unwrap().is_empty());
}

#[test]
fn test_set_rows_sparse_and_dense() {
    let db = setup_users();
    let sql = "SELECT NULL AS v WHERE 0; SELECT 1 AS v; SELECT 2 AS v;";

    let sparse = db.set_rows(sql).unwrap();
    assert_eq!(sparse.len(), 2);
    assert_eq!(sparse[0][0]["v"].as_deref(), Some("1"));
    assert_eq!(sparse[1][0]["v"].as_deref(), Some("2"));

    let dense = db.set_rows_nil(sql).unwrap();
    assert_eq!(dense.len(), 3);
    assert!(dense[0].is_empty());
    assert_eq!(dense[1][0]["v"].as_deref(), Some("1"));
    assert_eq!(dense[2][0]["v"].as_deref(), Some("2"));
}

#[test]
fn test_set_rows_keeps_null_rows() {
    let db = setup_users();
    let groups = db.set_rows("SELECT NULL; SELECT 1; SELECT 2").unwrap();
    assert_eq!(groups.len(), 3);
    assert!(groups[0][0]["NULL"].is_null());
}

#[test]
fn test_set_rows_nil_counts_write_statements() {
    let db = setup_users();
    let groups = db
        .set_rows_nil("UPDATE users SET data = 'z' WHERE ID = 1; SELECT data FROM users WHERE ID = 1")
        .unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups[0].is_empty());
    assert_eq!(groups[1][0]["data"].as_deref(), Some("z"));
}

#[test]
fn test_query_cursor_directly() {
    let db = setup_users();
    let mut cursor = db.query("SELECT ID FROM users ORDER BY ID", &[]).unwrap();
    assert_eq!(cursor.result_set_count(), 1);
    let mut ids = Vec::new();
    while cursor.advance().unwrap() {
        ids.push(cursor.column(0).unwrap().map(<[u8]>::to_vec));
    }
    assert_eq!(ids, vec![Some(b"1".to_vec()), Some(b"2".to_vec()), Some(b"3".to_vec())]);
}

#[test]
fn test_parameters_bind_with_multi_statements_enabled() {
    let db = setup_users();
    let rows = db.rows("SELECT ? AS v, ? AS w", params![1, "two"]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["v"].as_deref(), Some("1"));
    assert_eq!(rows[0]["w"].as_deref(), Some("two"));
}

// =============================================================================
// Writes
// =============================================================================

#[test]
fn test_insert_literals() {
    let db = setup_users();
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    let id = db
        .insert(
            "users",
            &["name", "data", "created_at"],
            &[("It's \"quoted\" \\ here", "line\nbreak", created)],
        )
        .unwrap();
    assert_eq!(id, 4);

    let row = db
        .row("SELECT name, data, created_at FROM users WHERE ID = ?", params![id])
        .unwrap()
        .unwrap();
    assert_eq!(row["name"].as_deref(), Some("It's \"quoted\" \\ here"));
    assert_eq!(row["data"].as_deref(), Some("line\nbreak"));
    assert_eq!(row["created_at"].as_deref(), Some("2024-05-01T12:30:00Z"));
}

#[test]
fn test_insert_bytes_as_blob_literal() {
    let db = setup_users();
    db.exec("CREATE TABLE blobs (b BLOB)", &[]).unwrap();
    let raw: Vec<u8> = vec![0x00, 0xff, 0x27];
    db.insert("blobs", &["b"], &[[sqlstring_core::Value::Bytes(raw.clone())]])
        .unwrap();

    let mut cursor = db.query("SELECT b FROM blobs", &[]).unwrap();
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.column(0).unwrap(), Some(raw.as_slice()));
}

#[test]
fn test_byte_buffers_insert_and_bind_as_blobs() {
    let db = setup_users();
    db.exec("CREATE TABLE blobs (id INTEGER PRIMARY KEY, b BLOB)", &[]).unwrap();
    let raw = ByteBuf::from(vec![0xde, 0xad, 0xbe, 0xef]);
    db.insert("blobs", &["id", "b"], &[(1, &raw)]).unwrap();

    let mut cursor = db.query("SELECT b FROM blobs WHERE id = 1", &[]).unwrap();
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.column(0).unwrap(), Some(&[0xde, 0xad, 0xbe, 0xef][..]));

    let mut data = BTreeMap::new();
    data.insert("b", ByteBuf::from(vec![0x00, 0x01]));
    db.update("blobs", &data, &BTreeMap::from([("id", 1)]), None).unwrap();

    let typeof_b = db.single("SELECT typeof(b) FROM blobs", &[]).unwrap().unwrap();
    assert_eq!(typeof_b.as_deref(), Some("blob"));
}

#[test]
fn test_insert_text_with_nul_round_trips() {
    let db = setup_users();
    let id = db
        .insert("users", &["name", "data"], &[["before\0after", "it's\0"]])
        .unwrap();
    let row = db
        .row("SELECT name, data FROM users WHERE ID = ?", params![id])
        .unwrap()
        .unwrap();
    assert_eq!(row["name"].as_deref(), Some("before\0after"));
    assert_eq!(row["data"].as_deref(), Some("it's\0"));
}

#[test]
fn test_insert_update() {
    let db = setup_users();
    let affected = db
        .insert_update(
            "users",
            &["ID", "name", "data"],
            &[params![2, "Lan Updated", "11111111"], params![10, "New", None::<&str>]],
        )
        .unwrap();
    assert_eq!(affected, 2);
    assert_eq!(name_of(&db, 2).as_deref(), Some("Lan Updated"));
    assert_eq!(name_of(&db, 10).as_deref(), Some("New"));
}

#[test]
fn test_update_with_struct_and_key() {
    let db = setup_users();
    let patch = UserPatch {
        name: "Vinh 3 Updated",
        data: None,
    };
    let affected = db.update("users", &patch, &Key { ID: 3 }, None).unwrap();
    assert_eq!(affected, 1);

    let row = db.row("SELECT name, data FROM users WHERE ID = 3", &[]).unwrap().unwrap();
    assert_eq!(row["name"].as_deref(), Some("Vinh 3 Updated"));
    assert!(row["data"].is_null());
}

#[test]
fn test_update_with_map_and_limit() {
    let db = setup_users();
    let mut data = HashMap::new();
    data.insert("data", "same");
    let no_filter: BTreeMap<&str, i64> = BTreeMap::new();

    let affected = db.update("users", &data, &no_filter, Some(2)).unwrap();
    assert_eq!(affected, 2);
    let count = db
        .single("SELECT count(*) FROM users WHERE data = 'same'", &[])
        .unwrap();
    assert_eq!(count, Some(NullString::new("2")));
}

#[test]
fn test_update_empty_data() {
    let db = setup_users();
    let empty: BTreeMap<&str, i64> = BTreeMap::new();
    let err = db.update("users", &empty, &Key { ID: 1 }, None).unwrap_err();
    assert!(matches!(err, SqliteError::EmptyData("update")));
}

#[test]
fn test_update_rejects_composite_value() {
    let db = setup_users();
    let mut data = BTreeMap::new();
    data.insert("data", vec!["a", "b"]);
    let err = db.update("users", &data, &Key { ID: 1 }, None).unwrap_err();
    assert!(matches!(err, SqliteError::UnsupportedParameter(_)));
}

#[test]
fn test_delete() {
    let db = setup_users();
    let mut filter = BTreeMap::new();
    filter.insert("name", "Vinh");
    assert_eq!(db.delete("users", &filter, None).unwrap(), 1);
    assert_eq!(name_of(&db, 1), None);

    assert_eq!(db.delete("users", &Key { ID: 1 }, None).unwrap(), 0);
}

#[test]
fn test_delete_with_limit() {
    let db = setup_users();
    db.exec("UPDATE users SET data = 'old'", &[]).unwrap();
    let mut filter = BTreeMap::new();
    filter.insert("data", "old");
    assert_eq!(db.delete("users", &filter, Some(1)).unwrap(), 1);
    let rows = db.rows("SELECT ID FROM users", &[]).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_delete_empty_filter() {
    let db = setup_users();
    let err = db.delete("users", &(), None).unwrap_err();
    assert!(matches!(err, SqliteError::EmptyData("delete")));
}

#[test]
fn test_exec_batch_reports_last_statement() {
    let db = setup_users();
    let result = db
        .exec(
            "INSERT INTO users (name) VALUES ('a'); INSERT INTO users (name) VALUES ('b'), ('c');",
            &[],
        )
        .unwrap();
    assert_eq!(result.rows_affected, 2);
    assert_eq!(result.last_insert_id, 6);
}
