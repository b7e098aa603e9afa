/// Database schema for the local storage host.
///
/// One row per storage slot; `value` holds the JSON encoding of the slot and
/// `updated_at` the Unix timestamp of its last write.
/// Uses CREATE TABLE IF NOT EXISTS for idempotent execution.
pub const INITIAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;
