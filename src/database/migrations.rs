//! Schema migrations for the SecretMarks SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.
//!
//! The unique index on `url_fingerprint` is not a numbered migration. [`run_all`]
//! installs it as soon as every row carries its own fingerprint (always true for a new
//! vault); vaults with legacy rows get it from the fingerprint backfill.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Name of the unique index guarding `bookmarks.url_fingerprint`.
pub const FINGERPRINT_INDEX: &str = "idx_bookmarks_url_fingerprint";

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Migrations are versioned: each runs exactly once and is recorded in
/// the `schema_version` table. Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: bookmarks and vault_meta")?;
        tracing::info!("applied schema migration v1");
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Add group and url_fingerprint to legacy bookmarks tables")?;
        tracing::info!("applied schema migration v2");
    }

    if !has_fingerprint_index(conn)? && fingerprints_complete(conn)? {
        install_fingerprint_index(conn)?;
        tracing::info!("installed unique fingerprint index");
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: Create the core tables.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    // AUTOINCREMENT keeps ids of deleted bookmarks from being handed out again.
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            domain TEXT NOT NULL,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            tags TEXT,
            "group" TEXT,
            url_fingerprint TEXT
        );

        CREATE TABLE IF NOT EXISTS vault_meta (
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL
        );
        "#,
    )
}

/// V2: Add columns for older databases that were created before V1 included them.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    if !has_column(conn, "bookmarks", "group")? {
        conn.execute_batch(r#"ALTER TABLE bookmarks ADD COLUMN "group" TEXT;"#)?;
    }
    if !has_column(conn, "bookmarks", "url_fingerprint")? {
        conn.execute_batch("ALTER TABLE bookmarks ADD COLUMN url_fingerprint TEXT;")?;
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns true once the unique fingerprint index exists.
pub fn has_fingerprint_index(conn: &Connection) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'index' AND name = ?1",
        [FINGERPRINT_INDEX],
        |row| row.get(0),
    )
}

/// True when no row lacks a fingerprint and no two rows share one.
pub fn fingerprints_complete(conn: &Connection) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT NOT EXISTS (
             SELECT 1 FROM bookmarks WHERE url_fingerprint IS NULL OR url_fingerprint = ''
         ) AND NOT EXISTS (
             SELECT 1 FROM bookmarks GROUP BY url_fingerprint HAVING COUNT(*) > 1
         )",
        [],
        |row| row.get(0),
    )
}

/// Installs the unique index on `url_fingerprint`. NULL fingerprints never collide.
pub fn install_fingerprint_index(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON bookmarks(url_fingerprint);",
        FINGERPRINT_INDEX
    ))
}
