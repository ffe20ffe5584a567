// ==========================================
// Plantation Tariff Core - SQLite Initialization
// ==========================================
// Goals:
// - one place for Connection::open PRAGMA behavior, so foreign keys
//   are never enabled in some modules and disabled in others
// - unified busy_timeout to reduce sporadic busy errors under
//   concurrent writes
// - core schema creation for the tariff/override/assignment/audit
//   tables
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Unified PRAGMAs for every SQLite connection
///
/// foreign_keys and busy_timeout are per-connection settings and
/// must be applied on each open.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with unified configuration
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Open a connection and ensure the core tariff schema exists
pub fn open_tariff_database(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// In-memory database with the core schema (tests and tooling)
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the core tables and indexes if they do not exist
///
/// Column names follow the established tariff vocabulary
/// (bjr_min_kg, tarif_upah, perlakuan, ...). Rate columns are
/// nullable: NULL means "not set" (for overrides: inherit base).
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS land_types (
          land_type_id TEXT PRIMARY KEY,
          company_id TEXT NOT NULL,
          code TEXT NOT NULL,
          name TEXT NOT NULL,
          is_active INTEGER NOT NULL DEFAULT 1,
          created_at TEXT NOT NULL DEFAULT (datetime('now')),
          updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS uq_land_types_company_code
          ON land_types(company_id, LOWER(TRIM(code)));

        CREATE TABLE IF NOT EXISTS tariff_rules (
          rule_id TEXT PRIMARY KEY,
          company_id TEXT NOT NULL,
          land_type_id TEXT NOT NULL,
          scheme_code TEXT NOT NULL,
          tarif_code TEXT NOT NULL,
          bjr_min_kg REAL,
          bjr_max_kg REAL,
          basis REAL,
          tarif_upah REAL,
          premi REAL,
          tarif_premi1 REAL,
          tarif_premi2 REAL,
          tarif_libur REAL,
          tarif_lebaran REAL,
          sort_order INTEGER NOT NULL DEFAULT 0,
          keterangan TEXT,
          is_active INTEGER NOT NULL DEFAULT 1,
          created_at TEXT NOT NULL DEFAULT (datetime('now')),
          updated_at TEXT NOT NULL DEFAULT (datetime('now')),
          FOREIGN KEY (land_type_id) REFERENCES land_types(land_type_id),
          CHECK (bjr_min_kg IS NULL OR bjr_max_kg IS NULL OR bjr_min_kg < bjr_max_kg)
        );

        CREATE INDEX IF NOT EXISTS idx_tariff_rules_company
          ON tariff_rules(company_id);
        CREATE INDEX IF NOT EXISTS idx_tariff_rules_land_type
          ON tariff_rules(land_type_id, is_active);
        CREATE UNIQUE INDEX IF NOT EXISTS uq_tariff_rules_land_type_code
          ON tariff_rules(land_type_id, LOWER(TRIM(tarif_code)));

        CREATE TABLE IF NOT EXISTS tariff_overrides (
          override_id TEXT PRIMARY KEY,
          rule_id TEXT NOT NULL,
          override_type TEXT NOT NULL,
          effective_from TEXT,
          effective_to TEXT,
          basis REAL,
          tarif_upah REAL,
          premi REAL,
          tarif_premi1 REAL,
          tarif_premi2 REAL,
          tarif_libur REAL,
          tarif_lebaran REAL,
          notes TEXT,
          is_active INTEGER NOT NULL DEFAULT 1,
          created_at TEXT NOT NULL DEFAULT (datetime('now')),
          updated_at TEXT NOT NULL DEFAULT (datetime('now')),
          FOREIGN KEY (rule_id) REFERENCES tariff_rules(rule_id),
          CHECK (override_type IN ('NORMAL', 'HOLIDAY', 'FESTIVAL')),
          CHECK (effective_from IS NULL OR effective_to IS NULL OR effective_from <= effective_to)
        );

        CREATE INDEX IF NOT EXISTS idx_tariff_overrides_rule
          ON tariff_overrides(rule_id, override_type, effective_from, effective_to);

        CREATE TABLE IF NOT EXISTS blocks (
          block_id TEXT PRIMARY KEY,
          company_id TEXT NOT NULL,
          division_id TEXT NOT NULL,
          division_name TEXT NOT NULL,
          block_code TEXT NOT NULL,
          block_name TEXT NOT NULL,
          land_type_id TEXT,
          tariff_rule_id TEXT,
          updated_at TEXT NOT NULL DEFAULT (datetime('now')),
          FOREIGN KEY (land_type_id) REFERENCES land_types(land_type_id),
          FOREIGN KEY (tariff_rule_id) REFERENCES tariff_rules(rule_id)
        );

        CREATE INDEX IF NOT EXISTS idx_blocks_company
          ON blocks(company_id);
        CREATE INDEX IF NOT EXISTS idx_blocks_rule
          ON blocks(tariff_rule_id);

        CREATE TABLE IF NOT EXISTS tariff_audit_log (
          event_id TEXT PRIMARY KEY,
          event_type TEXT NOT NULL,
          changed_at TEXT NOT NULL,
          company_id TEXT NOT NULL,
          actor_id TEXT NOT NULL,
          actor_name TEXT NOT NULL,
          block_id TEXT,
          block_code TEXT,
          block_name TEXT,
          division_name TEXT,
          rule_id TEXT,
          rule_code TEXT,
          override_id TEXT,
          before_json TEXT NOT NULL,
          after_json TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tariff_audit_log_company_ts
          ON tariff_audit_log(company_id, changed_at DESC);
        CREATE INDEX IF NOT EXISTS idx_tariff_audit_log_event_type
          ON tariff_audit_log(event_type);
        "#,
    )?;
    Ok(())
}
