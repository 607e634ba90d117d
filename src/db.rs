use crate::config::DatabaseConfig;
use crate::error::{EtlError, Result as EtlResult};
use crate::loader::LoadReport;
use crate::parsers::SourceKind;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// TABLES
// ============================================================================

/// Every data table the loaders write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    SanctionedEntities,
    Aliases,
    Nationalities,
    SanctionTypes,
    Canada,
    Interpol,
    InterpolNationality,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::SanctionedEntities,
        Table::Aliases,
        Table::Nationalities,
        Table::SanctionTypes,
        Table::Canada,
        Table::Interpol,
        Table::InterpolNationality,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::SanctionedEntities => "sanctioned_entities",
            Table::Aliases => "aliases",
            Table::Nationalities => "nationalities",
            Table::SanctionTypes => "sanction_types",
            Table::Canada => "cannada_tbl",
            Table::Interpol => "interpol_tbl",
            Table::InterpolNationality => "interpol_nationality",
        }
    }
}

// ============================================================================
// CONNECTION
// ============================================================================

/// Open the configured database file and make sure the schema exists.
///
/// Any failure here is a connectivity error: nothing has been written yet.
pub fn open_connection(config: &DatabaseConfig) -> EtlResult<Connection> {
    let path = config.path();
    debug!("Opening database {}", path.display());

    let conn = Connection::open(&path).map_err(EtlError::Connection)?;
    setup_database(&conn).map_err(EtlError::Connection)?;
    Ok(conn)
}

/// Connectivity gate run before any load.
pub fn check_connection(config: &DatabaseConfig) -> EtlResult<()> {
    let conn = open_connection(config)?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(EtlError::Connection)?;

    info!("✅ Database reachable at {}", config.path().display());
    Ok(())
}

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Common entities + child attributes
    // No UNIQUE constraints: duplicates are prevented by check-then-insert
    // inside one transaction per batch (single writer per run).
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sanctioned_entities (
            entity_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            designation TEXT,
            source TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS aliases (
            alias_id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES sanctioned_entities(entity_id),
            alias_name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS nationalities (
            nat_id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES sanctioned_entities(entity_id),
            nationality TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sanction_types (
            type_id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_id INTEGER NOT NULL REFERENCES sanctioned_entities(entity_id),
            sanction_type TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Canada + Interpol (own identity keys)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS cannada_tbl (
            entity_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            nationalities TEXT NOT NULL,
            date_of_listing TEXT,
            source TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS interpol_tbl (
            entity_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS interpol_nationality (
            entity_id INTEGER NOT NULL REFERENCES interpol_tbl(entity_id),
            nationality TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Load events (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS load_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            source_key TEXT NOT NULL,
            source_label TEXT NOT NULL,
            input_sha256 TEXT,
            records_seen INTEGER NOT NULL,
            entities_created INTEGER NOT NULL,
            children_added INTEGER NOT NULL,
            records_skipped INTEGER NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entities_name_source ON sanctioned_entities(name, source)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_aliases_entity ON aliases(entity_id, alias_name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_nationalities_entity ON nationalities(entity_id, nationality)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sanction_types_entity ON sanction_types(entity_id, sanction_type)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_cannada_key ON cannada_tbl(name, nationalities, date_of_listing)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_interpol_key ON interpol_tbl(name, age)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_interpol_nationality ON interpol_nationality(entity_id, nationality)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_load_events_source ON load_events(source_key, timestamp)",
        [],
    )?;

    Ok(())
}

pub fn table_count(conn: &Connection, table: Table) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// LOAD EVENTS
// ============================================================================

/// One successful batch load, written in the same transaction as its rows.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoadEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub source_key: String,
    pub source_label: String,
    pub input_sha256: Option<String>,
    pub records_seen: i64,
    pub entities_created: i64,
    pub children_added: i64,
    pub records_skipped: i64,
}

impl LoadEvent {
    pub fn new(kind: SourceKind, label: &str, report: &LoadReport) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            source_key: kind.key().to_string(),
            source_label: label.to_string(),
            input_sha256: None,
            records_seen: report.records_seen as i64,
            entities_created: report.entities_created as i64,
            children_added: report.children_added as i64,
            records_skipped: report.records_skipped as i64,
        }
    }

    pub fn with_input_digest(mut self, sha256: Option<String>) -> Self {
        self.input_sha256 = sha256;
        self
    }
}

pub fn insert_load_event(conn: &Connection, event: &LoadEvent) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO load_events (
            event_id, timestamp, source_key, source_label, input_sha256,
            records_seen, entities_created, children_added, records_skipped
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.source_key,
            event.source_label,
            event.input_sha256,
            event.records_seen,
            event.entities_created,
            event.children_added,
            event.records_skipped,
        ],
    )?;

    Ok(())
}

/// Load history for one source key, newest first.
pub fn get_load_events(conn: &Connection, source_key: &str) -> Result<Vec<LoadEvent>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, source_key, source_label, input_sha256,
                records_seen, entities_created, children_added, records_skipped
         FROM load_events
         WHERE source_key = ?1
         ORDER BY timestamp DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![source_key], |row| {
            let timestamp_str: String = row.get(1)?;

            Ok(LoadEvent {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
                    .with_timezone(&Utc),
                source_key: row.get(2)?,
                source_label: row.get(3)?,
                input_sha256: row.get(4)?,
                records_seen: row.get(5)?,
                entities_created: row.get(6)?,
                children_added: row.get(7)?,
                records_skipped: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}
