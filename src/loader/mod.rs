// 🔄 Entity Upsert Loader
//
// One check-then-insert loop for every source family. A resolver supplies the
// family's identity key, how to find/insert the entity row, and which child
// values to merge under it. The whole batch runs in one transaction: a SQL
// error anywhere rolls every row of the batch back.

pub mod canada;
pub mod common;
pub mod interpol;

pub use canada::CanadaResolver;
pub use common::CommonResolver;
pub use interpol::InterpolResolver;

use crate::config::DatabaseConfig;
use crate::db::{insert_load_event, open_connection, LoadEvent};
use crate::error::{EtlError, Result};
use crate::parsers::{SourceFamily, SourceKind};
use crate::record::ParsedBatch;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// REPORT + SKIP REASONS
// ============================================================================

/// Counters for one batch load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub records_seen: usize,
    pub entities_created: usize,
    pub entities_reused: usize,
    pub children_added: usize,
    pub records_skipped: usize,
}

/// Why a record never reached the duplicate check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("missing name")]
    MissingName,

    #[error("missing source")]
    MissingSource,

    #[error("missing nationalities")]
    MissingNationality,

    #[error("age is not an integer: {0:?}")]
    InvalidAge(String),
}

/// Integer guard for Interpol ages: "34" → 34; "unknown", "" and negatives
/// are rejected.
pub fn parse_age(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|age| *age >= 0)
}

// ============================================================================
// CHILD TABLES
// ============================================================================

/// Child attribute tables, each keyed by (entity_id, value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildTable {
    Aliases,
    Nationalities,
    SanctionTypes,
    InterpolNationality,
}

impl ChildTable {
    fn table(&self) -> &'static str {
        match self {
            ChildTable::Aliases => "aliases",
            ChildTable::Nationalities => "nationalities",
            ChildTable::SanctionTypes => "sanction_types",
            ChildTable::InterpolNationality => "interpol_nationality",
        }
    }

    fn value_column(&self) -> &'static str {
        match self {
            ChildTable::Aliases => "alias_name",
            ChildTable::Nationalities | ChildTable::InterpolNationality => "nationality",
            ChildTable::SanctionTypes => "sanction_type",
        }
    }

    /// Insert `value` under `entity_id` unless it is already there.
    /// Returns whether a row was added.
    fn merge(&self, tx: &Transaction, entity_id: i64, value: &str) -> rusqlite::Result<bool> {
        let exists_sql = format!(
            "SELECT 1 FROM {} WHERE entity_id = ?1 AND {} = ?2 LIMIT 1",
            self.table(),
            self.value_column()
        );
        let exists = tx
            .query_row(&exists_sql, params![entity_id, value], |_| Ok(()))
            .optional()?
            .is_some();

        if exists {
            return Ok(false);
        }

        let insert_sql = format!(
            "INSERT INTO {} (entity_id, {}) VALUES (?1, ?2)",
            self.table(),
            self.value_column()
        );
        tx.execute(&insert_sql, params![entity_id, value])?;
        Ok(true)
    }
}

// ============================================================================
// RESOLVER TRAIT
// ============================================================================

/// EntityResolver - identity rules for one source family
pub trait EntityResolver {
    type Record: Debug;
    type Key;

    fn family(&self) -> SourceFamily;

    /// Validate a record and build its identity key.
    fn prepare(&self, record: &Self::Record) -> std::result::Result<Self::Key, SkipReason>;

    /// Existing entity id for this key, if any.
    fn find(&self, tx: &Transaction, key: &Self::Key) -> rusqlite::Result<Option<i64>>;

    /// Insert a new entity row and return its id.
    fn insert(&self, tx: &Transaction, key: &Self::Key, record: &Self::Record) -> rusqlite::Result<i64>;

    /// Child values to merge under the entity.
    fn children(&self, record: &Self::Record) -> Vec<(ChildTable, Vec<String>)>;
}

/// Provenance written alongside a batch.
#[derive(Debug, Clone)]
pub struct BatchAudit {
    pub kind: SourceKind,
    pub label: String,
    pub input_sha256: Option<String>,
}

fn run_batch<R: EntityResolver>(
    tx: &Transaction,
    resolver: &R,
    records: &[R::Record],
) -> rusqlite::Result<LoadReport> {
    let mut report = LoadReport::default();

    for record in records {
        report.records_seen += 1;

        let key = match resolver.prepare(record) {
            Ok(key) => key,
            Err(reason) => {
                warn!("⚠️  Skipping {:?} record ({}): {:?}", resolver.family(), reason, record);
                report.records_skipped += 1;
                continue;
            }
        };

        let entity_id = match resolver.find(tx, &key)? {
            Some(id) => {
                report.entities_reused += 1;
                id
            }
            None => {
                report.entities_created += 1;
                resolver.insert(tx, &key, record)?
            }
        };

        for (table, values) in resolver.children(record) {
            for value in values {
                if table.merge(tx, entity_id, &value)? {
                    report.children_added += 1;
                }
            }
        }
    }

    Ok(report)
}

fn upsert_audited<R: EntityResolver>(
    conn: &mut Connection,
    resolver: &R,
    records: &[R::Record],
    audit: Option<&BatchAudit>,
) -> Result<LoadReport> {
    let tx = conn.transaction().map_err(EtlError::Transaction)?;

    // Dropping `tx` on an early return rolls the batch back
    let report = run_batch(&tx, resolver, records).map_err(EtlError::Transaction)?;

    if let Some(audit) = audit {
        let event = LoadEvent::new(audit.kind, &audit.label, &report)
            .with_input_digest(audit.input_sha256.clone());
        insert_load_event(&tx, &event).map_err(EtlError::Transaction)?;
    }

    tx.commit().map_err(EtlError::Transaction)?;

    info!(
        "✅ {:?} batch: {} seen, {} created, {} reused, {} children added, {} skipped",
        resolver.family(),
        report.records_seen,
        report.entities_created,
        report.entities_reused,
        report.children_added,
        report.records_skipped
    );
    Ok(report)
}

/// Upsert a batch atomically: either every row lands or none does.
pub fn upsert_batch<R: EntityResolver>(
    conn: &mut Connection,
    resolver: &R,
    records: &[R::Record],
) -> Result<LoadReport> {
    upsert_audited(conn, resolver, records, None)
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Route a parsed batch to its family's resolver.
pub fn dispatch(conn: &mut Connection, batch: &ParsedBatch) -> Result<LoadReport> {
    dispatch_audited(conn, batch, None)
}

pub fn dispatch_audited(
    conn: &mut Connection,
    batch: &ParsedBatch,
    audit: Option<&BatchAudit>,
) -> Result<LoadReport> {
    debug!("Dispatching {} {} records", batch.len(), batch.kind());

    match batch {
        ParsedBatch::Common { records, .. } => upsert_audited(conn, &CommonResolver, records, audit),
        ParsedBatch::Canada(records) => upsert_audited(conn, &CanadaResolver, records, audit),
        ParsedBatch::Interpol(records) => upsert_audited(conn, &InterpolResolver, records, audit),
    }
}

/// Loader bound to one database configuration.
pub struct Loader<'a> {
    config: &'a DatabaseConfig,
}

impl<'a> Loader<'a> {
    pub fn new(config: &'a DatabaseConfig) -> Self {
        Self { config }
    }

    /// Open the database and load one batch. A connection failure returns
    /// `EtlError::Connection` before anything is inserted.
    pub fn load(&self, batch: &ParsedBatch) -> Result<LoadReport> {
        let mut conn = open_connection(self.config)?;
        dispatch(&mut conn, batch)
    }

    /// Same as `load`, recording a load event in the batch transaction.
    pub fn load_audited(&self, batch: &ParsedBatch, audit: &BatchAudit) -> Result<LoadReport> {
        let mut conn = open_connection(self.config)?;
        dispatch_audited(&mut conn, batch, Some(audit))
    }
}
