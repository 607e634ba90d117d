// Canada family: one row per (name, nationalities, date_of_listing), no
// children. A missing listing date is part of the key and matched with `IS`
// so reloads stay idempotent.

use super::{ChildTable, EntityResolver, SkipReason};
use crate::normalize::non_empty;
use crate::parsers::SourceFamily;
use crate::record::CanadaRecord;
use rusqlite::{params, OptionalExtension, Transaction};

const DEFAULT_SOURCE: &str = "Canada";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanadaKey {
    pub name: String,
    pub nationalities: String,
    pub date_of_listing: Option<String>,
}

pub struct CanadaResolver;

impl EntityResolver for CanadaResolver {
    type Record = CanadaRecord;
    type Key = CanadaKey;

    fn family(&self) -> SourceFamily {
        SourceFamily::Canada
    }

    fn prepare(&self, record: &CanadaRecord) -> Result<CanadaKey, SkipReason> {
        Ok(CanadaKey {
            name: non_empty(record.name.as_deref()).ok_or(SkipReason::MissingName)?,
            nationalities: non_empty(record.nationalities.as_deref())
                .ok_or(SkipReason::MissingNationality)?,
            date_of_listing: non_empty(record.date_of_listing.as_deref()),
        })
    }

    fn find(&self, tx: &Transaction, key: &CanadaKey) -> rusqlite::Result<Option<i64>> {
        tx.query_row(
            "SELECT entity_id FROM cannada_tbl
             WHERE name = ?1 AND nationalities = ?2 AND date_of_listing IS ?3
             ORDER BY entity_id LIMIT 1",
            params![key.name, key.nationalities, key.date_of_listing],
            |row| row.get(0),
        )
        .optional()
    }

    fn insert(&self, tx: &Transaction, key: &CanadaKey, record: &CanadaRecord) -> rusqlite::Result<i64> {
        let source = non_empty(record.source.as_deref()).unwrap_or_else(|| DEFAULT_SOURCE.to_string());
        tx.execute(
            "INSERT INTO cannada_tbl (name, nationalities, date_of_listing, source) VALUES (?1, ?2, ?3, ?4)",
            params![key.name, key.nationalities, key.date_of_listing, source],
        )?;
        Ok(tx.last_insert_rowid())
    }

    fn children(&self, _record: &CanadaRecord) -> Vec<(ChildTable, Vec<String>)> {
        Vec::new()
    }
}
