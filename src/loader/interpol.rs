// Interpol family: entities keyed by (name, integer age) with nationality
// children.

use super::{parse_age, ChildTable, EntityResolver, SkipReason};
use crate::normalize::{non_empty, split_list};
use crate::parsers::SourceFamily;
use crate::record::InterpolRecord;
use rusqlite::{params, OptionalExtension, Transaction};

pub struct InterpolResolver;

impl EntityResolver for InterpolResolver {
    type Record = InterpolRecord;
    /// (name, age)
    type Key = (String, i64);

    fn family(&self) -> SourceFamily {
        SourceFamily::Interpol
    }

    fn prepare(&self, record: &InterpolRecord) -> Result<Self::Key, SkipReason> {
        let name = non_empty(record.name.as_deref()).ok_or(SkipReason::MissingName)?;
        let raw_age = record.age.as_deref().unwrap_or("");
        let age = parse_age(raw_age).ok_or_else(|| SkipReason::InvalidAge(raw_age.to_string()))?;
        Ok((name, age))
    }

    fn find(&self, tx: &Transaction, key: &Self::Key) -> rusqlite::Result<Option<i64>> {
        tx.query_row(
            "SELECT entity_id FROM interpol_tbl WHERE name = ?1 AND age = ?2
             ORDER BY entity_id LIMIT 1",
            params![key.0, key.1],
            |row| row.get(0),
        )
        .optional()
    }

    fn insert(&self, tx: &Transaction, key: &Self::Key, _record: &InterpolRecord) -> rusqlite::Result<i64> {
        tx.execute(
            "INSERT INTO interpol_tbl (name, age) VALUES (?1, ?2)",
            params![key.0, key.1],
        )?;
        Ok(tx.last_insert_rowid())
    }

    fn children(&self, record: &InterpolRecord) -> Vec<(ChildTable, Vec<String>)> {
        vec![(
            ChildTable::InterpolNationality,
            split_list(record.nationality.as_deref()),
        )]
    }
}
