// Common family: entities keyed by (name, source) with alias, nationality
// and sanction-type children.

use super::{ChildTable, EntityResolver, SkipReason};
use crate::normalize::{non_empty, split_list};
use crate::parsers::SourceFamily;
use crate::record::UnifiedRecord;
use rusqlite::{params, OptionalExtension, Transaction};

pub struct CommonResolver;

impl EntityResolver for CommonResolver {
    type Record = UnifiedRecord;
    /// (name, source)
    type Key = (String, String);

    fn family(&self) -> SourceFamily {
        SourceFamily::Common
    }

    fn prepare(&self, record: &UnifiedRecord) -> Result<Self::Key, SkipReason> {
        let name = non_empty(record.name.as_deref()).ok_or(SkipReason::MissingName)?;
        let source = non_empty(Some(record.source.as_str())).ok_or(SkipReason::MissingSource)?;
        Ok((name, source))
    }

    fn find(&self, tx: &Transaction, key: &Self::Key) -> rusqlite::Result<Option<i64>> {
        tx.query_row(
            "SELECT entity_id FROM sanctioned_entities
             WHERE name = ?1 AND source = ?2
             ORDER BY entity_id LIMIT 1",
            params![key.0, key.1],
            |row| row.get(0),
        )
        .optional()
    }

    /// Designation is only written on first sighting.
    fn insert(&self, tx: &Transaction, key: &Self::Key, record: &UnifiedRecord) -> rusqlite::Result<i64> {
        tx.execute(
            "INSERT INTO sanctioned_entities (name, designation, source) VALUES (?1, ?2, ?3)",
            params![key.0, non_empty(record.designation.as_deref()), key.1],
        )?;
        Ok(tx.last_insert_rowid())
    }

    fn children(&self, record: &UnifiedRecord) -> Vec<(ChildTable, Vec<String>)> {
        vec![
            (ChildTable::Aliases, split_list(record.alias.as_deref())),
            (ChildTable::Nationalities, split_list(record.nationality.as_deref())),
            (ChildTable::SanctionTypes, split_list(record.sanction_type.as_deref())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{setup_database, table_count, Table};
    use crate::loader::upsert_batch;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn entity_ids(conn: &Connection) -> Vec<(i64, String, Option<String>)> {
        let mut stmt = conn
            .prepare("SELECT entity_id, name, designation FROM sanctioned_entities ORDER BY entity_id")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_key_stability_keeps_first_designation() {
        let mut conn = test_conn();
        let records = vec![
            UnifiedRecord::new(Some("Ri Won Ho".into()), "UN").with_designation(Some("Official".into())),
            UnifiedRecord::new(Some("Ri Won Ho".into()), "UN").with_designation(Some("Minister".into())),
        ];

        let report = upsert_batch(&mut conn, &CommonResolver, &records).unwrap();
        assert_eq!(report.entities_created, 1);
        assert_eq!(report.entities_reused, 1);

        let rows = entity_ids(&conn);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].2.as_deref(), Some("Official"), "first designation wins");

        println!("✅ Key stability test PASSED");
    }

    #[test]
    fn test_same_name_different_source_is_two_entities() {
        let mut conn = test_conn();
        let records = vec![
            UnifiedRecord::new(Some("Viktor Bout".into()), "UN"),
            UnifiedRecord::new(Some("Viktor Bout".into()), "USOFAC"),
        ];

        upsert_batch(&mut conn, &CommonResolver, &records).unwrap();
        assert_eq!(table_count(&conn, Table::SanctionedEntities).unwrap(), 2);
    }

    #[test]
    fn test_comma_list_dedup() {
        let mut conn = test_conn();
        let records = vec![UnifiedRecord::new(Some("X".into()), "UK").with_alias(Some("A, B, B, A".into()))];

        let report = upsert_batch(&mut conn, &CommonResolver, &records).unwrap();
        assert_eq!(report.children_added, 2);
        assert_eq!(table_count(&conn, Table::Aliases).unwrap(), 2);
    }

    #[test]
    fn test_new_children_merge_into_existing_entity() {
        let mut conn = test_conn();
        let first = vec![UnifiedRecord::new(Some("X".into()), "UK").with_nationality(Some("Russia".into()))];
        let second =
            vec![UnifiedRecord::new(Some("X".into()), "UK").with_nationality(Some("Russia, Cyprus".into()))];

        upsert_batch(&mut conn, &CommonResolver, &first).unwrap();
        let report = upsert_batch(&mut conn, &CommonResolver, &second).unwrap();

        assert_eq!(report.children_added, 1, "only Cyprus is new");
        assert_eq!(table_count(&conn, Table::Nationalities).unwrap(), 2);
        assert_eq!(table_count(&conn, Table::SanctionedEntities).unwrap(), 1);
    }

    #[test]
    fn test_nameless_records_are_skipped_not_fatal() {
        let mut conn = test_conn();
        let records = vec![
            UnifiedRecord::new(None, "Swizerland"),
            UnifiedRecord::new(Some("  ".into()), "Swizerland"),
            UnifiedRecord::new(Some("Named".into()), ""),
            UnifiedRecord::new(Some("Named".into()), "Swizerland"),
        ];

        let report = upsert_batch(&mut conn, &CommonResolver, &records).unwrap();
        assert_eq!(report.records_seen, 4);
        assert_eq!(report.records_skipped, 3);
        assert_eq!(report.entities_created, 1);
    }
}
