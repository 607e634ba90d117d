// 📝 Unified-Schema Writer - staged CSV files between parse and load
//
// Staged files are UTF-8 with a header row of field names; `None` is written
// as an empty field and read back as `None`.

use crate::error::{EtlError, Result};
use crate::parsers::{SourceFamily, SourceKind};
use crate::record::ParsedBatch;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const BOM: char = '\u{FEFF}';

// ============================================================================
// FILE NAMES
// ============================================================================

/// "Sanctions List-2025" → "Sanctions_List_2025"
pub fn sanitize_label(label: &str) -> String {
    label.trim().replace(|c: char| c == ' ' || c == '-', "_")
}

/// `{key}_{label}_parsed.csv`, e.g. `un_UN_parsed.csv`
pub fn staged_file_name(kind: SourceKind, label: &str) -> String {
    format!("{}_{}_parsed.csv", kind.key(), sanitize_label(label))
}

// ============================================================================
// READING
// ============================================================================

/// Decode raw bytes as UTF-8, falling back to Latin-1, and drop a leading BOM.
pub fn decode_bytes(bytes: Vec<u8>, origin: &Path) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                "{} is not valid UTF-8 (at byte {}), decoding as Latin-1",
                origin.display(),
                err.utf8_error().valid_up_to()
            );
            err.into_bytes().into_iter().map(char::from).collect()
        }
    };

    match text.strip_prefix(BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Read a whole input file as text (XML feeds, CSV feeds, staged files).
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(EtlError::MissingInput(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    Ok(decode_bytes(bytes, path))
}

/// Read a staged CSV back into records.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = read_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;

    debug!("Read {} staged records from {}", records.len(), path.display());
    Ok(records)
}

/// Hex SHA-256 of a file's bytes, recorded with each load for provenance.
pub fn digest_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest for the audit trail. A file that cannot be hashed still loads;
/// the event then records no digest.
pub fn digest_or_warn(path: &Path) -> Option<String> {
    match digest_file(path) {
        Ok(digest) => Some(digest),
        Err(err) => {
            warn!("Could not hash {}, load event gets no digest: {}", path.display(), err);
            None
        }
    }
}

// ============================================================================
// WRITING
// ============================================================================

/// Write records with a header row. An empty batch writes no file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    if records.is_empty() {
        debug!("No records for {}, nothing written", path.display());
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(records.len())
}

/// Stage any family's batch.
pub fn write_batch(path: &Path, batch: &ParsedBatch) -> Result<usize> {
    match batch {
        ParsedBatch::Common { records, .. } => write_records(path, records),
        ParsedBatch::Canada(records) => write_records(path, records),
        ParsedBatch::Interpol(records) => write_records(path, records),
    }
}

/// Read a staged file back as the batch type of `kind`'s family.
pub fn read_batch(kind: SourceKind, path: &Path) -> Result<ParsedBatch> {
    let batch = match kind.family() {
        SourceFamily::Common => ParsedBatch::Common {
            kind,
            records: read_records(path)?,
        },
        SourceFamily::Canada => ParsedBatch::Canada(read_records(path)?),
        SourceFamily::Interpol => ParsedBatch::Interpol(read_records(path)?),
    };
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CanadaRecord, InterpolRecord, UnifiedRecord};
    use tempfile::TempDir;

    #[test]
    fn test_staged_file_name() {
        assert_eq!(staged_file_name(SourceKind::Un, "UN"), "un_UN_parsed.csv");
        assert_eq!(
            staged_file_name(SourceKind::Ofac, "US OFAC-SDN"),
            "ofac_US_OFAC_SDN_parsed.csv"
        );
    }

    #[test]
    fn test_write_then_read_keeps_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("uk_UK_parsed.csv");

        let records = vec![
            UnifiedRecord::new(Some("Oleg Deripaska".into()), "UK")
                .with_alias(Some("Oleg V, O. Deripaska".into()))
                .with_nationality(Some("Russia".into())),
            UnifiedRecord::new(None, "UK"),
        ];

        assert_eq!(write_records(&path, &records).unwrap(), 2);

        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with(&UnifiedRecord::HEADERS.join(",")));

        let back: Vec<UnifiedRecord> = read_records(&path).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_empty_batch_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");

        assert_eq!(write_records::<UnifiedRecord>(&path, &[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_read_latin1_with_capitalized_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.csv");

        let mut bytes = b"Name,Age,Nationality\nJos".to_vec();
        bytes.push(0xE9); // é in Latin-1
        bytes.extend_from_slice(b",41,Mexico\n");
        fs::write(&path, bytes).unwrap();

        let records: Vec<InterpolRecord> = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("José"));
        assert_eq!(records[0].age.as_deref(), Some("41"));
    }

    #[test]
    fn test_canada_batch_survives_staging() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(staged_file_name(SourceKind::Canada, "cannada"));
        let batch = ParsedBatch::Canada(vec![CanadaRecord {
            name: Some("Roman Abramovich".into()),
            nationalities: Some("Russia".into()),
            date_of_listing: None,
            source: Some("cannada".into()),
        }]);

        assert_eq!(write_batch(&path, &batch).unwrap(), 1);
        assert_eq!(read_batch(SourceKind::Canada, &path).unwrap(), batch);
    }

    #[test]
    fn test_read_text_strips_bom_and_reports_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bom.xml");
        fs::write(&path, "\u{FEFF}<root/>").unwrap();

        assert_eq!(read_text(&path).unwrap(), "<root/>");
        assert!(matches!(
            read_text(&dir.path().join("missing.xml")),
            Err(EtlError::MissingInput(_))
        ));
    }

    #[test]
    fn test_digest_or_warn() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("un.xml");
        fs::write(&path, "<CONSOLIDATED_LIST/>").unwrap();

        let digest = digest_or_warn(&path).unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(Some(digest), digest_file(&path).ok());
        assert_eq!(digest_or_warn(&dir.path().join("gone.xml")), None);
    }
}
