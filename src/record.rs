// 📇 Record shapes - the common currency between parsers, staging and loaders

use crate::parsers::SourceKind;
use serde::{Deserialize, Serialize};

// ============================================================================
// UNIFIED RECORD
// ============================================================================

/// UnifiedRecord - Output of every common-family parser.
///
/// All six fields are always present; optional values are `None`, never a
/// literal `"None"`. List-valued fields (`alias`, `nationality`,
/// `sanction_type`) are comma-joined strings. Header aliases accept CSVs
/// staged with the capitalized column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    #[serde(alias = "Name")]
    pub name: Option<String>,

    #[serde(alias = "Alias")]
    pub alias: Option<String>,

    #[serde(alias = "Nationality")]
    pub nationality: Option<String>,

    #[serde(alias = "Designation")]
    pub designation: Option<String>,

    #[serde(alias = "Sanction Type")]
    pub sanction_type: Option<String>,

    #[serde(alias = "Source")]
    pub source: String,
}

impl UnifiedRecord {
    /// Column names of the staged CSV, in order.
    pub const HEADERS: [&'static str; 6] = [
        "name",
        "alias",
        "nationality",
        "designation",
        "sanction_type",
        "source",
    ];

    pub fn new(name: Option<String>, source: &str) -> Self {
        UnifiedRecord {
            name,
            alias: None,
            nationality: None,
            designation: None,
            sanction_type: None,
            source: source.to_string(),
        }
    }

    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    pub fn with_nationality(mut self, nationality: Option<String>) -> Self {
        self.nationality = nationality;
        self
    }

    pub fn with_designation(mut self, designation: Option<String>) -> Self {
        self.designation = designation;
        self
    }

    pub fn with_sanction_type(mut self, sanction_type: Option<String>) -> Self {
        self.sanction_type = sanction_type;
        self
    }
}

// ============================================================================
// SPECIALIZED RECORDS
// ============================================================================

/// Canada consolidated list row. Keyed by (name, nationalities, date_of_listing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanadaRecord {
    pub name: Option<String>,
    pub nationalities: Option<String>,
    pub date_of_listing: Option<String>,
    pub source: Option<String>,
}

/// Interpol red notice row. `age` stays raw text until the loader's integer
/// guard accepts or rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolRecord {
    #[serde(alias = "Name")]
    pub name: Option<String>,

    #[serde(alias = "Age")]
    pub age: Option<String>,

    #[serde(alias = "Nationality")]
    pub nationality: Option<String>,
}

// ============================================================================
// PARSED BATCH
// ============================================================================

/// One source's worth of parsed records, tagged by loader family.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBatch {
    Common {
        kind: SourceKind,
        records: Vec<UnifiedRecord>,
    },
    Canada(Vec<CanadaRecord>),
    Interpol(Vec<InterpolRecord>),
}

impl ParsedBatch {
    pub fn kind(&self) -> SourceKind {
        match self {
            ParsedBatch::Common { kind, .. } => *kind,
            ParsedBatch::Canada(_) => SourceKind::Canada,
            ParsedBatch::Interpol(_) => SourceKind::Interpol,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ParsedBatch::Common { records, .. } => records.len(),
            ParsedBatch::Canada(records) => records.len(),
            ParsedBatch::Interpol(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_record_builder() {
        let record = UnifiedRecord::new(Some("Viktor Bout".to_string()), "UN")
            .with_alias(Some("Victor Butt".to_string()))
            .with_nationality(Some("Russia".to_string()))
            .with_designation(Some("individual".to_string()));

        assert_eq!(record.name.as_deref(), Some("Viktor Bout"));
        assert_eq!(record.alias.as_deref(), Some("Victor Butt"));
        assert_eq!(record.nationality.as_deref(), Some("Russia"));
        assert_eq!(record.sanction_type, None);
        assert_eq!(record.source, "UN");
    }

    #[test]
    fn test_batch_kind_and_len() {
        let batch = ParsedBatch::Common {
            kind: SourceKind::Uk,
            records: vec![UnifiedRecord::new(None, "uk")],
        };
        assert_eq!(batch.kind(), SourceKind::Uk);
        assert_eq!(batch.len(), 1);

        let empty = ParsedBatch::Interpol(Vec::new());
        assert_eq!(empty.kind(), SourceKind::Interpol);
        assert!(empty.is_empty());
    }
}
