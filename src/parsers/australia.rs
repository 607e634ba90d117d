// 🇦🇺 Australia DFAT Consolidated List parser (CSV)
//
// Alias and designation are buried in the "Additional Information" free text
// and are pulled out with regexes.

use super::{SanctionsParser, SourceKind};
use crate::normalize::{non_empty, UNKNOWN};
use crate::record::UnifiedRecord;
use crate::writer::read_text;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use std::path::Path;
use tracing::info;

const COL_NAME: &str = "Name of Individual or Entity";
const COL_CITIZENSHIP: &str = "Citizenship";
const COL_COMMITTEES: &str = "Committees";
const COL_ADDITIONAL: &str = "Additional Information";

struct FreeTextPatterns {
    alias: Regex,
    designation: Regex,
    list_marker: Regex,
}

impl FreeTextPatterns {
    fn compile() -> Result<Self> {
        Ok(FreeTextPatterns {
            alias: Regex::new(r"(?i)Also known as:? (.*?)(?:\.|Designation:|Review|$)")?,
            designation: Regex::new(
                r"(?is)Designation:\s*(.*?)(?:Review|Belongs to|Member|Also known as|$)",
            )?,
            list_marker: Regex::new(r"[a-d]\)")?,
        })
    }

    fn alias(&self, text: &str) -> Option<String> {
        self.alias
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| non_empty(Some(m.as_str())))
    }

    /// "a) Minister b) General" → "- Minister - General"
    fn designation(&self, text: &str) -> String {
        self.designation
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| self.list_marker.replace_all(m.as_str().trim(), "-").into_owned())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

/// Column positions, looked up by header name.
struct Columns {
    name: Option<usize>,
    citizenship: Option<usize>,
    committees: Option<usize>,
    additional: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |wanted: &str| headers.iter().position(|h| h.trim() == wanted);
        Columns {
            name: find(COL_NAME),
            citizenship: find(COL_CITIZENSHIP),
            committees: find(COL_COMMITTEES),
            additional: find(COL_ADDITIONAL),
        }
    }

    fn get<'r>(record: &'r StringRecord, column: Option<usize>) -> Option<&'r str> {
        column.and_then(|i| record.get(i))
    }
}

/// Australia Parser
pub struct AustraliaParser;

impl AustraliaParser {
    pub fn new() -> Self {
        AustraliaParser
    }
}

impl Default for AustraliaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SanctionsParser for AustraliaParser {
    /// `input` is the path of the DFAT CSV export.
    fn parse(&self, input: &str, source: &str) -> Result<Vec<UnifiedRecord>> {
        let path = Path::new(input);
        let patterns = FreeTextPatterns::compile()?;
        let content = read_text(path)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header of {}", path.display()))?
            .clone();
        let columns = Columns::from_headers(&headers);

        let mut records = Vec::new();
        for (line_num, result) in reader.records().enumerate() {
            let row = result.with_context(|| {
                format!("Failed to parse CSV line {} in {}", line_num + 2, path.display())
            })?;

            let additional = Columns::get(&row, columns.additional).unwrap_or("").trim();

            records.push(
                UnifiedRecord::new(non_empty(Columns::get(&row, columns.name)), source)
                    .with_alias(patterns.alias(additional))
                    .with_nationality(non_empty(Columns::get(&row, columns.citizenship)))
                    .with_designation(Some(patterns.designation(additional)))
                    .with_sanction_type(non_empty(Columns::get(&row, columns.committees))),
            );
        }

        info!("Australia: {} rows parsed from {}", records.len(), path.display());
        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Australia
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const AUS_CSV: &str = "Reference,Name of Individual or Entity,Type,Citizenship,Additional Information,Committees\n\
1,Kim Jong Un,Individual,North Korean,\"Also known as: Kim Jong-un. Designation: a) Supreme Leader b) Chairman. Review date 2020\",DPRK\n\
2,Acme Trading,Entity,,\"A close associate of someone.\",\n";

    #[test]
    fn test_australia_free_text_extraction() {
        let file = write_csv(AUS_CSV);
        let records = AustraliaParser::new()
            .parse(file.path().to_str().unwrap(), "aus")
            .unwrap();
        assert_eq!(records.len(), 2);

        let kim = &records[0];
        assert_eq!(kim.name.as_deref(), Some("Kim Jong Un"));
        assert_eq!(kim.alias.as_deref(), Some("Kim Jong-un"));
        assert_eq!(kim.nationality.as_deref(), Some("North Korean"));
        assert_eq!(kim.designation.as_deref(), Some("- Supreme Leader - Chairman."));
        assert_eq!(kim.sanction_type.as_deref(), Some("DPRK"));
        assert_eq!(kim.source, "aus");
    }

    #[test]
    fn test_australia_missing_values_are_none() {
        let file = write_csv(AUS_CSV);
        let records = AustraliaParser::new()
            .parse(file.path().to_str().unwrap(), "aus")
            .unwrap();
        let acme = &records[1];

        assert_eq!(acme.alias, None);
        assert_eq!(acme.nationality, None);
        assert_eq!(acme.sanction_type, None);
        assert_eq!(acme.designation.as_deref(), Some(UNKNOWN));
        assert_eq!(acme.source, "aus", "free-text associate note does not replace the label");
    }

    #[test]
    fn test_australia_missing_file_is_an_error() {
        assert!(AustraliaParser::new().parse("/nonexistent/aus.csv", "aus").is_err());
    }
}
