// 🚨 Interpol Red Notices parser
//
// Input is the CSV produced by the red-notice scraper (Name, Age,
// Nationality). Rows the loader would reject anyway are dropped here so the
// staged file only carries loadable rows.

use crate::loader::parse_age;
use crate::normalize::non_empty;
use crate::record::InterpolRecord;
use crate::writer::read_text;
use anyhow::Result;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{info, warn};

pub fn parse_interpol(path: &Path) -> Result<Vec<InterpolRecord>> {
    let content = read_text(path)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (line_num, result) in reader.deserialize::<InterpolRecord>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!("Interpol: dropping unreadable line {}: {}", line_num + 2, err);
                dropped += 1;
                continue;
            }
        };

        let name = non_empty(row.name.as_deref());
        let age = row.age.as_deref().and_then(parse_age);

        match (name, age) {
            (Some(name), Some(age)) => records.push(InterpolRecord {
                name: Some(name),
                age: Some(age.to_string()),
                nationality: non_empty(row.nationality.as_deref()),
            }),
            _ => {
                warn!(
                    "Interpol: dropping line {} (name={:?}, age={:?})",
                    line_num + 2,
                    row.name,
                    row.age
                );
                dropped += 1;
            }
        }
    }

    info!(
        "Interpol: {} notices parsed, {} dropped from {}",
        records.len(),
        dropped,
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_interpol_parser_drops_unloadable_rows() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            "\u{FEFF}Name,Age,Nationality\n\
             JOHN DOE,34,\"France, Spain\"\n\
             JANE ROE,unknown,Italy\n\
             ,40,Peru\n\
             ALI BABA, 52 ,\n"
                .as_bytes(),
        )
        .unwrap();

        let records = parse_interpol(file.path()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].name.as_deref(), Some("JOHN DOE"));
        assert_eq!(records[0].age.as_deref(), Some("34"));
        assert_eq!(records[0].nationality.as_deref(), Some("France, Spain"));

        assert_eq!(records[1].name.as_deref(), Some("ALI BABA"));
        assert_eq!(records[1].age.as_deref(), Some("52"));
        assert_eq!(records[1].nationality, None);
    }

    #[test]
    fn test_interpol_ragged_row_does_not_drop_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            "Name,Age,Nationality\n\
             JOHN DOE,34,France\n\
             BROKEN ROW,40,Peru,extra\n\
             SHORT ROW\n\
             JANE ROE,50,Italy\n"
                .as_bytes(),
        )
        .unwrap();

        let records = parse_interpol(file.path()).unwrap();
        let names: Vec<&str> = records.iter().filter_map(|r| r.name.as_deref()).collect();

        assert!(names.contains(&"JOHN DOE"));
        assert!(names.contains(&"JANE ROE"));
        assert!(!names.contains(&"SHORT ROW"), "no age, not loadable");
    }
}
