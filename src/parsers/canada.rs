// 🇨🇦 Canada Consolidated Autonomous Sanctions List parser
//
// Canada rows don't fit the unified shape: the loader keys them on
// (name, nationalities, date_of_listing), so they get their own record type.

use super::{first_text, from_xml, SourceKind, XmlText};
use crate::normalize::non_empty;
use crate::record::CanadaRecord;
use anyhow::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct DataSet {
    #[serde(default)]
    record: Vec<Row>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Row {
    given_name: Vec<XmlText>,
    last_name: Vec<XmlText>,
    country: Vec<XmlText>,
    date_of_listing: Vec<XmlText>,
}

impl Row {
    fn name(&self) -> Option<String> {
        let first = first_text(&self.given_name).unwrap_or("").trim();
        let last = first_text(&self.last_name).unwrap_or("").trim();
        non_empty(Some(format!("{} {}", first, last).as_str()))
    }

    /// "Russia / Russie" → "Russia"
    fn nationality(&self) -> Option<String> {
        let country = first_text(&self.country)?;
        non_empty(country.split('/').next())
    }
}

/// Parse the Canada XML export. Rows with neither a given nor a last name
/// are dropped.
pub fn parse_canada(xml: &str, source: &str) -> Result<Vec<CanadaRecord>> {
    let data: DataSet = from_xml(xml, SourceKind::Canada)?;
    let total = data.record.len();

    let records: Vec<CanadaRecord> = data
        .record
        .iter()
        .filter_map(|row| {
            let name = row.name()?;
            Some(CanadaRecord {
                name: Some(name),
                nationalities: row.nationality(),
                date_of_listing: non_empty(first_text(&row.date_of_listing)),
                source: Some(source.to_string()),
            })
        })
        .collect();

    info!(
        "Canada: {} records parsed, {} without a name dropped",
        records.len(),
        total - records.len()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANADA_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<data-set>
  <record>
    <Country>Russia / Russie</Country>
    <LastName>Abramovich</LastName>
    <GivenName>Roman</GivenName>
    <DateOfListing>2022-06-10</DateOfListing>
    <Item>1</Item>
  </record>
  <record>
    <Country>Belarus</Country>
    <EntityOrShip>Belaruskali</EntityOrShip>
    <DateOfListing>2021-08-09</DateOfListing>
  </record>
  <record>
    <LastName>Kadyrov</LastName>
    <GivenName></GivenName>
  </record>
</data-set>"#;

    #[test]
    fn test_canada_parser() {
        let records = parse_canada(CANADA_XML, "cannada").unwrap();
        assert_eq!(records.len(), 2, "Nameless entity row must be skipped");

        let roman = &records[0];
        assert_eq!(roman.name.as_deref(), Some("Roman Abramovich"));
        assert_eq!(roman.nationalities.as_deref(), Some("Russia"));
        assert_eq!(roman.date_of_listing.as_deref(), Some("2022-06-10"));
        assert_eq!(roman.source.as_deref(), Some("cannada"));

        let kadyrov = &records[1];
        assert_eq!(kadyrov.name.as_deref(), Some("Kadyrov"));
        assert_eq!(kadyrov.nationalities, None);
        assert_eq!(kadyrov.date_of_listing, None);
    }

    #[test]
    fn test_canada_repeated_element_keeps_first_and_rest_of_feed() {
        let xml = r#"<data-set>
  <record>
    <GivenName>Oleg</GivenName>
    <GivenName>Olegovich</GivenName>
    <LastName>Ivanov</LastName>
    <DateOfListing>2022-03-01</DateOfListing>
    <DateOfListing>2022-04-01</DateOfListing>
  </record>
  <record>
    <GivenName>Good</GivenName>
    <LastName>Person</LastName>
    <Country>Iran</Country>
  </record>
</data-set>"#;

        let records = parse_canada(xml, "cannada").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Oleg Ivanov"));
        assert_eq!(records[0].date_of_listing.as_deref(), Some("2022-03-01"));
        assert_eq!(records[1].name.as_deref(), Some("Good Person"));
        assert_eq!(records[1].nationalities.as_deref(), Some("Iran"));
    }
}
