// 🇪🇺 EU Financial Sanctions File parser
//
// The EU export has no primary-name field: the first distinct nameAlias is
// used as the name.

use super::{from_xml, SanctionsParser, SourceKind};
use crate::normalize::{clean_text, dedup_preserving_order, join_list, non_empty};
use crate::record::UnifiedRecord;
use anyhow::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    #[serde(default)]
    sanction_entity: Vec<SanctionEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SanctionEntity {
    #[serde(default)]
    name_alias: Vec<NameAlias>,
    #[serde(default)]
    citizenship: Vec<Citizenship>,
    #[serde(default)]
    subject_type: Vec<SubjectType>,
    #[serde(default)]
    regulation: Vec<Regulation>,
}

#[derive(Debug, Deserialize)]
struct NameAlias {
    #[serde(rename = "@wholeName")]
    whole_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Citizenship {
    #[serde(rename = "@countryDescription")]
    country_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubjectType {
    #[serde(rename = "@code")]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Regulation {
    #[serde(rename = "@regulationType")]
    regulation_type: Option<String>,
}

/// Europe Parser
pub struct EuropeParser;

impl EuropeParser {
    pub fn new() -> Self {
        EuropeParser
    }

    fn record(entity: &SanctionEntity, source: &str) -> UnifiedRecord {
        let aliases = dedup_preserving_order(
            entity
                .name_alias
                .iter()
                .filter_map(|a| clean_text(a.whole_name.as_deref())),
        );

        let nationalities = entity
            .citizenship
            .iter()
            .filter_map(|c| non_empty(c.country_description.as_deref()));

        let subject_types = entity
            .subject_type
            .iter()
            .filter_map(|s| non_empty(s.code.as_deref()));

        let sanction_type = entity
            .regulation
            .first()
            .and_then(|r| non_empty(r.regulation_type.as_deref()));

        UnifiedRecord::new(aliases.first().cloned(), source)
            .with_alias(join_list(&aliases))
            .with_nationality(join_list(nationalities))
            .with_designation(join_list(subject_types))
            .with_sanction_type(sanction_type)
    }
}

impl Default for EuropeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SanctionsParser for EuropeParser {
    fn parse(&self, input: &str, source: &str) -> Result<Vec<UnifiedRecord>> {
        let export: Export = from_xml(input, SourceKind::Europe)?;

        let records: Vec<UnifiedRecord> = export
            .sanction_entity
            .iter()
            .map(|e| Self::record(e, source))
            .collect();

        info!("Europe: {} sanction entities parsed", records.len());
        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Europe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EU_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<export xmlns="http://eu.europa.ec/fpi/fsd/export" generationDate="2025-05-28T10:00:00.000+02:00">
  <globalFileId>123</globalFileId>
  <sanctionEntity designationDate="2022-02-25" logicalId="1">
    <regulation regulationType="amendment" programme="RUS"/>
    <regulation regulationType="regulation" programme="RUS"/>
    <subjectType code="person" classificationCode="P"/>
    <nameAlias wholeName="Al Pacino" nameLanguage=""/>
    <nameAlias wholeName="Al Pacino" nameLanguage="EN"/>
    <nameAlias wholeName="A. Pacino"/>
    <nameAlias wholeName="Аль Пачино" nameLanguage="RU"/>
    <citizenship countryDescription="UNITED STATES" countryIso2Code="US"/>
    <citizenship countryDescription="ITALY" countryIso2Code="IT"/>
  </sanctionEntity>
  <sanctionEntity logicalId="2">
    <subjectType code="enterprise"/>
  </sanctionEntity>
</export>"#;

    #[test]
    fn test_europe_alias_dedup_and_name() {
        let records = EuropeParser::new().parse(EU_XML, "Europe").unwrap();
        assert_eq!(records.len(), 2);

        let pacino = &records[0];
        assert_eq!(pacino.name.as_deref(), Some("Al Pacino"));
        assert_eq!(pacino.alias.as_deref(), Some("Al Pacino, A. Pacino"));
        assert_eq!(pacino.nationality.as_deref(), Some("UNITED STATES, ITALY"));
        assert_eq!(pacino.designation.as_deref(), Some("person"));
        assert_eq!(pacino.sanction_type.as_deref(), Some("amendment"), "first regulation only");
    }

    #[test]
    fn test_europe_entity_without_aliases() {
        let records = EuropeParser::new().parse(EU_XML, "Europe").unwrap();
        let bare = &records[1];

        assert_eq!(bare.name, None);
        assert_eq!(bare.alias, None);
        assert_eq!(bare.nationality, None);
        assert_eq!(bare.designation.as_deref(), Some("enterprise"));
        assert_eq!(bare.sanction_type, None);
    }

    #[test]
    fn test_europe_non_latin_only_aliases_leave_name_empty() {
        let xml = r#"<export xmlns="http://eu.europa.ec/fpi/fsd/export">
  <sanctionEntity logicalId="3">
    <subjectType code="person"/>
    <nameAlias wholeName="محمد عبد الله" nameLanguage="AR"/>
    <nameAlias wholeName="Мухаммад" nameLanguage="RU"/>
    <citizenship countryDescription="SYRIA"/>
  </sanctionEntity>
</export>"#;

        let records = EuropeParser::new().parse(xml, "Europe").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, None);
        assert_eq!(records[0].alias, None);
        assert_eq!(records[0].nationality.as_deref(), Some("SYRIA"));
    }
}
