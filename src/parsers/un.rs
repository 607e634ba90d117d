// 🇺🇳 UN Security Council Consolidated List parser
//
// Individuals and entities share one record shape. Every text value goes
// through clean_text: mis-decoded or non-Latin values become None.

use super::{first_text, from_xml, SanctionsParser, SourceKind, XmlText};
use crate::normalize::{clean_text, UNKNOWN};
use crate::record::UnifiedRecord;
use anyhow::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConsolidatedList {
    #[serde(rename = "INDIVIDUALS")]
    individuals: Vec<Individuals>,
    #[serde(rename = "ENTITIES")]
    entities: Vec<Entities>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Individuals {
    #[serde(rename = "INDIVIDUAL")]
    items: Vec<UnEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entities {
    #[serde(rename = "ENTITY")]
    items: Vec<UnEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UnEntry {
    #[serde(rename = "FIRST_NAME")]
    first_name: Vec<XmlText>,
    #[serde(rename = "SECOND_NAME")]
    second_name: Vec<XmlText>,
    #[serde(rename = "THIRD_NAME")]
    third_name: Vec<XmlText>,
    #[serde(rename = "UN_LIST_TYPE")]
    list_type: Vec<XmlText>,
    #[serde(rename = "INDIVIDUAL_ALIAS", alias = "ENTITY_ALIAS")]
    aliases: Vec<AliasEntry>,
    #[serde(rename = "NATIONALITY")]
    nationality: Vec<ValueList>,
    #[serde(rename = "DESIGNATION")]
    designation: Vec<ValueList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AliasEntry {
    #[serde(rename = "ALIAS_NAME")]
    alias_name: Vec<XmlText>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ValueList {
    #[serde(rename = "VALUE")]
    values: Vec<XmlText>,
}

impl UnEntry {
    /// First alias only; a garbled first alias means no alias.
    fn alias(&self) -> Option<String> {
        self.aliases
            .first()
            .and_then(|a| clean_text(first_text(&a.alias_name)))
    }

    /// First value of a VALUE list, cleaned; `default` when no value exists.
    fn first_value(lists: &[ValueList], default: &str) -> Option<String> {
        match lists.iter().flat_map(|l| l.values.iter()).next() {
            Some(value) => clean_text(value.as_str()),
            None => Some(default.to_string()),
        }
    }

    fn sanction_type(&self) -> Option<String> {
        match self.list_type.first() {
            Some(list_type) => clean_text(list_type.as_str()),
            None => Some(UNKNOWN.to_string()),
        }
    }
}

/// UN Parser
pub struct UnParser;

impl UnParser {
    pub fn new() -> Self {
        UnParser
    }

    fn individual(entry: &UnEntry, source: &str) -> UnifiedRecord {
        let parts: Vec<String> = [&entry.first_name, &entry.second_name, &entry.third_name]
            .into_iter()
            .filter_map(|part| clean_text(first_text(part)))
            .collect();

        let full_name = if parts.is_empty() {
            UNKNOWN.to_string()
        } else {
            parts.join(" ")
        };

        UnifiedRecord::new(Some(full_name), source)
            .with_alias(entry.alias())
            .with_nationality(UnEntry::first_value(&entry.nationality, UNKNOWN))
            .with_designation(UnEntry::first_value(&entry.designation, "individual"))
            .with_sanction_type(entry.sanction_type())
    }

    fn entity(entry: &UnEntry, source: &str) -> UnifiedRecord {
        let name = clean_text(first_text(&entry.first_name)).unwrap_or_else(|| UNKNOWN.to_string());

        UnifiedRecord::new(Some(name), source)
            .with_alias(entry.alias())
            .with_nationality(UnEntry::first_value(&entry.nationality, UNKNOWN))
            .with_designation(Some("entity".to_string()))
            .with_sanction_type(entry.sanction_type())
    }
}

impl Default for UnParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SanctionsParser for UnParser {
    fn parse(&self, input: &str, source: &str) -> Result<Vec<UnifiedRecord>> {
        let list: ConsolidatedList = from_xml(input, SourceKind::Un)?;

        let individuals: Vec<UnEntry> = list.individuals.into_iter().flat_map(|i| i.items).collect();
        let entities: Vec<UnEntry> = list.entities.into_iter().flat_map(|e| e.items).collect();

        let mut records = Vec::with_capacity(individuals.len() + entities.len());
        records.extend(individuals.iter().map(|e| Self::individual(e, source)));
        records.extend(entities.iter().map(|e| Self::entity(e, source)));

        info!(
            "UN: {} individuals, {} entities",
            individuals.len(),
            entities.len()
        );
        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Un
    }
}
