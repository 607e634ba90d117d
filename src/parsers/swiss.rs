// 🇨🇭 Swiss SECO sanctions list parser
//
// The document structs here are shared with sdn.rs: both feeds publish the
// sanctions-program / sanctions-set / target layout.

use super::{first_text, from_xml, SanctionsParser, SourceKind, XmlText};
use crate::normalize::{join_list, non_empty};
use crate::record::UnifiedRecord;
use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

const PRIMARY_NAME: &str = "primary-name";

// ============================================================================
// SHARED DOCUMENT LAYOUT
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SanctionsDocument {
    #[serde(rename = "sanctions-program", default)]
    pub programs: Vec<SanctionsProgram>,
    #[serde(rename = "target", default)]
    pub targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SanctionsProgram {
    #[serde(rename = "sanctions-set", default)]
    pub sets: Vec<SanctionsSet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SanctionsSet {
    #[serde(rename = "@ssid")]
    pub ssid: Option<String>,
    #[serde(rename = "@lang")]
    pub lang: Option<String>,
    #[serde(rename = "$text")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Target {
    #[serde(rename = "sanctions-set-id", default)]
    pub set_ids: Vec<XmlText>,
    #[serde(default)]
    pub individual: Vec<Individual>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Individual {
    #[serde(rename = "identity", default)]
    pub identities: Vec<Identity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Identity {
    #[serde(rename = "@main")]
    pub main: Option<String>,
    #[serde(rename = "name", default)]
    pub names: Vec<Name>,
    #[serde(rename = "nationality", default)]
    pub nationalities: Vec<NationalityEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Name {
    #[serde(rename = "@name-type")]
    pub name_type: Option<String>,
    #[serde(rename = "name-part", default)]
    pub parts: Vec<NamePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamePart {
    #[serde(default)]
    pub value: Vec<XmlText>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NationalityEntry {
    #[serde(rename = "country", default)]
    pub countries: Vec<Country>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Country {
    #[serde(rename = "$text")]
    pub text: Option<String>,
}

impl Name {
    fn is_primary(&self) -> bool {
        self.name_type.as_deref() == Some(PRIMARY_NAME)
    }

    /// Value of the first name-part only.
    fn first_value(&self) -> Option<String> {
        self.parts.first().and_then(|p| non_empty(first_text(&p.value)))
    }
}

// ============================================================================
// SWISS PARSER
// ============================================================================

/// Swiss Parser
pub struct SwissParser;

impl SwissParser {
    pub fn new() -> Self {
        SwissParser
    }

    /// ssid → set description. English wins; otherwise the last entry seen.
    fn set_descriptions(doc: &SanctionsDocument) -> HashMap<String, String> {
        let mut descriptions = HashMap::new();
        let sets: Vec<&SanctionsSet> = doc.programs.iter().flat_map(|p| p.sets.iter()).collect();

        for set in sets.iter().filter(|s| s.lang.as_deref() != Some("eng")) {
            if let Some(ssid) = &set.ssid {
                descriptions.insert(ssid.clone(), set.text.as_deref().unwrap_or("").trim().to_string());
            }
        }
        for set in sets.iter().filter(|s| s.lang.as_deref() == Some("eng")) {
            if let Some(ssid) = &set.ssid {
                descriptions.insert(ssid.clone(), set.text.as_deref().unwrap_or("").trim().to_string());
            }
        }

        descriptions
    }

    /// First referenced set's description, cut at its first comma.
    fn designation(target: &Target, descriptions: &HashMap<String, String>) -> Option<String> {
        target
            .set_ids
            .iter()
            .filter_map(XmlText::as_str)
            .find_map(|id| descriptions.get(id.trim()))
            .and_then(|d| non_empty(d.split(',').next()))
    }

    fn record(target: &Target, descriptions: &HashMap<String, String>, source: &str) -> UnifiedRecord {
        let mut name = None;
        let mut aliases = Vec::new();
        let mut nationalities = Vec::new();

        let identity = target
            .individual
            .first()
            .and_then(|i| i.identities.iter().find(|id| id.main.as_deref() == Some("true")));

        if let Some(identity) = identity {
            name = identity
                .names
                .iter()
                .find(|n| n.is_primary())
                .and_then(Name::first_value);

            aliases.extend(
                identity
                    .names
                    .iter()
                    .filter(|n| !n.is_primary())
                    .filter_map(Name::first_value),
            );

            nationalities.extend(
                identity
                    .nationalities
                    .iter()
                    .flat_map(|n| n.countries.iter())
                    .filter_map(|c| non_empty(c.text.as_deref())),
            );
        }

        UnifiedRecord::new(name, source)
            .with_alias(join_list(&aliases))
            .with_nationality(join_list(&nationalities))
            .with_designation(Self::designation(target, descriptions))
            .with_sanction_type(Some("Individual".to_string()))
    }
}

impl Default for SwissParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SanctionsParser for SwissParser {
    fn parse(&self, input: &str, source: &str) -> Result<Vec<UnifiedRecord>> {
        let doc: SanctionsDocument = from_xml(input, SourceKind::Swiss)?;
        let descriptions = Self::set_descriptions(&doc);

        let records: Vec<UnifiedRecord> = doc
            .targets
            .iter()
            .map(|t| Self::record(t, &descriptions, source))
            .collect();

        info!("Swiss: {} targets parsed", records.len());
        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Swiss
    }
}
