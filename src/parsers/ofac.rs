// 🇺🇸 OFAC SDN list parser (classic sdnList/sdnEntry schema)

use super::{first_text, from_xml, SanctionsParser, SourceKind, XmlText};
use crate::normalize::{join_list, non_empty, or_unknown, UNKNOWN};
use crate::record::UnifiedRecord;
use anyhow::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SdnList {
    sdn_entry: Vec<SdnEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SdnEntry {
    first_name: Vec<XmlText>,
    last_name: Vec<XmlText>,
    sdn_type: Vec<XmlText>,
    program_list: Vec<ProgramList>,
    aka_list: Vec<AkaList>,
    nationality_list: Vec<NationalityList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProgramList {
    program: Vec<XmlText>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AkaList {
    aka: Vec<Aka>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Aka {
    last_name: Vec<XmlText>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NationalityList {
    nationality: Vec<Nationality>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Nationality {
    country: Vec<XmlText>,
}

impl SdnEntry {
    fn programs(&self) -> Option<String> {
        let programs = self
            .program_list
            .iter()
            .flat_map(|p| p.program.iter())
            .filter_map(XmlText::as_str);
        join_list(programs)
    }

    /// "first last", else the program list, else "Unknown".
    fn name(&self) -> String {
        let first = first_text(&self.first_name).unwrap_or("");
        let last = first_text(&self.last_name).unwrap_or("");
        let full = format!("{} {}", first.trim(), last.trim()).trim().to_string();

        if !full.is_empty() {
            return full;
        }
        self.programs().unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Last name of the first aka that has one.
    fn alias(&self) -> Option<String> {
        self.aka_list
            .iter()
            .flat_map(|l| l.aka.iter())
            .find_map(|a| non_empty(first_text(&a.last_name)))
    }

    fn nationality(&self) -> Option<String> {
        self.nationality_list
            .iter()
            .flat_map(|l| l.nationality.iter())
            .find_map(|n| first_text(&n.country))
            .and_then(|c| non_empty(Some(c)))
    }
}

/// OFAC Parser
pub struct OfacParser;

impl OfacParser {
    pub fn new() -> Self {
        OfacParser
    }
}

impl Default for OfacParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SanctionsParser for OfacParser {
    fn parse(&self, input: &str, source: &str) -> Result<Vec<UnifiedRecord>> {
        let list: SdnList = from_xml(input, SourceKind::Ofac)?;

        let records: Vec<UnifiedRecord> = list
            .sdn_entry
            .iter()
            .map(|entry| {
                UnifiedRecord::new(Some(entry.name()), source)
                    .with_alias(entry.alias())
                    .with_nationality(or_unknown(entry.nationality()))
                    .with_designation(or_unknown(non_empty(first_text(&entry.sdn_type))))
                    .with_sanction_type(or_unknown(entry.programs()))
            })
            .collect();

        info!("OFAC: {} SDN entries parsed", records.len());
        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Ofac
    }
}
