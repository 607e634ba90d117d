// 🇺🇸 OFAC SDN parser for the sanctions-program / target schema
//
// Shares its document layout with the Swiss feed (see swiss.rs); only
// <target> nodes that carry an <individual> are emitted.

use super::swiss::{SanctionsDocument, Target};
use super::{first_text, from_xml, SanctionsParser, SourceKind, XmlText};
use crate::normalize::{join_list, non_empty, UNKNOWN};
use crate::record::UnifiedRecord;
use anyhow::Result;
use std::collections::HashMap;
use tracing::info;

/// OFAC SDN (sanctions-set format) Parser
pub struct SdnParser;

impl SdnParser {
    pub fn new() -> Self {
        SdnParser
    }

    /// ssid → English description
    fn english_sets(doc: &SanctionsDocument) -> HashMap<String, String> {
        doc.programs
            .iter()
            .flat_map(|p| p.sets.iter())
            .filter(|s| s.lang.as_deref() == Some("eng"))
            .filter_map(|s| Some((s.ssid.clone()?, s.text.as_deref()?.trim().to_string())))
            .collect()
    }

    fn record(target: &Target, sets: &HashMap<String, String>, source: &str) -> Option<UnifiedRecord> {
        let individual = target.individual.first()?;

        let sanction_types = target
            .set_ids
            .iter()
            .filter_map(XmlText::as_str)
            .map(|sid| sets.get(sid.trim()).cloned().unwrap_or_else(|| sid.to_string()));
        let sanction_type = join_list(sanction_types).unwrap_or_else(|| UNKNOWN.to_string());

        let identity = individual.identities.first();

        let name = identity
            .and_then(|i| i.names.first())
            .and_then(|n| n.parts.first())
            .and_then(|p| non_empty(first_text(&p.value)))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let nationality = identity
            .and_then(|i| i.nationalities.first())
            .and_then(|n| n.countries.first())
            .and_then(|c| non_empty(c.text.as_deref()))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Some(
            UnifiedRecord::new(Some(name), source)
                .with_nationality(Some(nationality))
                .with_designation(Some("individual".to_string()))
                .with_sanction_type(Some(sanction_type)),
        )
    }
}

impl Default for SdnParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SanctionsParser for SdnParser {
    fn parse(&self, input: &str, source: &str) -> Result<Vec<UnifiedRecord>> {
        let doc: SanctionsDocument = from_xml(input, SourceKind::Sdn)?;
        let sets = Self::english_sets(&doc);

        let records: Vec<UnifiedRecord> = doc
            .targets
            .iter()
            .filter_map(|t| Self::record(t, &sets, source))
            .collect();

        info!(
            "SDN: {} individuals out of {} targets",
            records.len(),
            doc.targets.len()
        );
        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Sdn
    }
}
