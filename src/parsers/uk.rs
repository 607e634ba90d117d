// 🇬🇧 UK Sanctions List parser
//
// Nationality comes from address countries. A designation without any
// address country is dropped from the output, unlike the feeds that default
// to "Unknown".

use super::{first_text, from_xml, SanctionsParser, SourceKind, XmlText};
use crate::normalize::{is_placeholder, join_list, non_empty};
use crate::record::UnifiedRecord;
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

const PRIMARY_NAME: &str = "Primary Name";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Designations {
    designation: Vec<Designation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Designation {
    #[serde(rename = "UniqueID")]
    unique_id: Vec<XmlText>,
    names: Vec<Names>,
    addresses: Vec<Addresses>,
    regime_name: Vec<XmlText>,
    sanctions_imposed: Vec<XmlText>,
    positions: Vec<Positions>,
    individual_details: Vec<IndividualDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Names {
    name: Vec<NameEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct NameEntry {
    name6: Vec<XmlText>,
    name_type: Vec<XmlText>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Addresses {
    address: Vec<Address>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Address {
    address_country: Vec<XmlText>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Positions {
    position: Vec<XmlText>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct IndividualDetails {
    individual: Vec<Individual>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Individual {
    positions: Vec<Positions>,
}

impl Designation {
    /// (primary name, aliases). The first non-blank "Primary Name" wins;
    /// without one, the first valid alias is promoted.
    fn names(&self) -> (Option<String>, Vec<String>) {
        let mut primary = None;
        let mut aliases = Vec::new();

        let entries = self.names.iter().flat_map(|n| n.name.iter());
        for entry in entries {
            let Some(text) = non_empty(first_text(&entry.name6)) else {
                continue;
            };
            let is_primary = first_text(&entry.name_type).map(str::trim) == Some(PRIMARY_NAME);

            if is_primary && primary.is_none() {
                primary = Some(text);
            } else if !is_placeholder(&text) {
                aliases.push(text);
            }
        }

        if primary.is_none() && !aliases.is_empty() {
            primary = Some(aliases.remove(0));
        }

        (primary, aliases)
    }

    /// Sorted, distinct address countries.
    fn countries(&self) -> BTreeSet<String> {
        self.addresses
            .iter()
            .flat_map(|a| a.address.iter())
            .filter_map(|a| non_empty(first_text(&a.address_country)))
            .collect()
    }

    fn position(&self) -> Option<String> {
        let nested = self
            .individual_details
            .iter()
            .flat_map(|d| d.individual.iter())
            .flat_map(|i| i.positions.iter());

        self.positions
            .iter()
            .chain(nested)
            .flat_map(|p| p.position.iter())
            .next()
            .and_then(|p| non_empty(p.as_str()))
    }

    /// Regime name when it names a regulation, else the imposed sanctions.
    fn sanction_type(&self) -> Option<String> {
        let regime = non_empty(first_text(&self.regime_name));
        if let Some(regime) = regime.filter(|r| r.contains("Regulations")) {
            return Some(regime);
        }

        let imposed = first_text(&self.sanctions_imposed).unwrap_or("");
        join_list(imposed.split('|'))
    }
}

/// UK Parser
pub struct UkParser;

impl UkParser {
    pub fn new() -> Self {
        UkParser
    }
}

impl Default for UkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SanctionsParser for UkParser {
    fn parse(&self, input: &str, source: &str) -> Result<Vec<UnifiedRecord>> {
        let doc: Designations = from_xml(input, SourceKind::Uk)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for designation in &doc.designation {
            let countries = designation.countries();
            if countries.is_empty() {
                debug!(
                    "UK: no address country for {}, skipping",
                    first_text(&designation.unique_id).unwrap_or("<no id>")
                );
                skipped += 1;
                continue;
            }

            let (name, aliases) = designation.names();

            records.push(
                UnifiedRecord::new(name, source)
                    .with_alias(join_list(&aliases))
                    .with_nationality(join_list(&countries))
                    .with_designation(designation.position())
                    .with_sanction_type(designation.sanction_type()),
            );
        }

        info!(
            "UK: {} designations parsed, {} skipped without nationality",
            records.len(),
            skipped
        );
        Ok(records)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Uk
    }
}
