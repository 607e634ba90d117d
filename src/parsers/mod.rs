// 🏗️ Parser Framework
// One parser per sanctions authority, all producing the unified record shape.
//
// Adding a source means adding a SourceKind variant; every routing point is
// an exhaustive match, so a missing parser or loader is a compile error.

pub mod australia;
pub mod canada;
pub mod europe;
pub mod interpol;
pub mod ofac;
pub mod sdn;
pub mod swiss;
pub mod uk;
pub mod un;

pub use australia::AustraliaParser;
pub use canada::parse_canada;
pub use europe::EuropeParser;
pub use interpol::parse_interpol;
pub use ofac::OfacParser;
pub use sdn::SdnParser;
pub use swiss::SwissParser;
pub use uk::UkParser;
pub use un::UnParser;

use crate::error::EtlError;
use crate::record::{ParsedBatch, UnifiedRecord};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// SOURCE KIND
// ============================================================================

/// SourceKind - Which authority/feed a manifest entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Un,
    Uk,
    Ofac,
    Sdn,
    Swiss,
    Australia,
    Europe,
    Canada,
    Interpol,
}

/// Group of feeds sharing one loader's identity-key shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFamily {
    /// (name, source) entities with alias/nationality/sanction-type children
    Common,
    /// (name, nationalities, date_of_listing), no children
    Canada,
    /// (name, age) with nationality children
    Interpol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Xml,
    Csv,
}

impl SourceKind {
    pub const ALL: [SourceKind; 9] = [
        SourceKind::Un,
        SourceKind::Uk,
        SourceKind::Ofac,
        SourceKind::Sdn,
        SourceKind::Swiss,
        SourceKind::Australia,
        SourceKind::Europe,
        SourceKind::Canada,
        SourceKind::Interpol,
    ];

    /// Manifest key
    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::Un => "un",
            SourceKind::Uk => "uk",
            SourceKind::Ofac => "ofac",
            SourceKind::Sdn => "sdn",
            SourceKind::Swiss => "swiss",
            SourceKind::Australia => "aus",
            SourceKind::Europe => "eur",
            SourceKind::Canada => "can",
            SourceKind::Interpol => "interpol",
        }
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Un => "UN Security Council",
            SourceKind::Uk => "UK Sanctions List",
            SourceKind::Ofac => "US OFAC",
            SourceKind::Sdn => "US OFAC SDN",
            SourceKind::Swiss => "Switzerland SECO",
            SourceKind::Australia => "Australia DFAT",
            SourceKind::Europe => "European Union",
            SourceKind::Canada => "Canada",
            SourceKind::Interpol => "Interpol Red Notices",
        }
    }

    pub fn family(&self) -> SourceFamily {
        match self {
            SourceKind::Un
            | SourceKind::Uk
            | SourceKind::Ofac
            | SourceKind::Sdn
            | SourceKind::Swiss
            | SourceKind::Australia
            | SourceKind::Europe => SourceFamily::Common,
            SourceKind::Canada => SourceFamily::Canada,
            SourceKind::Interpol => SourceFamily::Interpol,
        }
    }

    pub fn input_format(&self) -> InputFormat {
        match self {
            SourceKind::Australia | SourceKind::Interpol => InputFormat::Csv,
            _ => InputFormat::Xml,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceKind {
    type Err = EtlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| EtlError::UnknownSource(s.to_string()))
    }
}

impl InputFormat {
    /// Format by file extension; anything but .xml / .csv is unsupported.
    pub fn from_path(path: &Path) -> std::result::Result<Self, EtlError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xml" => Ok(InputFormat::Xml),
            "csv" => Ok(InputFormat::Csv),
            _ => Err(EtlError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                format!(".{}", ext)
            })),
        }
    }
}

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// SanctionsParser - Core trait for the common-family feeds
///
/// Record-level problems are defaulted or skipped inside `parse`; an `Err`
/// means the whole document was unusable.
pub trait SanctionsParser: Send + Sync {
    /// Parse one feed snapshot.
    ///
    /// # Arguments
    /// * `input` - XML document text for XML feeds, file path for CSV feeds
    /// * `source` - label stamped on every record's `source` field
    fn parse(&self, input: &str, source: &str) -> Result<Vec<UnifiedRecord>>;

    /// Which source this parser handles
    fn kind(&self) -> SourceKind;
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Parser for a common-family source; Canada and Interpol have their own
/// record shapes and dedicated functions.
pub fn get_parser(kind: SourceKind) -> Option<Box<dyn SanctionsParser>> {
    match kind {
        SourceKind::Un => Some(Box::new(UnParser::new())),
        SourceKind::Uk => Some(Box::new(UkParser::new())),
        SourceKind::Ofac => Some(Box::new(OfacParser::new())),
        SourceKind::Sdn => Some(Box::new(SdnParser::new())),
        SourceKind::Swiss => Some(Box::new(SwissParser::new())),
        SourceKind::Australia => Some(Box::new(AustraliaParser::new())),
        SourceKind::Europe => Some(Box::new(EuropeParser::new())),
        SourceKind::Canada | SourceKind::Interpol => None,
    }
}

/// Parse any source into its family's batch type.
pub fn parse_source(kind: SourceKind, input: &str, source: &str) -> Result<ParsedBatch> {
    match kind.family() {
        SourceFamily::Canada => Ok(ParsedBatch::Canada(parse_canada(input, source)?)),
        SourceFamily::Interpol => Ok(ParsedBatch::Interpol(parse_interpol(Path::new(input))?)),
        SourceFamily::Common => {
            let parser = get_parser(kind).ok_or_else(|| EtlError::UnknownSource(kind.to_string()))?;
            let records = parser.parse(input, source)?;
            Ok(ParsedBatch::Common { kind, records })
        }
    }
}

// ============================================================================
// XML HELPERS
// ============================================================================

/// Text content of one element.
///
/// Feed elements are collected as `Vec<XmlText>` even when the schema says
/// they occur once: a repeated element then keeps its first value, and stray
/// markup inside the text is ignored instead of failing the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct XmlText {
    #[serde(rename = "$text")]
    pub text: Option<String>,
}

impl XmlText {
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Text of the first occurrence of an element, if any.
pub(crate) fn first_text(nodes: &[XmlText]) -> Option<&str> {
    nodes.first().and_then(XmlText::as_str)
}

/// Deserialize a feed document, tagging failures with the feed they came from.
pub(crate) fn from_xml<T: DeserializeOwned>(xml: &str, kind: SourceKind) -> Result<T> {
    quick_xml::de::from_str(xml)
        .map_err(EtlError::from)
        .with_context(|| format!("Failed to parse {} XML ({} bytes)", kind.name(), xml.len()))
}
