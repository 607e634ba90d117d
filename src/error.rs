// Error taxonomy for the sanctions pipeline
//
// Malformed records never reach this type: parsers default or skip them.
// What is left are failures that cost a whole source (format, unknown key,
// missing input) or a whole batch (connection, transaction).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    /// Manifest key with no parser/loader behind it
    #[error("No parser registered for source key: {0}")]
    UnknownSource(String),

    /// Input file extension is neither .xml nor .csv
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing or invalid input path: {0}")]
    MissingInput(String),

    /// Database unreachable; the load is aborted before any insert
    #[error("Database connection failed: {0}")]
    Connection(#[source] rusqlite::Error),

    /// A statement failed mid-batch; the whole batch was rolled back
    #[error("Batch rolled back: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EtlError {
    /// The source was never attempted: its key, path or format is wrong.
    /// Everything else is a failure of an attempted source.
    pub fn skips_source(&self) -> bool {
        matches!(
            self,
            EtlError::MissingInput(_) | EtlError::UnsupportedFormat(_) | EtlError::UnknownSource(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_source_classification() {
        assert!(EtlError::MissingInput("data/un.xml".into()).skips_source());
        assert!(EtlError::UnsupportedFormat(".xlsx".into()).skips_source());
        assert!(EtlError::UnknownSource("oafc".into()).skips_source());

        assert!(!EtlError::Connection(rusqlite::Error::InvalidQuery).skips_source());
        assert!(!EtlError::Transaction(rusqlite::Error::InvalidQuery).skips_source());
        assert!(!EtlError::Config("bad".into()).skips_source());
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
