// Sanctions ETL - Core Library
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod parsers;
pub mod pipeline;
pub mod record;
pub mod writer;

// Re-export commonly used types
pub use config::{load_manifest, AppConfig, DatabaseConfig, SourceEntry};
pub use db::{
    check_connection, get_load_events, insert_load_event, open_connection, setup_database,
    table_count, LoadEvent, Table,
};
pub use error::EtlError;
pub use loader::{
    dispatch, parse_age, upsert_batch, BatchAudit, CanadaResolver, ChildTable, CommonResolver,
    EntityResolver, InterpolResolver, LoadReport, Loader, SkipReason,
};
pub use parsers::{
    get_parser, parse_source, InputFormat, SanctionsParser, SourceFamily, SourceKind,
};
pub use pipeline::{Pipeline, RunReport, SourceOutcome, SourceStatus};
pub use record::{CanadaRecord, InterpolRecord, ParsedBatch, UnifiedRecord};
pub use writer::{read_batch, read_records, staged_file_name, write_batch, write_records};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
