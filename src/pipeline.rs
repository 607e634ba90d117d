// 🚚 Pipeline - manifest-driven extract → stage → load
//
// Every source is processed independently. Per-source problems become a
// status in the run report; only the up-front connectivity gate aborts.

use crate::config::{load_manifest, AppConfig, SourceEntry};
use crate::db::check_connection;
use crate::error::EtlError;
use crate::loader::{BatchAudit, LoadReport, Loader};
use crate::parsers::{parse_source, InputFormat, SourceKind};
use crate::record::ParsedBatch;
use crate::writer::{digest_or_warn, read_batch, read_text, sanitize_label, staged_file_name, write_batch};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SourceStatus {
    Loaded(LoadReport),
    /// Parsed fine, nothing to stage or load
    Empty,
    /// Not attempted: unknown key, missing input, wrong format
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub key: String,
    pub label: String,
    pub status: SourceStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn loaded(&self) -> usize {
        self.count(|s| matches!(s, SourceStatus::Loaded(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, SourceStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, SourceStatus::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&SourceStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

// ============================================================================
// STEPS
// ============================================================================

/// Parse one raw input file. XML feeds are read into memory first; CSV
/// feeds are handed the path.
pub fn extract(kind: SourceKind, path: &Path, label: &str) -> Result<ParsedBatch> {
    if !path.exists() {
        return Err(EtlError::MissingInput(path.display().to_string()).into());
    }

    let format = InputFormat::from_path(path)?;
    if format != kind.input_format() {
        return Err(EtlError::UnsupportedFormat(format!(
            "{} expects {:?} input, got {}",
            kind,
            kind.input_format(),
            path.display()
        ))
        .into());
    }

    info!("🔍 Parsing {} ({})", path.display(), kind.name());
    let batch = match format {
        InputFormat::Xml => {
            let text = read_text(path)?;
            parse_source(kind, &text, label)?
        }
        InputFormat::Csv => {
            let input = path
                .to_str()
                .ok_or_else(|| EtlError::MissingInput(path.display().to_string()))?;
            parse_source(kind, input, label)?
        }
    };

    Ok(batch)
}

/// Write the staged CSV; `None` when the batch was empty and nothing was written.
pub fn stage(batch: &ParsedBatch, label: &str, output_dir: &Path) -> Result<Option<PathBuf>> {
    let staged = output_dir.join(staged_file_name(batch.kind(), label));
    let written = write_batch(&staged, batch)
        .with_context(|| format!("Failed to stage {}", staged.display()))?;

    if written == 0 {
        return Ok(None);
    }
    info!("✅ Staged {} records to {}", written, staged.display());
    Ok(Some(staged))
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline<'a> {
    config: &'a AppConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    /// Run every source in the configured manifest.
    pub fn run_manifest(&self) -> Result<RunReport> {
        let entries = load_manifest(&self.config.manifest)?;
        self.run(&entries)
    }

    pub fn run(&self, entries: &[SourceEntry]) -> Result<RunReport> {
        check_connection(&self.config.database).context("Database connectivity check failed")?;

        let mut report = RunReport::default();
        for entry in entries {
            let outcome = self.run_source(entry);
            match &outcome.status {
                SourceStatus::Loaded(_) | SourceStatus::Empty => {}
                SourceStatus::Skipped(reason) => warn!("⚠️  {} skipped: {}", outcome.key, reason),
                SourceStatus::Failed(reason) => error!("❌ {} failed: {}", outcome.key, reason),
            }
            report.outcomes.push(outcome);
        }

        info!(
            "Run finished: {} loaded, {} skipped, {} failed of {} sources",
            report.loaded(),
            report.skipped(),
            report.failed(),
            report.outcomes.len()
        );
        Ok(report)
    }

    fn run_source(&self, entry: &SourceEntry) -> SourceOutcome {
        let label = sanitize_label(&entry.sanction_type);
        let outcome = |status| SourceOutcome {
            key: entry.parser.clone(),
            label: label.clone(),
            status,
        };

        let kind = match entry.parser.parse::<SourceKind>() {
            Ok(kind) => kind,
            Err(err) => return outcome(SourceStatus::Skipped(err.to_string())),
        };

        match self.process(kind, &entry.path, &label) {
            Ok(status) => outcome(status),
            Err(err) => match err.downcast_ref::<EtlError>() {
                Some(etl) if etl.skips_source() => outcome(SourceStatus::Skipped(err.to_string())),
                _ => outcome(SourceStatus::Failed(format!("{:#}", err))),
            },
        }
    }

    fn process(&self, kind: SourceKind, path: &Path, label: &str) -> Result<SourceStatus> {
        let batch = extract(kind, path, label)?;

        let Some(staged) = stage(&batch, label, &self.config.output_dir)? else {
            info!("No records parsed from {}, nothing to load", path.display());
            return Ok(SourceStatus::Empty);
        };

        let staged_batch = read_batch(kind, &staged)
            .with_context(|| format!("Failed to read back {}", staged.display()))?;

        let audit = BatchAudit {
            kind,
            label: label.to_string(),
            input_sha256: digest_or_warn(path),
        };

        info!("🗃️  Loading {} from {}", kind.name(), staged.display());
        let report = Loader::new(&self.config.database).load_audited(&staged_batch, &audit)?;
        Ok(SourceStatus::Loaded(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> AppConfig {
        AppConfig {
            database: DatabaseConfig::new("pipeline_test", dir.path()),
            output_dir: dir.path().join("output"),
            manifest: dir.path().join("sources.json"),
        }
    }

    #[test]
    fn test_extract_rejects_wrong_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aus.xml");
        fs::write(&path, "<root/>").unwrap();

        let err = extract(SourceKind::Australia, &path, "aus").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_bad_entries_are_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let xlsx = dir.path().join("un.xlsx");
        fs::write(&xlsx, "not xml").unwrap();
        let broken = dir.path().join("uk.xml");
        fs::write(&broken, "<Designations><Designation>").unwrap();

        let entries = vec![
            SourceEntry::new("oafc", "OFAC", dir.path().join("ofac.xml")),
            SourceEntry::new("un", "UN", dir.path().join("missing.xml")),
            SourceEntry::new("un", "UN", &xlsx),
            SourceEntry::new("uk", "UK", &broken),
        ];

        let report = Pipeline::new(&config).run(&entries).unwrap();
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.skipped(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcomes[0].key, "oafc");
    }

    #[test]
    fn test_empty_source_is_not_staged() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let path = dir.path().join("un.xml");
        fs::write(&path, "<CONSOLIDATED_LIST></CONSOLIDATED_LIST>").unwrap();

        let report = Pipeline::new(&config)
            .run(&[SourceEntry::new("un", "UN", &path)])
            .unwrap();

        assert_eq!(report.outcomes[0].status, SourceStatus::Empty);
        assert!(!config.output_dir.join("un_UN_parsed.csv").exists());
    }

    #[test]
    fn test_connectivity_gate_aborts_run() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.database = DatabaseConfig::new("sanction_db", "/nonexistent/dir/for/etl");

        let result = Pipeline::new(&config).run(&[SourceEntry::new("un", "UN", "data/un.xml")]);
        assert!(result.is_err());
        assert!(!config.output_dir.exists(), "nothing is staged when the gate fails");
    }
}
