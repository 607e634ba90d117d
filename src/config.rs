// Configuration for the sanctions ETL
//
// Built once at startup from the environment (plus .env) and passed down by
// reference; nothing reads the environment after that.

use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_DB_NAME: &str = "sanction_db";
const DEFAULT_DB_DIR: &str = ".";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_MANIFEST: &str = "config/sources.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub name: String,
    pub dir: PathBuf,
}

impl DatabaseConfig {
    pub fn new(name: &str, dir: impl AsRef<Path>) -> Self {
        Self {
            name: name.to_string(),
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// `{dir}/{name}.db`
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.db", self.name))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub output_dir: PathBuf,
    pub manifest: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let db_name = var("DB_NAME", DEFAULT_DB_NAME);
        if db_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(EtlError::Config(format!(
                "DB_NAME must be a bare name, got {:?}",
                db_name
            )));
        }

        Ok(AppConfig {
            database: DatabaseConfig::new(&db_name, var("DB_DIR", DEFAULT_DB_DIR)),
            output_dir: PathBuf::from(var("ETL_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            manifest: PathBuf::from(var("ETL_MANIFEST", DEFAULT_MANIFEST)),
        })
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = manifest.into();
        self
    }
}

// ============================================================================
// SOURCE MANIFEST
// ============================================================================

/// One manifest entry: which parser, the label used for the staged file
/// name and the `source` column, and the raw input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub parser: String,
    pub sanction_type: String,
    pub path: PathBuf,
}

impl SourceEntry {
    pub fn new(parser: &str, sanction_type: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            parser: parser.to_string(),
            sanction_type: sanction_type.to_string(),
            path: path.into(),
        }
    }
}

/// Read a JSON manifest: `[{"parser": "un", "sanction_type": "UN", "path": "data/un.xml"}]`
pub fn load_manifest(path: &Path) -> Result<Vec<SourceEntry>> {
    if !path.exists() {
        return Err(EtlError::Config(format!(
            "Manifest not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let entries: Vec<SourceEntry> = serde_json::from_str(&content)?;

    info!("Loaded {} sources from {}", entries.len(), path.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.database.path(), PathBuf::from("./sanction_db.db"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.manifest, PathBuf::from("config/sources.json"));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let vars: HashMap<&str, &str> = [
            ("DB_NAME", "sanctions_test"),
            ("DB_DIR", "/var/lib/etl"),
            ("ETL_OUTPUT_DIR", "  "),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.database.path(), PathBuf::from("/var/lib/etl/sanctions_test.db"));
        assert_eq!(config.output_dir, PathBuf::from("output"), "blank falls back to default");
    }

    #[test]
    fn test_db_name_with_path_is_rejected() {
        let result = AppConfig::from_lookup(|k| (k == "DB_NAME").then(|| "../evil".to_string()));
        assert!(matches!(result, Err(EtlError::Config(_))));
    }

    #[test]
    fn test_load_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(
            &path,
            r#"[
                {"parser": "un", "sanction_type": "UN", "path": "data/un.xml"},
                {"parser": "aus", "sanction_type": "Australia", "path": "data/aus.csv"}
            ]"#,
        )
        .unwrap();

        let entries = load_manifest(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], SourceEntry::new("aus", "Australia", "data/aus.csv"));

        assert!(matches!(
            load_manifest(&dir.path().join("missing.json")),
            Err(EtlError::Config(_))
        ));
    }
}
