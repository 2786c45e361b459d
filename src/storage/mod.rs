// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::extractors::section::InsightsRecord;
use crate::pdf::DocumentText;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves the record as `<stem>_insights.json`
    pub fn save_insights(
        &self,
        source: &Path,
        record: &InsightsRecord,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_insights.json", file_stem(source)));

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved insights to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves run metadata as `<stem>_meta.json`
    pub fn save_metadata(
        &self,
        source: &Path,
        document: &DocumentText,
        record: &InsightsRecord,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", file_stem(source)));

        let sections_found: Vec<&str> =
            record.present_keys().into_iter().map(|k| k.as_str()).collect();
        let metadata = serde_json::json!({
            "source_path": source.display().to_string(),
            "page_count": document.page_count,
            "character_count": document.text.chars().count(),
            "sections_found": sections_found,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

fn file_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
