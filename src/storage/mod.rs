// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::models::{CarrierOutput, HtmlSegment};
use crate::utils::error::StorageError;

/// Writes run output and debug segments under one base directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    base_dir: PathBuf,
}

impl OutputWriter {
    /// Creates a new OutputWriter with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves the run output as pretty JSON named after the current local time.
    pub fn save_output(&self, outputs: &[CarrierOutput]) -> Result<PathBuf, StorageError> {
        let filename = format!("{}.json", chrono::Local::now().format("%Y-%m-%dT%H%M%S"));
        let file_path = self.base_dir.join(filename);

        let json = serde_json::to_string_pretty(outputs)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, json)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved {} carrier outputs to {}", outputs.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves a loaded segment for debugging
    pub fn save_segment(&self, segment: &HtmlSegment) -> Result<PathBuf, StorageError> {
        // Create a directory structure like: /base_dir/debug/carrier/section/
        let target_dir = self.base_dir
            .join("debug")
            .join(segment.carrier.as_str())
            .join(segment.section.as_str());

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)
                .map_err(StorageError::IoError)?;
        }

        let file_path = target_dir.join(format!("page_{}.html", segment.page));
        fs::write(&file_path, segment.html.as_bytes())
            .map_err(StorageError::IoError)?;

        tracing::debug!("Saved segment to {}", file_path.display());

        Ok(file_path)
    }
}
