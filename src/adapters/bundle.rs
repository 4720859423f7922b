use crate::adapters::render::ArtifactFormat;
use crate::core::{ArtifactRef, Storage};
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// Packs every rendered file (all formats) into one zip archive.
///
/// `storage` must be rooted at the renderer's output directory.
pub struct ArtifactBundler<S: Storage> {
    storage: S,
    filename: String,
    formats: Vec<ArtifactFormat>,
}

impl<S: Storage> ArtifactBundler<S> {
    pub fn new(storage: S, filename: impl Into<String>, formats: Vec<ArtifactFormat>) -> Self {
        Self {
            storage,
            filename: filename.into(),
            formats,
        }
    }

    /// File names written for one artifact, one per format.
    fn companion_files(&self, artifact: &str) -> Vec<String> {
        let stem = Path::new(artifact)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(artifact);
        let mut files: Vec<String> = self
            .formats
            .iter()
            .map(|f| format!("{}.{}", stem, f.extension()))
            .collect();
        if !files.iter().any(|f| f == artifact) {
            files.insert(0, artifact.to_string());
        }
        files
    }

    /// Returns the archive name, or `None` when there is nothing to bundle.
    pub async fn bundle(&self, artifacts: &[ArtifactRef]) -> Result<Option<String>> {
        if artifacts.is_empty() {
            tracing::debug!("No artifacts, skipping bundle");
            return Ok(None);
        }

        let mut entries = Vec::new();
        for artifact in artifacts {
            for file in self.companion_files(artifact) {
                let data = self.storage.read_file(&file).await?;
                entries.push((file, data));
            }
        }

        tracing::debug!("Creating ZIP file with {} files", entries.len());
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &entries {
                zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                zip.write_all(data)?;
            }
            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&self.filename, &zip_data).await?;
        Ok(Some(self.filename.clone()))
    }
}
