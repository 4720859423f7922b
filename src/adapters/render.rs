use crate::core::{ArtifactRef, NamedAggregate, Renderer};
use crate::utils::error::RenderError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Csv,
}

impl ArtifactFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Some(ArtifactFormat::Json),
            "csv" => Some(ArtifactFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => "json",
            ArtifactFormat::Csv => "csv",
        }
    }
}

/// Writes `<output_dir>/<aggregate name>.<ext>` for every configured format.
///
/// The returned reference is the file name of the first format, relative to the
/// output directory.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    output_dir: PathBuf,
    formats: Vec<ArtifactFormat>,
}

impl FileRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, formats: Vec<ArtifactFormat>) -> Self {
        let formats = if formats.is_empty() {
            vec![ArtifactFormat::Json]
        } else {
            formats
        };
        Self {
            output_dir: output_dir.into(),
            formats,
        }
    }

    /// Unknown format names are ignored with a warning.
    pub fn from_format_names(output_dir: impl Into<PathBuf>, names: &[String]) -> Self {
        let formats = names
            .iter()
            .filter_map(|name| {
                let format = ArtifactFormat::parse(name);
                if format.is_none() {
                    tracing::warn!("Ignoring unsupported artifact format: {}", name);
                }
                format
            })
            .collect();
        Self::new(output_dir, formats)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn formats(&self) -> &[ArtifactFormat] {
        &self.formats
    }

    fn write_json(&self, path: &Path, aggregate: &NamedAggregate) -> Result<(), String> {
        let body = serde_json::to_vec_pretty(aggregate).map_err(|e| e.to_string())?;
        fs::write(path, body).map_err(|e| e.to_string())
    }

    fn write_csv(&self, path: &Path, aggregate: &NamedAggregate) -> Result<(), String> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| e.to_string())?;
        writer
            .write_record(["label", "value"])
            .map_err(|e| e.to_string())?;
        for point in &aggregate.series {
            writer
                .write_record([point.label.as_str(), point.value.to_string().as_str()])
                .map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())
    }
}

impl Renderer for FileRenderer {
    fn render(&self, aggregate: &NamedAggregate) -> Result<ArtifactRef, RenderError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            RenderError::Unavailable(format!(
                "cannot create output directory {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let mut first = None;
        for format in &self.formats {
            let file_name = format!("{}.{}", aggregate.name, format.extension());
            let path = self.output_dir.join(&file_name);
            let written = match format {
                ArtifactFormat::Json => self.write_json(&path, aggregate),
                ArtifactFormat::Csv => self.write_csv(&path, aggregate),
            };
            written.map_err(|message| RenderError::Aggregate {
                aggregate: aggregate.name.clone(),
                message,
            })?;
            tracing::debug!("Wrote {}", path.display());
            first.get_or_insert(file_name);
        }

        first.ok_or_else(|| RenderError::Unavailable("no artifact formats configured".to_string()))
    }
}
