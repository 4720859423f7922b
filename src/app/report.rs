use crate::adapters::{ArtifactBundler, ConfiguredSource, FileRenderer};
use crate::config::cli::LocalStorage;
use crate::core::engine::ReportEngine;
use crate::core::{ConfigProvider, ReportOutcome};
use crate::utils::error::Result;

/// Build the source and renderer described by `config` and run one report.
pub async fn run_report<C: ConfigProvider>(config: &C) -> Result<ReportOutcome> {
    let storage = LocalStorage::new(config.data_dir().to_string());
    let source = ConfiguredSource::from_config(config, storage)?;
    let renderer = FileRenderer::from_format_names(config.output_path(), config.output_formats());
    let formats = renderer.formats().to_vec();

    let engine = ReportEngine::new(source, renderer);
    let mut outcome = engine.run().await?;

    if let Some(filename) = config.bundle_filename() {
        let bundler = ArtifactBundler::new(
            LocalStorage::new(config.output_path().to_string()),
            filename,
            formats,
        );
        outcome.bundle = bundler.bundle(&outcome.artifacts).await?;
        if let Some(bundle) = &outcome.bundle {
            tracing::info!("📦 Bundled artifacts into {}", bundle);
        }
    }

    Ok(outcome)
}
