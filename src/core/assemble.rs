use crate::domain::model::{AssembledReport, NamedAggregate, RenderFailure};
use crate::domain::ports::Renderer;
use crate::utils::error::{RenderError, ReportError, Result};

/// Render every aggregate in order.
///
/// A failure for one aggregate is recorded and the rest still render. An unavailable
/// renderer aborts the whole call.
pub fn assemble<R: Renderer>(aggregates: &[NamedAggregate], renderer: &R) -> Result<AssembledReport> {
    let mut report = AssembledReport::default();

    for aggregate in aggregates.iter().filter(|a| !a.is_empty()) {
        match renderer.render(aggregate) {
            Ok(artifact) => {
                tracing::info!("Saved graph: {}", artifact);
                report.artifacts.push(artifact);
            }
            Err(RenderError::Unavailable(message)) => {
                tracing::error!("❌ Renderer unavailable while rendering {}: {}", aggregate.name, message);
                return Err(ReportError::RendererUnavailable { message });
            }
            Err(err) => {
                tracing::error!("Error generating {}: {}", aggregate.name, err);
                report.failures.push(RenderFailure {
                    aggregate: aggregate.name.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    if report.artifacts.is_empty() {
        tracing::warn!("No graphs were generated due to lack of data");
    } else {
        tracing::info!(
            "Generated {} visualizations: {:?}",
            report.artifacts.len(),
            report.artifacts
        );
    }
    Ok(report)
}
