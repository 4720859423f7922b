use crate::core::aggregate::aggregate;
use crate::core::assemble::assemble;
use crate::core::menu::build_lookup;
use crate::core::normalize::normalize;
use crate::domain::model::{RawRecord, ReportOutcome};
use crate::domain::ports::{RecordSource, Renderer};
use crate::utils::error::Result;
use std::time::Instant;

/// Run the whole analytics pipeline over one snapshot of menu and order records.
///
/// Pure apart from the renderer: every intermediate structure is local to the call.
pub fn generate_report<R: Renderer>(
    menu: &[RawRecord],
    orders: &[RawRecord],
    renderer: &R,
) -> Result<ReportOutcome> {
    tracing::info!(
        "Fetched {} orders and {} menu items",
        orders.len(),
        menu.len()
    );
    if orders.is_empty() || menu.is_empty() {
        tracing::info!("No data to generate visualizations");
        return Ok(ReportOutcome::default());
    }

    let started = Instant::now();
    let (lookup, menu_stats) = build_lookup(menu);
    let (observations, normalize_stats) = normalize(orders, &lookup);
    tracing::debug!("Normalization took {:?}", started.elapsed());

    let started = Instant::now();
    let aggregates = aggregate(&observations);
    tracing::debug!(
        "Computed {} aggregates in {:?}",
        aggregates.len(),
        started.elapsed()
    );

    let started = Instant::now();
    let assembled = assemble(&aggregates, renderer)?;
    tracing::debug!("Rendering took {:?}", started.elapsed());

    Ok(ReportOutcome {
        artifacts: assembled.artifacts,
        failures: assembled.failures,
        menu_stats,
        normalize_stats,
        aggregates_computed: aggregates.len(),
        bundle: None,
    })
}

pub struct ReportEngine<S: RecordSource, R: Renderer> {
    source: S,
    renderer: R,
}

impl<S: RecordSource, R: Renderer> ReportEngine<S, R> {
    pub fn new(source: S, renderer: R) -> Self {
        Self { source, renderer }
    }

    pub async fn run(&self) -> Result<ReportOutcome> {
        tracing::info!("Starting report generation");

        // 來源讀取失敗屬於致命錯誤，直接往上傳
        tracing::info!("Fetching menu and orders...");
        let menu = self.source.fetch_menu().await?;
        let orders = self.source.fetch_orders().await?;

        let outcome = generate_report(&menu, &orders, &self.renderer)?;
        if outcome.is_empty() {
            tracing::info!("No visualizations available yet");
        } else {
            tracing::info!(
                "Report ready: {} artifacts, {} render failures",
                outcome.artifacts.len(),
                outcome.failures.len()
            );
        }
        Ok(outcome)
    }
}
