//! Batch feature backfill
//!
//! Computes features for catalog items that have none persisted and writes
//! them back through [`CatalogAccess::persist_features`]. Items are processed
//! in small batches with a pause in between so the image source is not
//! flooded.

use crate::catalog::CatalogAccess;
use crate::pipeline::FeaturePipeline;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use vismatch_core::{CatalogItem, EngineConfig, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    /// Items that lacked persisted features
    pub processed: usize,
    /// Vectors written back to the catalog
    pub persisted: usize,
    /// Items whose image could not be measured; nothing is persisted for them
    pub fallbacks: usize,
    /// Persist calls that returned an error
    pub failed: usize,
}

pub async fn backfill_features(
    catalog: &dyn CatalogAccess,
    pipeline: &FeaturePipeline,
    config: &EngineConfig,
) -> Result<BackfillReport> {
    config.validate()?;

    let pending: Vec<CatalogItem> = catalog
        .list_items(None)
        .await?
        .into_iter()
        .filter(|item| item.persisted_features().is_none())
        .collect();

    let mut report = BackfillReport::default();
    let batches = pending.chunks(config.batch_size).count();
    info!(items = pending.len(), batches, "starting feature backfill");

    for (index, batch) in pending.chunks(config.batch_size).enumerate() {
        if index > 0 && !config.batch_pause.is_zero() {
            tokio::time::sleep(config.batch_pause).await;
        }

        let extractions = join_all(batch.iter().map(|item| pipeline.extract(&item.image_url))).await;

        for (item, extraction) in batch.iter().zip(extractions) {
            report.processed += 1;
            if extraction.is_fallback() {
                report.fallbacks += 1;
                continue;
            }
            match catalog.persist_features(&item.id, &extraction.features).await {
                Ok(()) => report.persisted += 1,
                Err(e) => {
                    warn!(id = %item.id, error = %e, "failed to persist features");
                    report.failed += 1;
                }
            }
        }
    }

    info!(
        processed = report.processed,
        persisted = report.persisted,
        fallbacks = report.fallbacks,
        failed = report.failed,
        "feature backfill finished"
    );
    Ok(report)
}
