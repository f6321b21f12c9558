// gzsurvey-core/src/tasks/backfill.rs

use tracing::{info, warn};
use gzsurvey_common::models::store::store_for_prefix;
use gzsurvey_common::traits::SurveyResponseRepository;
use crate::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillReport {
    pub updated: usize,
    pub skipped: usize,
}

/// Fills missing `brand`/`branch` on survey rows from their receipt prefix.
///
/// Only null columns are written. Rows with an unknown prefix are skipped.
pub async fn run_brand_branch_backfill(
    repo: &dyn SurveyResponseRepository,
) -> Result<BackfillReport, Error> {
    let rows = repo.list_missing_brand_branch().await?;
    info!("Found {} responses with missing brand/branch", rows.len());

    let mut report = BackfillReport::default();
    for row in rows {
        let prefix = row.receipt.get(..4).unwrap_or_default();
        let Some(store) = store_for_prefix(prefix) else {
            warn!("Skipping {}: unknown prefix '{}' on receipt '{}'", row.id, prefix, row.receipt);
            report.skipped += 1;
            continue;
        };

        let brand = row.brand.is_none().then_some(store.brand);
        let branch = row.branch.is_none().then_some(store.branch);
        if brand.is_none() && branch.is_none() {
            continue;
        }

        if repo.fill_brand_branch(row.id, brand, branch).await? {
            info!("Updated {}: {} -> {} / {}", row.id, store.prefix, store.brand, store.branch);
            report.updated += 1;
        }
    }

    info!("Backfill done: {} updated, {} skipped", report.updated, report.skipped);
    Ok(report)
}
