//! End-to-end BOGO discovery: resolve → walk → bounded fetch → extract.
//!
//! Only the sequential steps (location resolution and listing pages) can
//! fail a run. Per-storefront fetch failures, closed storefronts, malformed
//! documents and unusable items are logged and dropped, so callers get either
//! an error or a possibly empty list of offers.

use std::collections::HashSet;
use std::time::Duration;

use bogo_core::{AppConfig, LocationToken, OfferRecord, StorefrontId};
use futures::stream::TryStreamExt;

use crate::error::ScraperError;
use crate::extract::extract_offers;
use crate::fetch_pool::{FetchOutcome, FetchPool, FetchResult, DEFAULT_MAX_CONCURRENT_FETCHES};
use crate::listing::walk_storefronts;
use crate::location::resolve_location;
use crate::upstream::Upstream;

/// Per-run pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub max_concurrent_fetches: usize,
    /// Bound on the whole run, listing walk and storefront fetches included.
    pub run_timeout: Duration,
    pub max_listing_pages: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            run_timeout: Duration::from_secs(120),
            max_listing_pages: 200,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_fetches: config.max_concurrent_fetches,
            run_timeout: Duration::from_secs(config.run_timeout_secs),
            max_listing_pages: config.max_listing_pages,
        }
    }
}

/// Per-run counters, logged when a run completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub storefronts: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub malformed: usize,
    pub skipped_items: usize,
    pub records: usize,
}

/// Finds every storefront near `address` with at least one BOGO item.
///
/// # Errors
///
/// - [`ScraperError::LocationNotFound`] when the address matches nothing.
/// - [`ScraperError::Timeout`] when the run exceeds `config.run_timeout`;
///   in-flight fetches are abandoned and no partial result is returned.
/// - Any upstream error from location resolution or a listing page.
pub async fn find_bogo_offers<U: Upstream>(
    upstream: &U,
    address: &str,
    config: &PipelineConfig,
) -> Result<Vec<OfferRecord>, ScraperError> {
    let run = async {
        let location = resolve_location(upstream, address).await?;
        discover_offers(upstream, &location, config).await
    };

    tokio::time::timeout(config.run_timeout, run)
        .await
        .map_err(|_| ScraperError::Timeout {
            secs: config.run_timeout.as_secs(),
        })?
}

/// Runs the walk, fetch and extract stages for an already resolved location.
///
/// # Errors
///
/// Returns the first listing-page error; storefront-level failures are
/// absorbed.
pub async fn discover_offers<U: Upstream>(
    upstream: &U,
    location: &LocationToken,
    config: &PipelineConfig,
) -> Result<Vec<OfferRecord>, ScraperError> {
    let ids = collect_storefront_ids(upstream, location, config.max_listing_pages).await?;
    tracing::info!(
        place_id = %location.place_id,
        storefronts = ids.len(),
        "storefront listing complete"
    );

    let pool = FetchPool::new(config.max_concurrent_fetches);
    let fetched = pool.fetch_all(upstream, location, ids).await;

    let (records, summary) = collect_offers(fetched);
    tracing::info!(
        place_id = %location.place_id,
        storefronts = summary.storefronts,
        records = summary.records,
        unavailable = summary.unavailable,
        failed = summary.failed,
        malformed = summary.malformed,
        skipped_items = summary.skipped_items,
        "bogo discovery run complete"
    );
    Ok(records)
}

/// Drains the listing walk. A storefront listed on more than one page is
/// kept once, at its first position.
async fn collect_storefront_ids<U: Upstream>(
    upstream: &U,
    location: &LocationToken,
    max_pages: usize,
) -> Result<Vec<StorefrontId>, ScraperError> {
    let mut seen = HashSet::new();
    walk_storefronts(upstream, location, max_pages)
        .try_filter(|id| {
            let first = seen.insert(id.clone());
            if !first {
                tracing::debug!(storefront = %id, "storefront listed twice; ignoring repeat");
            }
            futures::future::ready(first)
        })
        .try_collect()
        .await
}

fn collect_offers(fetched: Vec<FetchResult>) -> (Vec<OfferRecord>, RunSummary) {
    let mut summary = RunSummary {
        storefronts: fetched.len(),
        ..RunSummary::default()
    };
    let mut records = Vec::new();

    for (id, outcome) in fetched {
        let data = match outcome {
            Ok(FetchOutcome::Catalog(data)) => data,
            Ok(FetchOutcome::Unavailable { .. }) => {
                summary.unavailable += 1;
                continue;
            }
            Err(ScraperError::MalformedDocument { .. }) => {
                summary.malformed += 1;
                continue;
            }
            Err(_) => {
                summary.failed += 1;
                continue;
            }
        };

        match extract_offers(&id, &data) {
            Ok(extraction) => {
                for skip in &extraction.skipped {
                    tracing::warn!(
                        storefront = %skip.storefront,
                        section = %skip.section_key,
                        item_index = skip.item_index,
                        reason = %skip.reason,
                        "skipped malformed promotion item"
                    );
                }
                summary.skipped_items += extraction.skipped.len();
                records.extend(extraction.record);
            }
            Err(e) => {
                tracing::warn!(storefront = %id, error = %e, "skipping malformed storefront");
                summary.malformed += 1;
            }
        }
    }

    summary.records = records.len();
    (records, summary)
}
