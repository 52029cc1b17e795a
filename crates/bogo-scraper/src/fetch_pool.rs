//! Concurrency-capped storefront fetching.
//!
//! A [`FetchPool`] owns its own admission semaphore, so two discovery runs in
//! the same process never compete for each other's slots. Every storefront
//! future is created up front; each waits for a permit (first come, first
//! served), holds it only for the duration of its upstream request, and
//! releases it whether the request succeeded or not.

use bogo_core::{LocationToken, StorefrontId};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::error::ScraperError;
use crate::types::StorefrontData;
use crate::upstream::Upstream;

/// Default number of storefront fetches allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 10;

/// What a successful storefront exchange produced.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The storefront document, ready for extraction.
    Catalog(StorefrontData),
    /// The upstream answered with a non-`"success"` payload status (a closed
    /// storefront, for instance). Not an error: there is simply nothing to
    /// extract.
    Unavailable { status: String },
}

pub type FetchResult = (StorefrontId, Result<FetchOutcome, ScraperError>);

/// Admission-controlled fan-out of storefront fetches for one run.
pub struct FetchPool {
    admission: Semaphore,
    limit: usize,
}

impl FetchPool {
    /// Creates a pool admitting at most `limit` concurrent fetches. A limit
    /// of zero is treated as one.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            admission: Semaphore::new(limit),
            limit,
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Fetches every storefront in `ids`, returning exactly one result per id
    /// in completion order.
    ///
    /// Failures stay with their own id; they never cancel or delay the other
    /// fetches.
    pub async fn fetch_all<U: Upstream>(
        &self,
        upstream: &U,
        location: &LocationToken,
        ids: Vec<StorefrontId>,
    ) -> Vec<FetchResult> {
        let mut pending: FuturesUnordered<_> = ids
            .into_iter()
            .map(|id| async move {
                let outcome = self.fetch_one(upstream, location, &id).await;
                (id, outcome)
            })
            .collect();

        let mut results = Vec::with_capacity(pending.len());
        while let Some((id, outcome)) = pending.next().await {
            match &outcome {
                Ok(FetchOutcome::Unavailable { status }) => {
                    tracing::debug!(storefront = %id, status, "storefront unavailable");
                }
                Err(e) => {
                    tracing::warn!(storefront = %id, error = %e, "storefront fetch failed");
                }
                Ok(FetchOutcome::Catalog(_)) => {}
            }
            results.push((id, outcome));
        }
        results
    }

    async fn fetch_one<U: Upstream>(
        &self,
        upstream: &U,
        location: &LocationToken,
        id: &StorefrontId,
    ) -> Result<FetchOutcome, ScraperError> {
        let response = {
            let _permit = self
                .admission
                .acquire()
                .await
                .map_err(|_| ScraperError::AdmissionClosed)?;
            upstream.get_storefront(location, id).await?
        };

        if response.is_failure() {
            return Ok(FetchOutcome::Unavailable {
                status: response.status_or_unknown().to_owned(),
            });
        }

        response
            .data
            .map(FetchOutcome::Catalog)
            .ok_or_else(|| ScraperError::MalformedDocument {
                storefront_id: id.to_string(),
                field: "data",
            })
    }
}

impl Default for FetchPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_FETCHES)
    }
}
