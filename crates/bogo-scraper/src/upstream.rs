//! The four upstream exchanges the discovery pipeline depends on.
//!
//! [`crate::EatsClient`] is the production implementation. Pipeline stages
//! are generic over this trait so they can be driven by an in-memory double.

use std::future::Future;

use bogo_core::{LocationToken, StorefrontId};
use serde_json::Value;

use crate::error::ScraperError;
use crate::types::{ListingPage, LocationCandidate, StorefrontResponse};

pub trait Upstream: Sync {
    /// Ranked location candidates for a free-text address.
    fn search_location(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<LocationCandidate>, ScraperError>> + Send;

    /// The delivery-location descriptor for a place id.
    fn delivery_location(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<Value, ScraperError>> + Send;

    /// One page of the storefront feed starting at `offset`.
    fn list_storefronts(
        &self,
        location: &LocationToken,
        offset: u64,
    ) -> impl Future<Output = Result<ListingPage, ScraperError>> + Send;

    /// The full storefront document. A payload-level failure status is
    /// returned as `Ok` so the caller can classify it.
    fn get_storefront(
        &self,
        location: &LocationToken,
        storefront: &StorefrontId,
    ) -> impl Future<Output = Result<StorefrontResponse, ScraperError>> + Send;
}
