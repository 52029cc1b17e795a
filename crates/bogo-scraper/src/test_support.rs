//! In-memory [`Upstream`] double for unit tests.
//!
//! Pages and storefront responses are registered as raw JSON so fixtures
//! read like upstream payloads. Anything not registered answers with an
//! HTTP 500-style [`ScraperError::UnexpectedStatus`]. Calls are recorded,
//! and storefront fetches track peak concurrency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bogo_core::{LocationToken, StorefrontId};
use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::types::{ListingPage, LocationCandidate, StorefrontResponse};
use crate::upstream::Upstream;

#[derive(Default)]
pub(crate) struct FakeUpstream {
    candidates: Option<Value>,
    delivery_location: Option<Value>,
    pages: HashMap<u64, Value>,
    storefronts: HashMap<String, Value>,
    fetch_delay: Duration,
    page_requests: Mutex<Vec<u64>>,
    delivery_lookups: Mutex<Vec<String>>,
    storefront_requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeUpstream {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_candidates(mut self, candidates: Value) -> Self {
        self.candidates = Some(candidates);
        self
    }

    pub(crate) fn with_delivery_location(mut self, location: Value) -> Self {
        self.delivery_location = Some(location);
        self
    }

    pub(crate) fn with_page(mut self, offset: u64, page: Value) -> Self {
        self.pages.insert(offset, page);
        self
    }

    /// Registers the full `getStoreV1` response (envelope included).
    pub(crate) fn with_storefront(mut self, id: &str, response: Value) -> Self {
        self.storefronts.insert(id.to_owned(), response);
        self
    }

    pub(crate) fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub(crate) fn page_requests(&self) -> Vec<u64> {
        self.page_requests.lock().unwrap().clone()
    }

    pub(crate) fn delivery_lookups(&self) -> Vec<String> {
        self.delivery_lookups.lock().unwrap().clone()
    }

    pub(crate) fn storefront_requests(&self) -> Vec<String> {
        let mut requests = self.storefront_requests.lock().unwrap().clone();
        requests.sort();
        requests
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

fn server_error(what: &str) -> ScraperError {
    ScraperError::UnexpectedStatus {
        status: 500,
        url: format!("fake://{what}"),
    }
}

impl Upstream for FakeUpstream {
    async fn search_location(&self, _query: &str) -> Result<Vec<LocationCandidate>, ScraperError> {
        let candidates = self
            .candidates
            .clone()
            .ok_or_else(|| server_error("mapsSearchV1"))?;
        Ok(serde_json::from_value(candidates).unwrap())
    }

    async fn delivery_location(&self, place_id: &str) -> Result<Value, ScraperError> {
        self.delivery_lookups
            .lock()
            .unwrap()
            .push(place_id.to_owned());
        self.delivery_location
            .clone()
            .ok_or_else(|| server_error("getDeliveryLocationV1"))
    }

    async fn list_storefronts(
        &self,
        _location: &LocationToken,
        offset: u64,
    ) -> Result<ListingPage, ScraperError> {
        self.page_requests.lock().unwrap().push(offset);
        let page = self
            .pages
            .get(&offset)
            .cloned()
            .ok_or_else(|| server_error("allStoresV1"))?;
        Ok(serde_json::from_value(page).unwrap())
    }

    async fn get_storefront(
        &self,
        _location: &LocationToken,
        storefront: &StorefrontId,
    ) -> Result<StorefrontResponse, ScraperError> {
        self.storefront_requests
            .lock()
            .unwrap()
            .push(storefront.as_str().to_owned());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.fetch_delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = self
            .storefronts
            .get(storefront.as_str())
            .cloned()
            .ok_or_else(|| server_error("getStoreV1"))?;
        Ok(serde_json::from_value(response).unwrap())
    }
}

pub(crate) fn test_location() -> LocationToken {
    LocationToken {
        place_id: "place-1".to_owned(),
        location: json!({"latitude": 42.38, "longitude": -71.23}),
    }
}

/// A feed entry for storefront `id`; `offers` sets `offerTypeCount`.
pub(crate) fn feed_store(id: &str, offers: Option<i64>) -> Value {
    let store_payload = match offers {
        Some(count) => json!({"offerMetadata": {"offerTypeCount": count}}),
        None => json!({}),
    };
    json!({
        "uuid": id,
        "type": "REGULAR_STORE",
        "store": {"tracking": {"storePayload": store_payload}}
    })
}

/// A promotion-bearing catalog item.
pub(crate) fn bogo_item(title: &str, price: i64) -> Value {
    json!({
        "title": title,
        "price": price,
        "priceTagline": {"text": format!("${}.{:02}", price / 100, price % 100)},
        "itemPromotion": {"buyXGetYItemPromotion": {"buyQuantity": 1, "getQuantity": 1}}
    })
}

/// A catalog item with no promotion node.
pub(crate) fn plain_item(title: &str, price: i64) -> Value {
    json!({"title": title, "price": price, "priceTagline": {"text": "$1.00"}})
}

/// A section carrying a titled standard-items group.
pub(crate) fn items_section(title: &str, items: Vec<Value>) -> Value {
    json!({
        "type": "HORIZONTAL_GRID",
        "payload": {"standardItemsPayload": {"title": {"text": title}, "catalogItems": items}}
    })
}

/// A successful `getStoreV1` response with the mandatory metadata and the
/// given `catalogSectionsMap`.
pub(crate) fn storefront_response(title: &str, sections: Value) -> Value {
    json!({
        "status": "success",
        "data": storefront_data(title, sections)
    })
}

pub(crate) fn storefront_data(title: &str, sections: Value) -> Value {
    json!({
        "title": title,
        "heroImageUrls": [{"url": "https://img.example.com/hero.jpg", "width": 550}],
        "location": {"address": "10 Main St", "latitude": 42.38, "longitude": -71.23},
        "etaRange": {"text": "20-35 min"},
        "rating": {"ratingValue": 4.6, "reviewCount": "500+"},
        "categories": ["Burgers", "American"],
        "catalogSectionsMap": sections
    })
}
