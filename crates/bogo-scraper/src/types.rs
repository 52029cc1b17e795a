//! Upstream response shapes for the storefront service's `_p/api` endpoints.
//!
//! Every field is optional. The upstream schema drifts without notice, so
//! parsing never fails on a missing or `null` field; code that needs a value
//! navigates with the accessor methods below and treats `None` as "no data".
//! The only structurally required field is the listing page `meta` block,
//! without which pagination cannot continue.
//!
//! ## Observed envelope
//! Every endpoint wraps its payload as `{"status": "success", "data": ...}`.
//! A `status` other than `"success"` is how the service reports legitimate
//! empty states such as a closed storefront, so it is surfaced to callers
//! rather than turned into a transport error here.
//!
//! ## Catalog sections
//! `catalogSectionsMap` maps opaque section UUIDs to lists of sections. Key
//! order is kept as received (`serde_json` is built with `preserve_order`),
//! and each list stays raw JSON so one oddly shaped section cannot make the
//! whole storefront unparseable.

use bogo_core::StorefrontId;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// The `{"status", "data"}` wrapper shared by all endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// `true` when the payload carries an explicit non-`"success"` status.
    ///
    /// A missing status is not a failure; several endpoints omit it.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s != "success")
    }

    #[must_use]
    pub fn status_or_unknown(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }
}

/// One ranked result from the location search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCandidate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
}

/// One page of the storefront feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub feed_items: Vec<FeedItem>,
    pub meta: PageMeta,
}

/// Continuation state for the storefront feed.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Cursor to send with the next page request.
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl PageMeta {
    /// A missing or `null` flag means the feed is exhausted.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more.unwrap_or(false)
    }
}

/// Summary entry in the storefront feed, kept as raw JSON. Non-store entries
/// (banners, carousels) have no string `uuid` and are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct FeedItem(Value);

impl FeedItem {
    #[must_use]
    pub fn storefront_id(&self) -> Option<StorefrontId> {
        self.0
            .get("uuid")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(StorefrontId::new)
    }

    /// `store.tracking.storePayload.offerMetadata.offerTypeCount`, if present.
    #[must_use]
    pub fn offer_type_count(&self) -> Option<&Value> {
        self.0
            .get("store")?
            .get("tracking")?
            .get("storePayload")?
            .get("offerMetadata")?
            .get("offerTypeCount")
    }

    /// The offer-filter predicate: the storefront summary declares a
    /// non-zero count of active offers.
    #[must_use]
    pub fn has_active_offer(&self) -> bool {
        self.offer_type_count().is_some_and(is_nonzero_count)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_nonzero_count(count: &Value) -> bool {
    match count {
        Value::Number(n) => n
            .as_i64()
            .map_or_else(|| n.as_f64().is_some_and(|f| f.abs() > f64::EPSILON), |c| c != 0),
        Value::String(s) => s.trim().parse::<i64>().is_ok_and(|c| c != 0),
        _ => false,
    }
}

/// Full storefront document from `getStoreV1`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub hero_image_urls: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub eta_range: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub categories: Option<Value>,
    #[serde(default)]
    pub catalog_sections_map: Option<Map<String, Value>>,
}

pub type StorefrontResponse = Envelope<StorefrontData>;

impl StorefrontData {
    /// Iterates `(section key, section list)` pairs in upstream order,
    /// skipping keys whose value is not a list.
    pub fn section_lists(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.catalog_sections_map
            .iter()
            .flat_map(Map::iter)
            .filter_map(|(key, value)| value.as_array().map(|list| (key.as_str(), list.as_slice())))
    }
}

/// Returns the title text and items of a section's standard-items payload,
/// or `None` when the section is some other kind of section.
#[must_use]
pub fn standard_items_group(section: &Value) -> Option<(&str, &[Value])> {
    let payload = section.get("payload")?.get("standardItemsPayload")?;
    let title = payload.get("title")?.get("text")?.as_str()?;
    let items = payload
        .get("catalogItems")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    Some((title, items))
}

/// A catalog item as the upstream describes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub price_tagline: Option<Value>,
    #[serde(default)]
    pub item_description: Option<String>,
}

/// `itemPromotion.buyXGetYItemPromotion` of a raw catalog item, if the key
/// exists (its value may be anything, including `null`).
#[must_use]
pub fn buy_x_get_y_promotion(item: &Value) -> Option<&Value> {
    item.get("itemPromotion")?.get("buyXGetYItemPromotion")
}
