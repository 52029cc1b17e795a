use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A storefront advertising at least one buy-X-get-Y item, together with the
/// storefront metadata a client needs to render it.
///
/// Serialized with the upstream's camelCase keys so the JSON handed to
/// callers lines up with what the storefront document carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRecord {
    pub title: String,
    /// Hero image descriptors, passed through as the upstream shaped them.
    pub hero_image_urls: Value,
    pub location: Value,
    pub eta_range: Value,
    pub rating: Value,
    pub categories: Value,
    /// Never empty: a storefront with no qualifying items has no record.
    pub bogo_foods: Vec<BogoItem>,
}

impl OfferRecord {
    /// Returns the number of qualifying promotional items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.bogo_foods.len()
    }
}

/// One catalog item carrying a buy-X-get-Y promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BogoItem {
    pub title: String,
    /// Price in the upstream's minor currency unit (cents for USD).
    pub price: i64,
    /// Display tagline shown next to the price, e.g. `{"text": "$12.99"}`.
    pub price_tagline: Value,
    /// Promotion terms exactly as the upstream described them.
    pub buy_x_get_y_item_promotion: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
}
