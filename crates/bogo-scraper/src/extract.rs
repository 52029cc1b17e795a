//! Buy-X-get-Y offer extraction from a storefront document.
//!
//! The walk is shallow and forgiving:
//!
//! 1. The six metadata fields (`title`, `heroImageUrls`, `location`,
//!    `etaRange`, `rating`, `categories`) must be present; otherwise the
//!    document is malformed and the storefront is skipped by the caller.
//! 2. Each `catalogSectionsMap` list is scanned in upstream order for the
//!    first section whose standard-items title is a promotional label.
//!    Later sections in that list are not looked at, even if they are
//!    promotional too.
//! 3. Within that group, only items with an
//!    `itemPromotion.buyXGetYItemPromotion` node are candidates. A candidate
//!    missing its title, price, or price tagline is reported as a
//!    [`SkippedItem`] instead of failing the document.
//!
//! Extraction is a pure function of the document.

use bogo_core::{BogoItem, OfferRecord, StorefrontId};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ScraperError;
use crate::types::{buy_x_get_y_promotion, standard_items_group, CatalogItem, StorefrontData};

/// Section titles that mark a promotional item group. Matched exactly.
pub const PROMOTIONAL_GROUP_TITLES: [&str; 2] = ["Buy 1, Get 1 Free", "Offers"];

/// A promotion-bearing item that could not be turned into a [`BogoItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub storefront: StorefrontId,
    pub section_key: String,
    /// Position of the item inside its promotional group.
    pub item_index: usize,
    pub reason: String,
}

/// Result of extracting one storefront document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    /// `None` when the storefront has no qualifying items.
    pub record: Option<OfferRecord>,
    pub skipped: Vec<SkippedItem>,
}

/// Extracts the storefront's BOGO offers.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedDocument`] naming the first missing
/// metadata field. Missing or oddly shaped catalog content is never an error.
pub fn extract_offers(
    storefront: &StorefrontId,
    data: &StorefrontData,
) -> Result<Extraction, ScraperError> {
    let required = |value: Option<&Value>, field: &'static str| {
        value.cloned().ok_or_else(|| ScraperError::MalformedDocument {
            storefront_id: storefront.to_string(),
            field,
        })
    };

    let title = data
        .title
        .clone()
        .ok_or_else(|| ScraperError::MalformedDocument {
            storefront_id: storefront.to_string(),
            field: "title",
        })?;
    let hero_image_urls = required(data.hero_image_urls.as_ref(), "heroImageUrls")?;
    let location = required(data.location.as_ref(), "location")?;
    let eta_range = required(data.eta_range.as_ref(), "etaRange")?;
    let rating = required(data.rating.as_ref(), "rating")?;
    let categories = required(data.categories.as_ref(), "categories")?;

    let mut bogo_foods = Vec::new();
    let mut skipped = Vec::new();

    for (section_key, sections) in data.section_lists() {
        let Some(items) = first_promotional_group(sections) else {
            continue;
        };

        for (item_index, item) in items.iter().enumerate() {
            let Some(promotion) = buy_x_get_y_promotion(item) else {
                continue;
            };
            match bogo_item(item, promotion) {
                Ok(bogo) => bogo_foods.push(bogo),
                Err(reason) => skipped.push(SkippedItem {
                    storefront: storefront.clone(),
                    section_key: section_key.to_owned(),
                    item_index,
                    reason,
                }),
            }
        }
    }

    let record = (!bogo_foods.is_empty()).then(|| OfferRecord {
        title,
        hero_image_urls,
        location,
        eta_range,
        rating,
        categories,
        bogo_foods,
    });

    Ok(Extraction { record, skipped })
}

/// Items of the first section in `sections` titled with a promotional label.
fn first_promotional_group(sections: &[Value]) -> Option<&[Value]> {
    sections
        .iter()
        .filter_map(standard_items_group)
        .find(|(title, _)| PROMOTIONAL_GROUP_TITLES.contains(title))
        .map(|(_, items)| items)
}

fn bogo_item(item: &Value, promotion: &Value) -> Result<BogoItem, String> {
    let parsed = CatalogItem::deserialize(item).map_err(|e| e.to_string())?;
    let missing = |field: &str| format!("missing `{field}`");

    Ok(BogoItem {
        title: parsed.title.ok_or_else(|| missing("title"))?,
        price: parsed.price.ok_or_else(|| missing("price"))?,
        price_tagline: parsed.price_tagline.ok_or_else(|| missing("priceTagline"))?,
        buy_x_get_y_item_promotion: promotion.clone(),
        item_description: parsed.item_description,
    })
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
