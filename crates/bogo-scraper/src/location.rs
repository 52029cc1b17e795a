//! Address → [`LocationToken`] resolution.

use bogo_core::LocationToken;

use crate::error::ScraperError;
use crate::upstream::Upstream;

/// Resolves a free-text address into the location token used by every
/// later request of the same run.
///
/// The first ranked search candidate is taken as-is; there is no
/// disambiguation step.
///
/// # Errors
///
/// - [`ScraperError::LocationNotFound`] when the search returns no candidates.
/// - [`ScraperError::UnexpectedPayload`] when the top candidate has no place id.
/// - Any transport, status, or payload error from either upstream call.
pub async fn resolve_location<U: Upstream>(
    upstream: &U,
    address: &str,
) -> Result<LocationToken, ScraperError> {
    let candidates = upstream.search_location(address).await?;
    let Some(top) = candidates.into_iter().next() else {
        tracing::info!(address, "location search returned no candidates");
        return Err(ScraperError::LocationNotFound {
            query: address.to_owned(),
        });
    };

    let place_id = top
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ScraperError::UnexpectedPayload {
            context: "location search".to_owned(),
            reason: "top candidate has no place id".to_owned(),
        })?;

    let location = upstream.delivery_location(&place_id).await?;
    tracing::debug!(address, place_id, "resolved delivery location");

    Ok(LocationToken { place_id, location })
}
