use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use bogo_core::{LocationToken, OfferRecord};
use serde::{Deserialize, Serialize};

use super::{map_scraper_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct AddressRequest {
    #[serde(default)]
    address: String,
}

impl AddressRequest {
    fn trimmed(&self) -> &str {
        self.address.trim()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BogoStores {
    bogo_stores: Vec<OfferRecord>,
}

pub(super) async fn locate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let address = request.trimmed();
    if address.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "address must not be empty",
        ));
    }

    let token: LocationToken = bogo_scraper::resolve_location(state.upstream.as_ref(), address)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse {
            data: token,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn bogo_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AddressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let address = request.trimmed();
    let bogo_stores = if address.is_empty() {
        Vec::new()
    } else {
        bogo_scraper::find_bogo_offers(state.upstream.as_ref(), address, &state.pipeline)
            .await
            .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?
    };

    Ok((
        StatusCode::OK,
        Json(ApiResponse {
            data: BogoStores { bogo_stores },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
