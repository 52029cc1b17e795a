//! HTTP client for the storefront service's `_p/api` endpoints.

mod cookie;

use std::time::Duration;

use bogo_core::{AppConfig, LocationToken, StorefrontId};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{Envelope, ListingPage, LocationCandidate, StorefrontResponse};
use crate::upstream::Upstream;

pub use cookie::location_cookie;

const MAPS_SEARCH: &str = "mapsSearchV1";
const DELIVERY_LOCATION: &str = "getDeliveryLocationV1";
const ALL_STORES: &str = "allStoresV1";
const GET_STORE: &str = "getStoreV1";

const UPSTREAM_REFERER: &str = "https://www.ubereats.com/";

/// Client for the storefront service.
///
/// Every request is a JSON `POST` with browser-like headers. Location-scoped
/// requests (listing, storefront) carry the [`location_cookie`] of the
/// request's [`LocationToken`].
///
/// Transient errors (429, network failures) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct EatsClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl EatsClient {
    /// Creates a client pointed at the production service.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(
            bogo_core::config::DEFAULT_UPSTREAM_BASE_URL,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_secs,
        )
    }

    /// Creates a client with a custom base URL (a wiremock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::with_base_url(
            &config.upstream_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ScraperError> {
        self.base_url
            .join(&format!("_p/api/{endpoint}"))
            .map_err(|e| ScraperError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Posts `body` to `endpoint` and parses the `{"status", "data"}` envelope.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] on HTTP 429 after retries.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ScraperError::Http`] on network or TLS failure after retries.
    /// - [`ScraperError::Deserialize`] if the body does not match `Envelope<T>`.
    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        body: &Value,
        cookie: Option<&str>,
    ) -> Result<Envelope<T>, ScraperError> {
        let url = self.endpoint_url(endpoint)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let mut request = self
                    .client
                    .post(url.clone())
                    .header(reqwest::header::ACCEPT, "*/*")
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .header(reqwest::header::REFERER, UPSTREAM_REFERER)
                    .header("x-csrf-token", "x")
                    .json(body);

                if let Some(cookie) = cookie {
                    request = request.header(reqwest::header::COOKIE, cookie);
                }

                let response = request.send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        endpoint: endpoint.to_owned(),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let bytes = response.bytes().await?;
                serde_json::from_slice::<Envelope<T>>(&bytes).map_err(|e| {
                    ScraperError::Deserialize {
                        context: format!("{endpoint} response"),
                        source: e,
                    }
                })
            }
        })
        .await
    }
}

fn ensure_success<T>(endpoint: &str, envelope: &Envelope<T>) -> Result<(), ScraperError> {
    if envelope.is_failure() {
        return Err(ScraperError::ApiStatus {
            endpoint: endpoint.to_owned(),
            status: envelope.status_or_unknown().to_owned(),
        });
    }
    Ok(())
}

fn require_data<T>(endpoint: &str, envelope: Envelope<T>) -> Result<T, ScraperError> {
    ensure_success(endpoint, &envelope)?;
    envelope.data.ok_or_else(|| ScraperError::UnexpectedPayload {
        context: endpoint.to_owned(),
        reason: "response has no `data`".to_owned(),
    })
}

impl Upstream for EatsClient {
    async fn search_location(&self, query: &str) -> Result<Vec<LocationCandidate>, ScraperError> {
        let body = json!({ "query": query });
        let envelope = self
            .post::<Vec<LocationCandidate>>(MAPS_SEARCH, &body, None)
            .await?;
        ensure_success(MAPS_SEARCH, &envelope)?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn delivery_location(&self, place_id: &str) -> Result<Value, ScraperError> {
        let body = json!({
            "placeId": place_id,
            "provider": "here_places",
            "source": "manual_auto_complete",
        });
        let envelope = self.post::<Value>(DELIVERY_LOCATION, &body, None).await?;
        require_data(DELIVERY_LOCATION, envelope)
    }

    async fn list_storefronts(
        &self,
        location: &LocationToken,
        offset: u64,
    ) -> Result<ListingPage, ScraperError> {
        let cookie = location_cookie(location);
        let body = json!({
            "date": "",
            "startTime": 0,
            "endTime": 0,
            "surfaceName": "HOME",
            "cacheKey": "",
            "verticalType": "",
            "pageInfo": { "offset": offset, "pageSize": null },
        });
        let envelope = self
            .post::<ListingPage>(ALL_STORES, &body, Some(&cookie))
            .await?;
        require_data(ALL_STORES, envelope)
    }

    async fn get_storefront(
        &self,
        location: &LocationToken,
        storefront: &StorefrontId,
    ) -> Result<StorefrontResponse, ScraperError> {
        let cookie = location_cookie(location);
        let body = json!({
            "storeUuid": storefront.as_str(),
            "diningMode": "DELIVERY",
            "time": { "asap": true },
            "cbType": "EATER_ENDORSED",
        });
        self.post(GET_STORE, &body, Some(&cookie)).await
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
