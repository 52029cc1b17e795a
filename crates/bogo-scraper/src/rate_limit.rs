//! Retry with exponential backoff for transient upstream failures.
//!
//! Throttling (429) and network failures are retried. Every other error,
//! HTTP error statuses included, is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` is worth another attempt after a backoff delay.
fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RateLimited { .. } | ScraperError::Http(_)
    )
}

/// Executes `operation`, retrying transient errors up to `max_retries` times.
///
/// The sleep before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds. With `max_retries = 2` the operation runs at most 3 times. The
/// last error is returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient upstream error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited() -> ScraperError {
        ScraperError::RateLimited {
            endpoint: "getStoreV1".to_owned(),
            retry_after_secs: 0,
        }
    }

    async fn count_attempts<T>(
        max_retries: u32,
        mut make_result: impl FnMut(u32) -> Result<T, ScraperError>,
    ) -> (Result<T, ScraperError>, u32) {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(max_retries, 0, || {
            let n = cc.fetch_add(1, Ordering::SeqCst);
            let outcome = make_result(n);
            async move { outcome }
        })
        .await;
        (result, call_count.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let (result, calls) = count_attempts(3, |_| Ok::<u32, ScraperError>(42)).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let (result, calls) = count_attempts(3, |n| {
            if n < 2 {
                Err(rate_limited())
            } else {
                Ok(99)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn does_not_retry_server_errors() {
        let (result, calls) = count_attempts(3, |n| {
            if n == 0 {
                Err(ScraperError::UnexpectedStatus {
                    status: 502,
                    url: "https://example.com".to_owned(),
                })
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 502, .. })
        ));
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let (result, calls) = count_attempts(2, |_| Err::<u32, _>(rate_limited())).await;
        assert_eq!(calls, 3);
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let (result, calls) = count_attempts(3, |_| {
            Err::<u32, _>(ScraperError::UnexpectedStatus {
                status: 403,
                url: "https://example.com".to_owned(),
            })
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_payload_status() {
        let (result, calls) = count_attempts(3, |_| {
            Err::<u32, _>(ScraperError::ApiStatus {
                endpoint: "allStoresV1".to_owned(),
                status: "failure".to_owned(),
            })
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(ScraperError::ApiStatus { .. })));
    }
}
