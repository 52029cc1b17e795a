//! Paginated walk over the storefront feed.
//!
//! Pages are requested strictly one after another: each request carries the
//! cursor the previous page returned, and the walk ends on the first page
//! whose `hasMore` is false. An empty page with `hasMore` set is not the end.

use bogo_core::{LocationToken, StorefrontId};
use futures::stream::{self, Stream, TryStreamExt};

use crate::error::ScraperError;
use crate::types::{FeedItem, ListingPage};
use crate::upstream::Upstream;

#[derive(Debug, Clone, Copy, Default)]
struct WalkState {
    offset: u64,
    pages: usize,
    exhausted: bool,
}

/// Lazily walks the storefront feed for `location`, yielding the id of every
/// storefront whose summary advertises an active offer.
///
/// Nothing is requested until the stream is polled, and a page is only
/// requested once the ids of the previous page have been consumed. Each call
/// starts a fresh walk from cursor zero.
///
/// A failed page request ends the stream with that error; ids from pages not
/// yet delivered are lost. More than `max_pages` page requests ends it with
/// [`ScraperError::PaginationLimit`].
pub fn walk_storefronts<'a, U: Upstream>(
    upstream: &'a U,
    location: &'a LocationToken,
    max_pages: usize,
) -> impl Stream<Item = Result<StorefrontId, ScraperError>> + Send + 'a {
    stream::try_unfold(WalkState::default(), move |state| async move {
        if state.exhausted {
            return Ok(None);
        }
        if state.pages >= max_pages {
            return Err(ScraperError::PaginationLimit { max_pages });
        }

        let page = upstream.list_storefronts(location, state.offset).await?;
        let ids = offer_bearing_ids(&page);
        let next = next_state(state, &page)?;

        tracing::debug!(
            page = next.pages,
            offset = state.offset,
            next_offset = next.offset,
            items = page.feed_items.len(),
            matched = ids.len(),
            has_more = page.meta.has_more(),
            "fetched storefront listing page"
        );

        Ok(Some((ids, next)))
    })
    .map_ok(|ids| stream::iter(ids.into_iter().map(Ok::<_, ScraperError>)))
    .try_flatten()
}

/// Applies the offer-filter predicate to every item on the page, in order.
fn offer_bearing_ids(page: &ListingPage) -> Vec<StorefrontId> {
    page.feed_items
        .iter()
        .filter(|item| item.has_active_offer())
        .filter_map(FeedItem::storefront_id)
        .collect()
}

/// The cursor always comes from the page itself, never from a local
/// increment.
fn next_state(state: WalkState, page: &ListingPage) -> Result<WalkState, ScraperError> {
    let offset = match (page.meta.has_more(), page.meta.offset) {
        (_, Some(offset)) => offset,
        (false, None) => state.offset,
        (true, None) => {
            return Err(ScraperError::UnexpectedPayload {
                context: "storefront listing".to_owned(),
                reason: "page reports more results but no next offset".to_owned(),
            })
        }
    };
    Ok(WalkState {
        offset,
        pages: state.pages + 1,
        exhausted: !page.meta.has_more(),
    })
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::test_support::{feed_store, test_location, FakeUpstream};

    async fn collect_ids(
        upstream: &FakeUpstream,
        max_pages: usize,
    ) -> Result<Vec<String>, ScraperError> {
        let location = test_location();
        walk_storefronts(upstream, &location, max_pages)
            .map_ok(|id| id.as_str().to_owned())
            .try_collect()
            .await
    }

    #[tokio::test]
    async fn two_pages_yield_filtered_ids_in_page_order() {
        let upstream = FakeUpstream::new()
            .with_page(
                0,
                json!({
                    "feedItems": [feed_store("a", Some(2)), feed_store("b", None), feed_store("c", Some(1))],
                    "meta": {"offset": 3, "hasMore": true}
                }),
            )
            .with_page(
                3,
                json!({
                    "feedItems": [feed_store("d", Some(1))],
                    "meta": {"offset": 4, "hasMore": false}
                }),
            );

        let ids = collect_ids(&upstream, 10).await.unwrap();

        assert_eq!(ids, vec!["a", "c", "d"]);
        assert_eq!(upstream.page_requests(), vec![0, 3]);
    }

    #[tokio::test]
    async fn stops_after_first_page_without_more() {
        let upstream = FakeUpstream::new()
            .with_page(
                0,
                json!({"feedItems": [feed_store("a", Some(1))], "meta": {"offset": 1, "hasMore": false}}),
            )
            .with_page(
                1,
                json!({"feedItems": [feed_store("never", Some(1))], "meta": {"offset": 2, "hasMore": false}}),
            );

        let ids = collect_ids(&upstream, 10).await.unwrap();

        assert_eq!(ids, vec!["a"]);
        assert_eq!(upstream.page_requests(), vec![0]);
    }

    #[tokio::test]
    async fn empty_page_with_more_continues_from_returned_cursor() {
        let upstream = FakeUpstream::new()
            .with_page(0, json!({"feedItems": [], "meta": {"offset": 80, "hasMore": true}}))
            .with_page(
                80,
                json!({"feedItems": [feed_store("late", Some(3))], "meta": {"offset": 81, "hasMore": false}}),
            );

        let ids = collect_ids(&upstream, 10).await.unwrap();

        assert_eq!(ids, vec!["late"]);
        assert_eq!(upstream.page_requests(), vec![0, 80]);
    }

    #[tokio::test]
    async fn page_failure_ends_walk_with_error() {
        // offset 5 has no page registered, so the fake answers 500.
        let upstream = FakeUpstream::new().with_page(
            0,
            json!({"feedItems": [feed_store("a", Some(1))], "meta": {"offset": 5, "hasMore": true}}),
        );

        let err = collect_ids(&upstream, 10).await.unwrap_err();

        assert!(matches!(err, ScraperError::UnexpectedStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn ids_before_a_failed_page_are_still_delivered_lazily() {
        let upstream = FakeUpstream::new().with_page(
            0,
            json!({"feedItems": [feed_store("a", Some(1))], "meta": {"offset": 5, "hasMore": true}}),
        );
        let location = test_location();
        let mut walk = Box::pin(walk_storefronts(&upstream, &location, 10));

        let first = walk.next().await.unwrap().unwrap();
        assert_eq!(first.as_str(), "a");
        assert_eq!(upstream.page_requests(), vec![0]);

        assert!(walk.next().await.unwrap().is_err());
        assert!(walk.next().await.is_none());
    }

    #[tokio::test]
    async fn cycling_cursor_hits_pagination_limit() {
        let upstream = FakeUpstream::new().with_page(
            0,
            json!({"feedItems": [], "meta": {"offset": 0, "hasMore": true}}),
        );

        let err = collect_ids(&upstream, 3).await.unwrap_err();

        assert!(matches!(err, ScraperError::PaginationLimit { max_pages: 3 }));
        assert_eq!(upstream.page_requests(), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn more_results_without_cursor_is_rejected() {
        let upstream = FakeUpstream::new()
            .with_page(0, json!({"feedItems": [], "meta": {"hasMore": true}}));

        let err = collect_ids(&upstream, 10).await.unwrap_err();

        assert!(matches!(err, ScraperError::UnexpectedPayload { .. }));
    }

    #[tokio::test]
    async fn odd_listing_shapes_are_skipped_not_fatal() {
        let upstream = FakeUpstream::new()
            .with_page(0, json!({"feedItems": null, "meta": {"offset": 2, "hasMore": true}}))
            .with_page(
                2,
                json!({
                    "feedItems": [
                        {"uuid": 123, "type": "CAROUSEL"},
                        {"uuid": {"banner": true}},
                        feed_store("ok", Some(1))
                    ],
                    "meta": {"offset": 5, "hasMore": null}
                }),
            );

        let ids = collect_ids(&upstream, 10).await.unwrap();

        assert_eq!(ids, vec!["ok"]);
        assert_eq!(upstream.page_requests(), vec![0, 2]);
    }
}
