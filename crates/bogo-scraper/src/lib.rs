pub mod client;
pub mod error;
pub mod extract;
pub mod fetch_pool;
pub mod listing;
pub mod location;
pub mod pipeline;
mod rate_limit;
pub mod types;
pub mod upstream;

#[cfg(test)]
mod test_support;

pub use client::EatsClient;
pub use error::{ErrorKind, ScraperError};
pub use extract::{extract_offers, Extraction, SkippedItem};
pub use fetch_pool::{FetchOutcome, FetchPool};
pub use listing::walk_storefronts;
pub use location::resolve_location;
pub use pipeline::{discover_offers, find_bogo_offers, PipelineConfig, RunSummary};
pub use upstream::Upstream;
