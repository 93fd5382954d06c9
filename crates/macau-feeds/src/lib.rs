//! SMG weather feeds for Macau
//!
//! Fetches the bureau's XML and RSS bulletins, caches each under its own
//! freshness policy, and extracts display lines from the payloads.

pub mod cache;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod markup;
pub mod service;
pub mod types;

pub use cache::{CacheGateway, CacheStore, Clock, SystemClock};
pub use error::FeedError;
pub use fetch::{Fetcher, HttpFetcher};
pub use service::WeatherService;
pub use types::*;
