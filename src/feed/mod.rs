//! Feed retrieval and field extraction.
//!
//! A [`FeedQuery`] runs a fixed pipeline on every `get`:
//!
//! - **Resolve**: turn a [`FeedSource`] into text, fetching URLs over HTTP
//!   and decoding bytes from the feed's declared character encoding
//! - **Extract**: pull the requested fields out of each `rss/channel/item`
//! - **Filter**: keep items published on or after a cutoff date
//!
//! # Architecture
//!
//! - [`source`] - Source classification and resolution
//! - [`fetcher`] - HTTP GET with bounded manual redirect following
//! - [`probe`] - Fallback to alternate paths on the same host
//! - [`decode`] - Character encoding detection for raw feed bytes
//! - [`extract`] - Streaming XML field extraction using `quick-xml`
//! - [`filter`] - pubDate parsing and cutoff filtering
//! - [`query`] - The public entry point wiring the stages together
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), feedsnap::FetchError> {
//! use feedsnap::feed::FeedQuery;
//!
//! let query = FeedQuery::new("http://example.com", ["description", "title"])?
//!     .with_alt_paths(["wod", "wods", "workouts", "feed"]);
//!
//! // Last 42 days
//! let since = feedsnap::feed::days_before_today(42);
//! let records = query.get(Some(since)).await;
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod extract;
pub mod fetcher;
pub mod filter;
pub mod probe;
pub mod query;
pub mod source;
mod types;

pub use fetcher::{FetchError, FetchOutcome, Fetcher, MAX_REDIRECTS};
pub use filter::{filter_by_date, parse_pub_date, UndatedItems};
pub use query::{days_before_today, FeedQuery, DEFAULT_LOOKBACK_DAYS};
pub use source::FeedSource;
pub use types::{FieldSet, ItemColumns, Record, DATE_FIELD};
