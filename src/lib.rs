//! Fetch an RSS feed and extract a date-bounded snapshot of selected item fields.
//!
//! The input may be a URL, inline feed XML, or a file. URLs are fetched with
//! redirects followed up to [`MAX_REDIRECTS`] hops; when the response is not
//! XML (or is a 404), caller-supplied alternate paths on the same host are
//! tried in order. Retrieval failures never surface as errors: the result is
//! simply empty.

pub mod config;
pub mod feed;
pub mod util;

pub use config::{Config, ConfigError};
pub use feed::{
    FeedQuery, FeedSource, FetchError, FetchOutcome, Fetcher, FieldSet, Record, UndatedItems,
    MAX_REDIRECTS,
};
