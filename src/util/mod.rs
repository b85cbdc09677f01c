//! Utility functions for common operations.
//!
//! Currently limited to URL handling used by the fetch pipeline:
//!
//! - **Source detection**: deciding whether an input string is a URL
//! - **Redirects**: resolving `Location` headers against the current URL
//! - **Alternate paths**: building sibling URLs on the same host
//!
//! # Examples
//!
//! ```
//! use feedsnap::util::{parse_http_url, sibling_url};
//!
//! let base = parse_http_url("https://example.com/blog?page=2").unwrap();
//! assert_eq!(sibling_url(&base, "feed").as_str(), "https://example.com/feed");
//! ```

mod url_resolver;

pub use url_resolver::{
    looks_like_http_url, parse_http_url, resolve_location, sibling_url, UrlError,
};
