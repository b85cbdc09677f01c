use crate::feed::decode::decode_document;
use crate::feed::fetcher::Fetcher;
use crate::feed::probe::probe_alternates;
use crate::util::{looks_like_http_url, parse_http_url};
use std::path::PathBuf;

/// Where feed content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// An http(s) URL to fetch
    Url(String),
    /// Feed XML supplied directly
    Inline(String),
    /// A file containing feed XML
    File(PathBuf),
}

impl FeedSource {
    /// Classifies a string as a URL (http/https prefix) or inline feed text.
    pub fn detect(input: impl Into<String>) -> Self {
        let input = input.into();
        if looks_like_http_url(&input) {
            Self::Url(input)
        } else {
            Self::Inline(input)
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

impl From<&str> for FeedSource {
    fn from(input: &str) -> Self {
        Self::detect(input)
    }
}

impl From<String> for FeedSource {
    fn from(input: String) -> Self {
        Self::detect(input)
    }
}

impl From<PathBuf> for FeedSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Produces the raw feed text for `source`, or `None` if there is none.
///
/// Inline text is returned unchanged, even when empty. Files are read in
/// full and decoded per their BOM or XML declaration. URLs are fetched with
/// [`fetch_via_http`]. Failures are logged and
/// reported as `None`; they never reach the caller as errors.
pub async fn resolve(source: &FeedSource, fetcher: &Fetcher, alt_paths: &[String]) -> Option<String> {
    match source {
        FeedSource::Url(url) => fetch_via_http(fetcher, url, alt_paths).await,
        FeedSource::Inline(text) => Some(text.clone()),
        FeedSource::File(path) => match tokio::fs::read(path).await {
            Ok(bytes) => Some(decode_document(&bytes, None)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read feed file");
                None
            }
        },
    }
}

/// Fetches `url`, falling back to the alternate paths when the response is
/// not XML or is a 404.
///
/// An XML response at the primary URL is used whatever its status. A
/// transport failure on the primary URL ends resolution without probing.
pub async fn fetch_via_http(fetcher: &Fetcher, url: &str, alt_paths: &[String]) -> Option<String> {
    let uri = match parse_http_url(url) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Invalid feed URL");
            return None;
        }
    };

    let primary = match fetcher.fetch(&uri).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(url = %uri, error = %e, "Feed fetch failed");
            return None;
        }
    };

    if primary.is_xml() && !primary.is_not_found() {
        return Some(primary.text());
    }

    tracing::debug!(
        url = %uri,
        status = primary.status.as_u16(),
        content_type = primary.content_type.as_deref().unwrap_or(""),
        alternates = alt_paths.len(),
        "No feed at primary URL, trying alternate paths"
    );

    match probe_alternates(fetcher, &uri, alt_paths).await {
        Some(outcome) => Some(outcome.text()),
        None => {
            tracing::warn!(url = %uri, "No feed found at URL or alternate paths");
            None
        }
    }
}
