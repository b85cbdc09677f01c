use thiserror::Error;
use url::Url;

/// Errors that can occur when interpreting a feed URL.
#[derive(Error, Debug)]
pub enum UrlError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Returns `true` when the input should be treated as a URL to fetch rather
/// than as inline feed content.
///
/// Matches an `http://` or `https://` prefix, case-insensitively. Inline feed
/// text always starts with markup or whitespace, so there is no overlap.
pub fn looks_like_http_url(input: &str) -> bool {
    let head: String = input.chars().take(8).collect::<String>().to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Parses a feed URL, accepting only the http and https schemes.
///
/// # Examples
///
/// ```
/// use feedsnap::util::parse_http_url;
///
/// let url = parse_http_url("https://example.com/feed").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(parse_http_url("ftp://example.com/feed").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Resolves a redirect `Location` header value against the URL that produced it.
///
/// Absolute locations are returned as parsed; relative and protocol-relative
/// locations are joined onto `base`. Non-HTTP targets are rejected.
pub fn resolve_location(location: &str, base: &Url) -> Result<Url, UrlError> {
    let resolved = base.join(location.trim())?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Builds the URL of an alternate feed path on the same host.
///
/// Keeps the scheme, host and port of `base` and replaces everything after the
/// authority with `/<path>`. Credentials, path, query and fragment are dropped.
pub fn sibling_url(base: &Url, path: &str) -> Url {
    let mut alt = base.clone();
    alt.set_path(&format!("/{}", path.trim().trim_start_matches('/')));
    alt.set_query(None);
    alt.set_fragment(None);
    // Only fails for URLs without a host, which http(s) URLs always have
    let _ = alt.set_username("");
    let _ = alt.set_password(None);
    alt
}
