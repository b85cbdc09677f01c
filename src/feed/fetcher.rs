use crate::config::Config;
use crate::feed::decode::{charset_param, decode_document};
use crate::util::{resolve_location, UrlError};
use futures::StreamExt;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirect hops followed for a single fetch.
pub const MAX_REDIRECTS: u32 = 5;

/// Content types accepted as feed XML.
const XML_CONTENT_TYPES: [&str; 3] = ["application/xml", "application/atom+xml", "text/xml"];

/// Errors that can occur while performing a fetch.
///
/// Any of these means the fetch produced no usable response. HTTP error
/// statuses are not errors here; they are reported through [`FetchOutcome`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, malformed response)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Response body exceeded the configured size limit
    #[error("Response too large (limit {0} bytes)")]
    ResponseTooLarge(usize),
    /// A redirect pointed somewhere that cannot be fetched
    #[error("Invalid redirect target: {0}")]
    InvalidRedirect(#[from] UrlError),
}

/// The response to one fetch, after redirects have been followed.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// URL that produced this response (the last hop of a redirect chain)
    pub url: Url,
    pub status: StatusCode,
    /// Media type from `Content-Type`, lowercased and without parameters
    pub content_type: Option<String>,
    /// `charset` parameter from `Content-Type`, as sent
    pub charset: Option<String>,
    /// `Location` header, if any
    pub location: Option<String>,
    /// Number of redirects followed to reach this response
    pub redirects: u32,
    /// Raw body bytes, undecoded
    pub body: Vec<u8>,
}

impl FetchOutcome {
    /// Status is exactly 200.
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Content type is one of `application/xml`, `application/atom+xml`, `text/xml`.
    pub fn is_xml(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| XML_CONTENT_TYPES.contains(&ct))
    }

    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Body decoded to text, honoring the response charset and the
    /// document's own encoding declaration.
    pub fn text(&self) -> String {
        decode_document(&self.body, self.charset.as_deref())
    }
}

/// HTTP fetcher that follows redirects itself, up to [`MAX_REDIRECTS`] hops.
///
/// The underlying client must not follow redirects on its own; use
/// [`Fetcher::new`] or [`Fetcher::from_config`] to get one configured that way.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl Fetcher {
    /// Creates a fetcher with default settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::from_config(&Config::default())
    }

    /// Creates a fetcher using the timeout, user agent and body limit from `config`.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Wraps an existing client. The client must be built with
    /// `redirect::Policy::none()`, otherwise redirects are followed without bound
    /// checking here.
    pub fn with_client(client: reqwest::Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    /// Performs a GET against `url`, following redirects.
    ///
    /// A redirect with a `Location` header is followed while fewer than
    /// [`MAX_REDIRECTS`] hops have been taken. Past that, the redirect response
    /// itself is returned. A 3xx without `Location` is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, an oversized body, or a
    /// redirect to an unusable URL.
    pub async fn fetch(&self, url: &Url) -> Result<FetchOutcome, FetchError> {
        let mut current = url.clone();
        let mut redirects = 0u32;

        loop {
            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();
            let location = header_value(&response, LOCATION);

            if status.is_redirection() {
                if let Some(target) = location.as_deref() {
                    if redirects < MAX_REDIRECTS {
                        let next = resolve_location(target, &current)?;
                        tracing::debug!(
                            from = %current,
                            to = %next,
                            status = status.as_u16(),
                            hop = redirects + 1,
                            "Following redirect"
                        );
                        current = next;
                        redirects += 1;
                        continue;
                    }

                    tracing::warn!(
                        url = %url,
                        last = %current,
                        max = MAX_REDIRECTS,
                        "Redirect limit reached, returning unresolved redirect"
                    );
                }
            }

            let raw_content_type = header_value(&response, CONTENT_TYPE);
            let content_type = raw_content_type.as_deref().map(media_type);
            let charset = raw_content_type.as_deref().and_then(charset_param);
            let bytes = read_limited_bytes(response, self.max_body_bytes).await?;

            tracing::debug!(
                url = %current,
                status = status.as_u16(),
                content_type = content_type.as_deref().unwrap_or(""),
                bytes = bytes.len(),
                redirects = redirects,
                "Fetched"
            );

            return Ok(FetchOutcome {
                url: current,
                status,
                content_type,
                charset,
                location,
                redirects,
                body: bytes,
            });
        }
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Reduces a `Content-Type` value to its lowercased media type.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
