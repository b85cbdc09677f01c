use crate::feed::fetcher::{FetchOutcome, Fetcher};
use crate::util::sibling_url;
use url::Url;

/// Tries each alternate path on the host of `base`, in order.
///
/// Each candidate is `scheme://host[:port]/<path>`; the path, query and
/// fragment of `base` are discarded. Returns the first response that is both
/// 200 and XML, or `None` if no candidate qualifies. A candidate whose fetch
/// fails outright is logged and skipped.
pub async fn probe_alternates(
    fetcher: &Fetcher,
    base: &Url,
    alt_paths: &[String],
) -> Option<FetchOutcome> {
    for (attempt, path) in alt_paths.iter().enumerate() {
        let candidate = sibling_url(base, path);
        tracing::debug!(url = %candidate, attempt = attempt + 1, "Probing alternate feed path");

        match fetcher.fetch(&candidate).await {
            Ok(outcome) if outcome.is_ok() && outcome.is_xml() => {
                tracing::info!(url = %outcome.url, "Found feed at alternate path");
                return Some(outcome);
            }
            Ok(outcome) => {
                tracing::debug!(
                    url = %candidate,
                    status = outcome.status.as_u16(),
                    content_type = outcome.content_type.as_deref().unwrap_or(""),
                    "Alternate path is not a feed"
                );
            }
            Err(e) => {
                tracing::warn!(url = %candidate, error = %e, "Alternate path fetch failed");
            }
        }
    }

    None
}
