use crate::config::Config;
use crate::feed::extract::extract;
use crate::feed::fetcher::{FetchError, Fetcher};
use crate::feed::filter::{filter_by_date, UndatedItems};
use crate::feed::source::{resolve, FeedSource};
use crate::feed::types::{FieldSet, Record};
use chrono::{Days, Local, NaiveDate};

/// Default lookback window when `get` is called without a cutoff.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 60;

/// A feed source plus the fields to pull from it.
///
/// Source, fields and alternate paths are fixed at construction. Each call
/// to [`get`](Self::get) resolves the source again and holds no state
/// afterwards, so one query can be reused with different cutoffs.
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> Result<(), feedsnap::FetchError> {
/// use feedsnap::FeedQuery;
///
/// let query = FeedQuery::new("http://example.com", ["title", "link"])?
///     .with_alt_paths(["feed", "rss"]);
/// let records = query.get(None).await;
/// for record in &records {
///     println!("{:?}", record.get("title"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FeedQuery {
    source: FeedSource,
    fields: FieldSet,
    alt_paths: Vec<String>,
    fetcher: Fetcher,
    lookback_days: u32,
    undated: UndatedItems,
}

impl FeedQuery {
    /// Creates a query with a default [`Fetcher`].
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be initialized.
    pub fn new<I, S>(source: impl Into<FeedSource>, fields: I) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::with_fetcher(source, fields, Fetcher::new()?))
    }

    /// Creates a query that fetches through `fetcher`.
    pub fn with_fetcher<I, S>(source: impl Into<FeedSource>, fields: I, fetcher: Fetcher) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            fields: FieldSet::new(fields),
            alt_paths: Vec::new(),
            fetcher,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            undated: UndatedItems::default(),
        }
    }

    /// Creates a query using the fetch settings, lookback window and
    /// alternate paths from `config`.
    pub fn from_config<I, S>(
        source: impl Into<FeedSource>,
        fields: I,
        config: &Config,
    ) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(
            Self::with_fetcher(source, fields, Fetcher::from_config(config)?)
                .with_alt_paths(config.alt_paths.iter().cloned())
                .with_lookback_days(config.lookback_days),
        )
    }

    /// Paths tried on the same host, in order, when the URL yields no feed.
    pub fn with_alt_paths<I, S>(mut self, alt_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alt_paths = alt_paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_undated_items(mut self, policy: UndatedItems) -> Self {
        self.undated = policy;
        self
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn alt_paths(&self) -> &[String] {
        &self.alt_paths
    }

    /// Cutoff used when `get` receives `None`: today minus the lookback window.
    pub fn default_since(&self) -> NaiveDate {
        days_before_today(self.lookback_days)
    }

    /// Fetches the feed and returns items published on or after `since`.
    ///
    /// `None` means [`default_since`](Self::default_since). Never fails:
    /// unreachable sources, non-feed responses and malformed XML all produce
    /// an empty list.
    pub async fn get(&self, since: Option<NaiveDate>) -> Vec<Record> {
        let since = since.unwrap_or_else(|| self.default_since());

        let raw = resolve(&self.source, &self.fetcher, &self.alt_paths).await;
        if raw.is_none() {
            return Vec::new();
        }

        let columns = extract(raw.as_deref(), &self.fields);
        let records = filter_by_date(&columns, &self.fields, since, self.undated);

        tracing::info!(
            items = columns.len(),
            records = records.len(),
            since = %since,
            "Feed snapshot extracted"
        );

        records
    }
}

/// The local calendar date `days` days ago.
pub fn days_before_today(days: u32) -> NaiveDate {
    let today = Local::now().date_naive();
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}
