use crate::feed::types::{FieldSet, ItemColumns, Record, DATE_FIELD};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// What to do with items whose `pubDate` is missing or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UndatedItems {
    /// Leave them out of the result.
    #[default]
    Skip,
    /// Include them regardless of the cutoff.
    Keep,
}

/// Keeps items published on or after `since`, projected onto the requested fields.
///
/// Dates compare at calendar-day granularity. Items stay in document order.
pub fn filter_by_date(
    columns: &ItemColumns,
    fields: &FieldSet,
    since: NaiveDate,
    undated: UndatedItems,
) -> Vec<Record> {
    let Some(dates) = columns.column(DATE_FIELD) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (index, raw_date) in dates.iter().enumerate() {
        let keep = match raw_date.as_deref().and_then(parse_pub_date) {
            Some(date) => date >= since,
            None => {
                tracing::debug!(
                    index = index,
                    pub_date = raw_date.as_deref().unwrap_or(""),
                    policy = ?undated,
                    "Item has no usable pubDate"
                );
                skipped += 1;
                undated == UndatedItems::Keep
            }
        };

        if keep {
            records.push(project(columns, fields, index));
        }
    }

    if skipped > 0 && undated == UndatedItems::Skip {
        tracing::info!(skipped = skipped, "Items without a parseable pubDate dropped");
    }

    records
}

fn project(columns: &ItemColumns, fields: &FieldSet, index: usize) -> Record {
    Record::new(
        fields
            .requested()
            .iter()
            .map(|f| (f.clone(), columns.value(f, index).map(str::to_owned)))
            .collect(),
    )
}

/// Parses a feed `pubDate` into the calendar date it names.
///
/// Accepts RFC 2822 (the RSS format, with or without a weekday), RFC 3339,
/// `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS`. Timestamps keep their own offset,
/// so `Thu, 29 Nov 2012 23:00:00 -0700` is 29 November.
pub fn parse_pub_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }

    // Feeds regularly carry a weekday that does not match the date
    if let Some((_, rest)) = raw.split_once(',') {
        if let Ok(dt) = DateTime::parse_from_rfc2822(rest.trim()) {
            return Some(dt.date_naive());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    const NAIVE_DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%a, %d %b %Y %H:%M:%S",
    ];
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d %b %Y", "%a, %d %b %Y"];
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}
