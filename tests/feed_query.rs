//! Integration tests for local feed sources: files and inline XML.
//!
//! These exercise the public `FeedQuery` API end-to-end without any network
//! access, covering date cutoffs, field projection and ordering.

use chrono::NaiveDate;
use feedsnap::feed::days_before_today;
use feedsnap::{FeedQuery, FeedSource, Record};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

const FIELDS: [&str; 3] = ["link", "title", "description"];

fn fixture() -> FeedSource {
    FeedSource::file(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/feed.xml"))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn titles(records: &[Record]) -> Vec<&str> {
    records.iter().filter_map(|r| r.get("title")).collect()
}

fn dated_feed(pub_dates: &[String]) -> String {
    let items: String = pub_dates
        .iter()
        .enumerate()
        .map(|(i, d)| {
            format!(
                "<item><title>Item {i}</title><link>http://example.com/{i}/</link>\
                 <description><![CDATA[Details {i}]]></description><pubDate>{d}</pubDate></item>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
<channel>
  <title>Example</title>
  <atom:link href="http://example.com/feed/" rel="self" type="application/rss+xml" />
  {items}
</channel>
</rss>"#
    )
}

// ============================================================================
// File Source Tests
// ============================================================================

#[tokio::test]
async fn test_parses_feed_file() {
    let query = FeedQuery::new(fixture(), FIELDS).unwrap();
    let records = query.get(Some(date(2012, 1, 1))).await;

    assert_eq!(records.len(), 4);
    let first = &records[0];
    assert!(first
        .get("link")
        .unwrap()
        .contains("/2012/11/29/friday-nov-30-2012"));
    assert!(first
        .get("description")
        .unwrap()
        .contains("AMRAP in 20 mins 1 Rope climb 3 Manmakers"));
    assert_eq!(first.get("title"), Some("Friday Nov 30 2012"));
}

#[tokio::test]
async fn test_only_items_since_cutoff() {
    let query = FeedQuery::new(fixture(), FIELDS).unwrap();
    let records = query.get(Some(date(2012, 11, 29))).await;

    assert_eq!(
        titles(&records),
        vec!["Friday Nov 30 2012", "Thursday Nov 29 2012"]
    );
}

#[tokio::test]
async fn test_records_have_exactly_requested_fields() {
    let query = FeedQuery::new(fixture(), FIELDS).unwrap();
    let records = query.get(Some(date(2012, 1, 1))).await;

    for record in &records {
        assert_eq!(record.fields().collect::<Vec<_>>(), FIELDS.to_vec());
        assert!(!record.contains_field("pubDate"));
    }
}

#[tokio::test]
async fn test_pub_date_included_when_requested() {
    let query = FeedQuery::new(fixture(), ["title", "pubDate"]).unwrap();
    let records = query.get(Some(date(2012, 11, 30))).await;

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("pubDate"),
        Some("Fri, 30 Nov 2012 03:00:47 +0000")
    );
}

#[tokio::test]
async fn test_namespaced_field_from_file() {
    let query = FeedQuery::new(fixture(), ["dc:creator"]).unwrap();
    let records = query.get(Some(date(2012, 11, 28))).await;

    let creators: Vec<_> = records.iter().filter_map(|r| r.get("dc:creator")).collect();
    assert_eq!(creators, vec!["Coach Dana", "Coach Dana", "Coach Sam"]);
}

#[tokio::test]
async fn test_document_order_preserved() {
    // Newest item last: output must not be re-sorted by date
    let feed = dated_feed(&[
        "2012-11-27".into(),
        "2012-11-30".into(),
        "2012-11-28".into(),
    ]);
    let query = FeedQuery::new(feed, FIELDS).unwrap();
    let records = query.get(Some(date(2012, 1, 1))).await;

    assert_eq!(titles(&records), vec!["Item 0", "Item 1", "Item 2"]);
}

#[tokio::test]
async fn test_repeated_get_is_idempotent() {
    let query = FeedQuery::new(fixture(), FIELDS).unwrap();
    let since = Some(date(2012, 11, 28));

    let first = query.get(since).await;
    let second = query.get(since).await;
    assert_eq!(first, second);
}

// ============================================================================
// Inline Source Tests
// ============================================================================

#[tokio::test]
async fn test_default_cutoff_is_last_sixty_days() {
    let feed = dated_feed(&[
        days_before_today(0).to_string(),
        days_before_today(59).to_string(),
        days_before_today(61).to_string(),
    ]);
    let query = FeedQuery::new(feed, FIELDS).unwrap();

    assert_eq!(query.get(None).await.len(), 2);
}

#[tokio::test]
async fn test_empty_inline_source_returns_nothing() {
    let query = FeedQuery::new("", FIELDS).unwrap();
    assert!(query.get(None).await.is_empty());
}

#[tokio::test]
async fn test_feed_without_items_returns_nothing() {
    let query = FeedQuery::new(dated_feed(&[]), FIELDS).unwrap();
    assert!(query.get(Some(date(1970, 1, 1))).await.is_empty());
}

#[tokio::test]
async fn test_malformed_inline_source_returns_nothing() {
    let query = FeedQuery::new("<rss><channel><item><title>x</item>", FIELDS).unwrap();
    assert!(query.get(Some(date(1970, 1, 1))).await.is_empty());
}

#[tokio::test]
async fn test_truncated_inline_source_returns_nothing() {
    let feed = "<rss><channel>\
        <item><title>One</title><pubDate>Fri, 30 Nov 2012 03:00:47 +0000</pubDate></item>\
        <item><title>Two</title><pubDate>Thu, 29 Nov 2012 03:00:47 +0000</pubDate></item>\
        <item><title>Thr";
    let query = FeedQuery::new(feed, ["title"]).unwrap();
    assert!(query.get(Some(date(2012, 1, 1))).await.is_empty());
}

#[tokio::test]
async fn test_missing_file_returns_nothing() {
    let query = FeedQuery::new(
        FeedSource::file("/tmp/feedsnap_missing_fixture.xml"),
        FIELDS,
    )
    .unwrap();
    assert!(query.get(Some(date(1970, 1, 1))).await.is_empty());
}

#[tokio::test]
async fn test_records_serialize_to_json() {
    let query = FeedQuery::new(fixture(), ["title", "link"]).unwrap();
    let records = query.get(Some(date(2012, 11, 30))).await;

    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "title": "Friday Nov 30 2012",
            "link": "http://northside-barbell.example/2012/11/29/friday-nov-30-2012/"
        }])
    );
}
