//! End-to-end parse of a realistic Torznab search response.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use trawl::{
    DiagnosticSink, FeedError, FeedParser, IndexerResponse, IndexerUrls, IsoLanguages,
    ParserConfig, TorznabDialect, TracingSink,
};

const SEARCH_URL: &str = "https://indexer.example/api?t=tvsearch&q=show&apikey=secret";

const FULL_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:torznab="http://torznab.com/schemas/2015/feed">
  <channel>
    <title>Example Indexer</title>
    <item>
      <title>Some.Show.S01E01.1080p.WEB.x264-GRP</title>
      <guid>https://indexer.example/details/1001</guid>
      <comments>https://indexer.example/details/1001#comments</comments>
      <pubDate>Sat, 14 Jun 2025 10:00:00 +0000</pubDate>
      <enclosure url="/download/1001.torrent" type="application/x-bittorrent" length="734003200"/>
      <torznab:attr name="category" value="5030"/>
      <torznab:attr name="category" value="5000"/>
      <torznab:attr name="size" value="735000000"/>
      <torznab:attr name="seeders" value="42"/>
      <torznab:attr name="leechers" value="7"/>
      <torznab:attr name="infohash" value="aa11bb22cc33dd44ee55ff6600112233445566aa"/>
      <torznab:attr name="magneturl" value="magnet:?xt=urn:btih:aa11bb22cc33dd44ee55ff6600112233445566aa"/>
      <torznab:attr name="language" value="English"/>
      <torznab:attr name="language" value="German"/>
    </item>
    <item>
      <title>Other.Show.S02E05.720p.HDTV-ALT</title>
      <comments>https://indexer.example/details/1002</comments>
      <enclosure url="https://mirror.example/1002.torrent" type="application/x-bittorrent" length="400000000"/>
      <torznab:attr name="peers" value="9"/>
      <language>French</language>
    </item>
  </channel>
</rss>"#;

fn build_parser() -> FeedParser<TorznabDialect> {
    let dialect = TorznabDialect::new(
        Arc::new(IndexerUrls::new("https://indexer.example/").unwrap()),
        Arc::new(IsoLanguages),
        Arc::new(TracingSink),
    );
    FeedParser::new(dialect)
}

#[test]
fn full_feed_produces_normalized_releases() {
    let parser = build_parser();
    let response = IndexerResponse::new(SEARCH_URL, FULL_FEED)
        .with_content_type("application/rss+xml; charset=utf-8");

    let releases = parser.parse(&response).unwrap();
    assert_eq!(releases.len(), 2);

    let first = &releases[0];
    assert_eq!(first.title, "Some.Show.S01E01.1080p.WEB.x264-GRP");
    assert_eq!(first.info_url, "https://indexer.example/details/1001");
    assert_eq!(
        first.comment_url,
        "https://indexer.example/details/1001#comments"
    );
    assert_eq!(
        first.download_url,
        "https://indexer.example/download/1001.torrent"
    );
    // explicit size attribute wins over the enclosure length
    assert_eq!(first.size, 735_000_000);
    assert_eq!(first.seeders, Some(42));
    assert_eq!(first.peers, Some(49)); // seeders + leechers
    assert_eq!(first.categories, vec![5030, 5000]);
    assert_eq!(
        first.info_hash,
        "aa11bb22cc33dd44ee55ff6600112233445566aa"
    );
    assert!(first.magnet_url.starts_with("magnet:?xt=urn:btih:"));
    let names: Vec<&str> = first.languages.iter().map(|l| l.name).collect();
    assert_eq!(names, vec!["English", "German"]);
    assert!(first.publish_date.is_some());

    let second = &releases[1];
    assert_eq!(second.size, 400_000_000); // enclosure fallback
    assert_eq!(second.seeders, None);
    assert_eq!(second.peers, Some(9));
    assert_eq!(second.download_url, "https://mirror.example/1002.torrent");
    let names: Vec<&str> = second.languages.iter().map(|l| l.name).collect();
    assert_eq!(names, vec!["French"]); // plain <language> fallback
    assert_eq!(second.publish_date, None);
}

#[test]
fn parsing_twice_yields_equal_results() {
    let parser = build_parser();
    let response = IndexerResponse::new(SEARCH_URL, FULL_FEED);
    assert_eq!(parser.parse(&response).unwrap(), parser.parse(&response).unwrap());
}

#[test]
fn failures_discard_all_records() {
    // The second item's broken seeders must take the first item with it.
    let body = r#"<rss xmlns:torznab="http://torznab.com/schemas/2015/feed"><channel>
        <item><title>Fine</title><torznab:attr name="seeders" value="3"/></item>
        <item><title>Broken</title><torznab:attr name="seeders" value="lots"/></item>
    </channel></rss>"#;

    let parser = build_parser();
    let result = parser.parse(&IndexerResponse::new(SEARCH_URL, body));
    assert!(matches!(
        result,
        Err(FeedError::FieldExtraction { field: "seeders", .. })
    ));
}

#[test]
fn rate_limit_classification_survives_the_stack() {
    let body = r#"<error code="500" description="Request limit reached"/>"#;
    let parser = build_parser();
    let error = parser
        .parse(&IndexerResponse::new(SEARCH_URL, body))
        .unwrap_err();
    assert!(error.is_transient());
    assert!(!error.requires_reconfiguration());
}

#[test]
fn custom_config_changes_enclosure_expectations() {
    #[derive(Default)]
    struct Capture(Mutex<Vec<String>>);
    impl DiagnosticSink for Capture {
        fn warn(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    let config: ParserConfig = toml::from_str(
        r#"
        preferred_enclosure_types = ["application/x-nzb"]
        usenet_enclosure_types = []
        torrent_enclosure_type = "application/x-nzb"
        "#,
    )
    .unwrap();

    let sink = Arc::new(Capture::default());
    let dialect = TorznabDialect::new(
        Arc::new(IndexerUrls::new("https://indexer.example/").unwrap()),
        Arc::new(IsoLanguages),
        sink.clone(),
    )
    .with_config(config);
    let parser = FeedParser::new(dialect);

    // With nzb preferred, an nzb enclosure no longer warns.
    let body = r#"<rss><channel><item>
        <enclosure url="https://indexer.example/1.nzb" type="application/x-nzb" length="1"/>
    </item></channel></rss>"#;
    parser
        .parse(&IndexerResponse::new(SEARCH_URL, body))
        .unwrap();
    assert!(sink.0.lock().unwrap().is_empty());
}
