//! Generic feed parse template.
//!
//! [`FeedParser::parse`] owns the algorithm — transport-policy check,
//! XML load, pre-process, item iteration, post-process — and calls into
//! a [`FeedDialect`] at fixed points. Default hook bodies express the
//! plain-RSS behavior; a dialect overrides only the hooks its protocol
//! extends. This keeps the hook contract an explicit interface instead
//! of an inheritance chain.

use chrono::{DateTime, Utc};

use crate::error::FeedError;
use crate::model::{Enclosure, ReleaseRecord};
use crate::resolve::{Language, UrlResolver};
use crate::response::IndexerResponse;
use crate::xml::{Document, Element};

/// The fixed capability set a feed dialect supplies to the parse
/// template.
///
/// Extraction hooks must not fail for *absence* of an optional field —
/// they return an empty/default value instead. Only the hooks returning
/// `Result` may abort the parse, and when they do the whole feed's
/// results are discarded.
///
/// Implementations must hold no per-call mutable state: one dialect
/// instance is shared across many concurrent polls.
pub trait FeedDialect: Send + Sync {
    /// The resolver used to absolutize URLs found in the feed.
    fn url_resolver(&self) -> &dyn UrlResolver;

    /// Transport-error policy, applied before the body is parsed. The
    /// default treats an HTTP-level error without an XML content type as
    /// a generic protocol error; dialects that can extract a more
    /// precise error from such bodies override this to a no-op and
    /// classify in [`FeedDialect::pre_process`] instead.
    fn check_response(&self, response: &IndexerResponse) -> Result<(), FeedError> {
        if response.is_http_error() && !response.declares_xml() {
            return Err(FeedError::Protocol(format!(
                "Unexpected response status {} from {}",
                response.status(),
                response.request_url()
            )));
        }
        Ok(())
    }

    /// Inspects the parsed document before item extraction. Returning an
    /// error aborts the whole parse; protocol dialects classify explicit
    /// error elements here.
    fn pre_process(&self, _response: &IndexerResponse, _doc: &Document) -> Result<(), FeedError> {
        Ok(())
    }

    /// Aggregate diagnostics over the raw items and the built records.
    /// Always non-fatal: implementations may only emit warnings.
    fn post_process(
        &self,
        _response: &IndexerResponse,
        _items: &[&Element],
        _releases: &[ReleaseRecord],
    ) {
    }

    /// The feed's item elements, in document order.
    fn items<'a>(&self, doc: &'a Document) -> Vec<&'a Element> {
        doc.root().descendants("item")
    }

    fn title(&self, item: &Element) -> String {
        item.child_text("title").trim().to_string()
    }

    fn info_url(&self, _item: &Element) -> String {
        String::new()
    }

    fn comment_url(&self, item: &Element) -> String {
        let raw = item.child_text("comments");
        if raw.is_empty() {
            return String::new();
        }
        self.url_resolver().resolve(raw)
    }

    fn download_url(&self, item: &Element) -> String {
        default_download_url(self.url_resolver(), item)
    }

    fn magnet_url(&self, _item: &Element) -> String {
        String::new()
    }

    fn info_hash(&self, _item: &Element) -> String {
        String::new()
    }

    fn size(&self, item: &Element) -> u64 {
        enclosure_length(item)
    }

    /// Seeder count. Fallible: a dialect that finds a seeders field but
    /// cannot parse it aborts the parse.
    fn seeders(&self, _item: &Element) -> Result<Option<i32>, FeedError> {
        Ok(None)
    }

    /// Peer count, same failure contract as [`FeedDialect::seeders`].
    fn peers(&self, _item: &Element) -> Result<Option<i32>, FeedError> {
        Ok(None)
    }

    fn categories(&self, _item: &Element) -> Vec<i32> {
        Vec::new()
    }

    fn languages(&self, _item: &Element) -> Vec<Language> {
        Vec::new()
    }

    fn publish_date(&self, item: &Element) -> Option<DateTime<Utc>> {
        let raw = item.child_text("pubDate").trim();
        if raw.is_empty() {
            return None;
        }
        match DateTime::parse_from_rfc2822(raw) {
            Ok(date) => Some(date.with_timezone(&Utc)),
            Err(error) => {
                tracing::debug!(%error, value = raw, "Ignoring unparseable pubDate");
                None
            }
        }
    }
}

/// Parses fetched indexer responses with a fixed dialect.
///
/// Stateless across calls: all working state (document, item list,
/// accumulated records) is local to [`FeedParser::parse`], so one parser
/// can serve concurrent polls of distinct responses.
pub struct FeedParser<D> {
    dialect: D,
}

impl<D: FeedDialect> FeedParser<D> {
    pub fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Parses one fetched response into release records.
    ///
    /// Results are all-or-nothing: any fatal condition (malformed body,
    /// classified protocol error, fatal field-extraction failure)
    /// discards every partially built record for this call.
    ///
    /// # Errors
    ///
    /// - [`FeedError::MalformedFeed`] when the body is not well-formed XML
    /// - whatever [`FeedDialect::check_response`] or
    ///   [`FeedDialect::pre_process`] classify
    /// - [`FeedError::FieldExtraction`] from a fatal numeric hook
    pub fn parse(&self, response: &IndexerResponse) -> Result<Vec<ReleaseRecord>, FeedError> {
        self.dialect.check_response(response)?;

        let doc = Document::parse(response.body())?;
        self.dialect.pre_process(response, &doc)?;

        let items = self.dialect.items(&doc);
        let mut releases = Vec::with_capacity(items.len());
        for item in &items {
            releases.push(self.build_release(item)?);
        }

        self.dialect.post_process(response, &items, &releases);
        Ok(releases)
    }

    fn build_release(&self, item: &Element) -> Result<ReleaseRecord, FeedError> {
        let dialect = &self.dialect;
        Ok(ReleaseRecord {
            title: dialect.title(item),
            info_url: dialect.info_url(item),
            comment_url: dialect.comment_url(item),
            download_url: dialect.download_url(item),
            magnet_url: dialect.magnet_url(item),
            info_hash: dialect.info_hash(item),
            size: dialect.size(item),
            seeders: dialect.seeders(item)?,
            peers: dialect.peers(item)?,
            categories: dialect.categories(item),
            languages: dialect.languages(item),
            publish_date: dialect.publish_date(item),
        })
    }
}

/// Base download-url extraction: the first enclosure's url, absolutized.
pub(crate) fn default_download_url(resolver: &dyn UrlResolver, item: &Element) -> String {
    match enclosures(item).into_iter().next() {
        Some(enclosure) if !enclosure.url.is_empty() => resolver.resolve(&enclosure.url),
        _ => String::new(),
    }
}

/// All enclosure children of an item, in document order. Unparseable
/// length attributes become 0.
pub fn enclosures(item: &Element) -> Vec<Enclosure> {
    item.children()
        .filter(|c| c.name() == "enclosure")
        .map(|e| Enclosure {
            url: e.attr("url").unwrap_or_default().to_string(),
            mime_type: e.attr("type").unwrap_or_default().to_string(),
            length: e
                .attr("length")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        })
        .collect()
}

/// Length of the item's first enclosure, or 0 when there is none.
pub fn enclosure_length(item: &Element) -> u64 {
    enclosures(item)
        .into_iter()
        .next()
        .map(|e| e.length)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::IndexerUrls;
    use pretty_assertions::assert_eq;

    struct PlainRss {
        urls: IndexerUrls,
    }

    impl PlainRss {
        fn new() -> Self {
            Self {
                urls: IndexerUrls::new("https://indexer.example/").unwrap(),
            }
        }
    }

    impl FeedDialect for PlainRss {
        fn url_resolver(&self) -> &dyn UrlResolver {
            &self.urls
        }
    }

    fn response(body: &str) -> IndexerResponse {
        IndexerResponse::new("https://indexer.example/api?t=search", body)
    }

    #[test]
    fn test_parse_collects_items_in_document_order() {
        let body = r#"<rss><channel>
            <item><title>First</title></item>
            <item><title>Second</title></item>
        </channel></rss>"#;

        let parser = FeedParser::new(PlainRss::new());
        let releases = parser.parse(&response(body)).unwrap();
        let titles: Vec<&str> = releases.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_malformed_body_is_fatal() {
        let parser = FeedParser::new(PlainRss::new());
        assert!(matches!(
            parser.parse(&response("<rss><channel>")),
            Err(FeedError::MalformedFeed(_))
        ));
    }

    #[test]
    fn test_http_error_without_xml_content_type_is_protocol_error() {
        let parser = FeedParser::new(PlainRss::new());
        let resp = response("<html>nope</html>")
            .with_status(500)
            .with_content_type("text/html");
        assert!(matches!(
            parser.parse(&resp),
            Err(FeedError::Protocol(_))
        ));
    }

    #[test]
    fn test_http_error_with_xml_content_type_still_parses() {
        let body = r#"<rss><channel><item><title>Kept</title></item></channel></rss>"#;
        let parser = FeedParser::new(PlainRss::new());
        let resp = response(body)
            .with_status(500)
            .with_content_type("application/rss+xml");
        let releases = parser.parse(&resp).unwrap();
        assert_eq!(releases.len(), 1);
    }

    #[test]
    fn test_base_download_url_uses_enclosure() {
        let body = r#"<rss><channel><item>
            <enclosure url="/download/1.torrent" type="application/x-bittorrent" length="42"/>
        </item></channel></rss>"#;

        let parser = FeedParser::new(PlainRss::new());
        let releases = parser.parse(&response(body)).unwrap();
        assert_eq!(
            releases[0].download_url,
            "https://indexer.example/download/1.torrent"
        );
        assert_eq!(releases[0].size, 42);
    }

    #[test]
    fn test_publish_date_rfc2822() {
        let body = r#"<rss><channel><item>
            <pubDate>Mon, 23 Dec 2024 12:30:00 +0800</pubDate>
        </item></channel></rss>"#;

        let parser = FeedParser::new(PlainRss::new());
        let releases = parser.parse(&response(body)).unwrap();
        let date = releases[0].publish_date.unwrap();
        assert_eq!(date.to_rfc3339(), "2024-12-23T04:30:00+00:00");
    }

    #[test]
    fn test_bad_publish_date_is_dropped_not_fatal() {
        let body = r#"<rss><channel><item>
            <title>Still here</title>
            <pubDate>not a date</pubDate>
        </item></channel></rss>"#;

        let parser = FeedParser::new(PlainRss::new());
        let releases = parser.parse(&response(body)).unwrap();
        assert_eq!(releases[0].publish_date, None);
        assert_eq!(releases[0].title, "Still here");
    }

    #[test]
    fn test_enclosure_length_parse_failure_defaults_to_zero() {
        let doc = Document::parse(
            r#"<item><enclosure url="u" type="t" length="lots"/></item>"#,
        )
        .unwrap();
        assert_eq!(enclosure_length(doc.root()), 0);
    }
}
