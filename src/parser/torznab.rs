//! Field extraction and error classification for the Torznab dialect.
//!
//! Torznab carries structured metadata the base RSS fields cannot
//! express as namespace-qualified `<attr name="..." value="..."/>`
//! children of each item, and signals protocol failures through a
//! top-level `<error code="..." description="..."/>` element.

use std::sync::Arc;

use url::Url;

use crate::config::ParserConfig;
use crate::error::FeedError;
use crate::model::ReleaseRecord;
use crate::parser::generic::{default_download_url, enclosure_length, enclosures, FeedDialect};
use crate::resolve::{DiagnosticSink, Language, LanguageResolver, UrlResolver};
use crate::response::IndexerResponse;
use crate::xml::{Document, Element};

/// Namespace qualifying Torznab attribute-bag elements.
pub const TORZNAB_NS: &str = "http://torznab.com/schemas/2015/feed";

/// The [`FeedDialect`] for Torznab feeds.
///
/// Holds only collaborators and configuration; all per-parse state lives
/// in the template's call frame, so one instance can be shared across
/// concurrent polls.
pub struct TorznabDialect {
    urls: Arc<dyn UrlResolver>,
    langs: Arc<dyn LanguageResolver>,
    sink: Arc<dyn DiagnosticSink>,
    config: ParserConfig,
}

impl TorznabDialect {
    pub fn new(
        urls: Arc<dyn UrlResolver>,
        langs: Arc<dyn LanguageResolver>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            urls,
            langs,
            sink,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }
}

impl FeedDialect for TorznabDialect {
    fn url_resolver(&self) -> &dyn UrlResolver {
        self.urls.as_ref()
    }

    /// Classifies an explicit `<error>` element. First match wins; the
    /// code-range rule is checked before the description rules, so a
    /// "Missing parameter" with a code in [100, 199] is always an
    /// invalid-key failure, never a missing-key one.
    fn pre_process(&self, response: &IndexerResponse, doc: &Document) -> Result<(), FeedError> {
        let Some(error) = doc.first_descendant("error") else {
            return Ok(());
        };

        let code: Option<i32> = error.attr("code").and_then(|c| c.trim().parse().ok());
        let description = error.attr("description").unwrap_or("");

        if matches!(code, Some(c) if (100..=199).contains(&c)) {
            return Err(FeedError::Authentication("Invalid API key".into()));
        }

        if !response.request_url().contains("apikey=") && description == "Missing parameter" {
            return Err(FeedError::Authentication(
                "Indexer requires an API key".into(),
            ));
        }

        if description == "Request limit reached" {
            return Err(FeedError::RateLimited("API limit reached".into()));
        }

        Err(FeedError::Protocol(format!(
            "Torznab error detected: {description}"
        )))
    }

    /// Sanity-checks the enclosure mime types seen across the whole
    /// feed. A torrent indexer whose enclosures are all nzb-typed was
    /// probably added with the wrong protocol. Diagnostics only.
    fn post_process(
        &self,
        response: &IndexerResponse,
        items: &[&Element],
        _releases: &[ReleaseRecord],
    ) {
        let mut seen: Vec<String> = Vec::new();
        for item in items {
            for enclosure in enclosures(item) {
                if !seen.contains(&enclosure.mime_type) {
                    seen.push(enclosure.mime_type);
                }
            }
        }

        if seen.is_empty() {
            return;
        }
        if seen
            .iter()
            .any(|t| self.config.preferred_enclosure_types.contains(t))
        {
            return;
        }

        if seen
            .iter()
            .any(|t| self.config.usenet_enclosure_types.contains(t))
        {
            self.sink.warn(&format!(
                "{} does not contain {}, found {}, did you intend to add a Newznab indexer?",
                response.request_url(),
                self.config.torrent_enclosure_type,
                seen[0]
            ));
        } else {
            self.sink.warn(&format!(
                "{} does not contain {}, found {}.",
                response.request_url(),
                self.config.torrent_enclosure_type,
                seen[0]
            ));
        }
    }

    fn info_url(&self, item: &Element) -> String {
        let raw = item.child_text("comments");
        if raw.is_empty() {
            return String::new();
        }
        let trimmed = raw.strip_suffix("#comments").unwrap_or(raw);
        self.urls.resolve(trimmed)
    }

    fn comment_url(&self, item: &Element) -> String {
        let raw = item.child_text("comments");
        if raw.is_empty() {
            return String::new();
        }
        self.urls.resolve(raw)
    }

    /// Precedence: base extraction (first enclosure, absolutized); if
    /// that is not a well-formed absolute URI, the raw enclosure url
    /// resolved; anything still relative after that becomes empty — a
    /// returned download url is absolute or explicitly absent.
    fn download_url(&self, item: &Element) -> String {
        let mut url = default_download_url(self.urls.as_ref(), item);

        if Url::parse(&url).is_err() {
            url = match enclosures(item).into_iter().next() {
                Some(enclosure) if !enclosure.url.is_empty() => self.urls.resolve(&enclosure.url),
                _ => url,
            };
        }

        if url.is_empty() || Url::parse(&url).is_ok() {
            url
        } else {
            tracing::debug!(url = %url, "Dropping unresolvable download URL");
            String::new()
        }
    }

    fn magnet_url(&self, item: &Element) -> String {
        torznab_attr(item, "magneturl").unwrap_or_default().to_string()
    }

    fn info_hash(&self, item: &Element) -> String {
        torznab_attr(item, "infohash").unwrap_or_default().to_string()
    }

    /// Precedence: explicit size attribute, else enclosure length, else
    /// 0. The numeric parse here is tolerant — failure falls through to
    /// the enclosure, unlike seeders/peers.
    fn size(&self, item: &Element) -> u64 {
        if let Some(raw) = torznab_attr(item, "size") {
            if let Ok(size) = raw.trim().parse::<u64>() {
                return size;
            }
        }
        enclosure_length(item)
    }

    fn seeders(&self, item: &Element) -> Result<Option<i32>, FeedError> {
        match torznab_attr(item, "seeders") {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(parse_int("seeders", raw)?)),
            _ => Ok(None),
        }
    }

    /// Precedence: explicit peers attribute; else seeders + leechers
    /// when both are present; else none. All numeric parses here are
    /// fatal.
    fn peers(&self, item: &Element) -> Result<Option<i32>, FeedError> {
        if let Some(raw) = torznab_attr(item, "peers") {
            if !raw.trim().is_empty() {
                return Ok(Some(parse_int("peers", raw)?));
            }
        }

        let seeders = torznab_attr(item, "seeders");
        let leechers = torznab_attr(item, "leechers");
        if let (Some(seeders), Some(leechers)) = (seeders, leechers) {
            if !seeders.trim().is_empty() && !leechers.trim().is_empty() {
                let sum = parse_int("seeders", seeders)?
                    .checked_add(parse_int("leechers", leechers)?)
                    .ok_or_else(|| FeedError::FieldExtraction {
                        field: "peers",
                        value: format!("{} + {}", seeders.trim(), leechers.trim()),
                    })?;
                return Ok(Some(sum));
            }
        }

        Ok(None)
    }

    fn categories(&self, item: &Element) -> Vec<i32> {
        torznab_attrs(item, "category")
            .into_iter()
            .filter_map(|v| v.trim().parse().ok())
            .collect()
    }

    fn languages(&self, item: &Element) -> Vec<Language> {
        let mut raw: Vec<&str> = torznab_attrs(item, "language");

        // Some indexers skip the attribute bag and emit plain <language>
        // children instead; tolerate them.
        if raw.is_empty() {
            raw = item
                .children()
                .filter(|c| c.name() == "language")
                .map(|c| c.text())
                .collect();
        }

        raw.into_iter()
            .filter_map(|name| self.langs.find_by_name(name))
            .collect()
    }
}

fn is_torznab_attr(element: &Element) -> bool {
    element.name() == "attr" && element.namespace() == Some(TORZNAB_NS)
}

/// Single-valued attribute-bag lookup: the value of the first `attr`
/// element whose name matches case-insensitively, or `None`.
fn torznab_attr<'a>(item: &'a Element, key: &str) -> Option<&'a str> {
    item.children()
        .filter(|c| is_torznab_attr(c))
        .find(|c| c.attr("name").is_some_and(|n| n.eq_ignore_ascii_case(key)))
        .and_then(|c| c.attr("value"))
}

/// Multi-valued attribute-bag lookup: all matching values in document
/// order, duplicates kept. Matching elements without a value attribute
/// are skipped.
fn torznab_attrs<'a>(item: &'a Element, key: &str) -> Vec<&'a str> {
    item.children()
        .filter(|c| is_torznab_attr(c))
        .filter(|c| c.attr("name").is_some_and(|n| n.eq_ignore_ascii_case(key)))
        .filter_map(|c| c.attr("value"))
        .collect()
}

fn parse_int(field: &'static str, value: &str) -> Result<i32, FeedError> {
    value.trim().parse().map_err(|_| FeedError::FieldExtraction {
        field,
        value: value.to_string(),
    })
}
