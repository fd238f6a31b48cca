use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::resolve::Language;

/// Canonical representation of one candidate release, built fresh per
/// feed item and owned by the caller after the parse returns.
///
/// URL fields default to the empty string rather than `None`: an empty
/// `download_url` means the indexer offered no usable link, and a
/// non-empty one is always an absolute URI.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReleaseRecord {
    pub title: String,
    pub info_url: String,
    pub comment_url: String,
    pub download_url: String,
    pub magnet_url: String,
    pub info_hash: String,
    /// Release size in bytes. Explicit size fields win over enclosure
    /// lengths; 0 when neither is available.
    pub size: u64,
    pub seeders: Option<i32>,
    pub peers: Option<i32>,
    /// Indexer category ids in document order. Values that failed to
    /// parse are dropped, not zeroed; duplicates are kept.
    pub categories: Vec<i32>,
    /// Canonical languages in document order. Unresolved names are
    /// dropped; duplicates are kept.
    pub languages: Vec<Language>,
    pub publish_date: Option<DateTime<Utc>>,
}

/// A feed-standard enclosure child of an item. Transient: used to
/// backfill size/download-url and for the aggregate mime-type sanity
/// check, never returned to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
    pub length: u64,
}
