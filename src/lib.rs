//! Indexer feed parsing core for a media-acquisition aggregation
//! service.
//!
//! Dozens of independently operated indexers speak slight variants of
//! the same XML feed dialect; this crate normalizes their search
//! responses into canonical [`ReleaseRecord`]s and classifies protocol
//! failures so callers can react correctly — retry with backoff on a
//! rate limit, disable and ask for reconfiguration on an authentication
//! failure, surface anything else as a diagnostic.
//!
//! Fetching, scheduling, ranking and storage all live outside this
//! crate: a parse call is a pure, synchronous computation over an
//! already-fetched [`IndexerResponse`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trawl::{FeedParser, IndexerResponse, IndexerUrls, IsoLanguages, TorznabDialect, TracingSink};
//!
//! let dialect = TorznabDialect::new(
//!     Arc::new(IndexerUrls::new("https://indexer.example/").unwrap()),
//!     Arc::new(IsoLanguages),
//!     Arc::new(TracingSink),
//! );
//! let parser = FeedParser::new(dialect);
//!
//! let body = r#"<rss><channel><item><title>A.Release</title></item></channel></rss>"#;
//! let response = IndexerResponse::new("https://indexer.example/api?t=search&apikey=k", body);
//! let releases = parser.parse(&response).unwrap();
//! assert_eq!(releases[0].title, "A.Release");
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod response;
pub mod xml;

pub use config::{ConfigError, ParserConfig};
pub use error::FeedError;
pub use model::{Enclosure, ReleaseRecord};
pub use parser::{FeedDialect, FeedParser, TorznabDialect, TORZNAB_NS};
pub use resolve::{
    DiagnosticSink, IndexerUrls, IsoLanguages, Language, LanguageResolver, TracingSink,
    UrlResolver,
};
pub use response::IndexerResponse;
