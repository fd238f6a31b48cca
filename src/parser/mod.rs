//! Feed parsing pipeline.
//!
//! - [`generic`] - the parse template and the [`FeedDialect`] hook contract
//! - [`torznab`] - field extraction and error classification for the
//!   Torznab attribute-bag dialect

mod generic;
mod torznab;

pub use generic::{enclosure_length, enclosures, FeedDialect, FeedParser};
pub use torznab::{TorznabDialect, TORZNAB_NS};
