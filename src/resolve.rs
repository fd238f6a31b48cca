//! Collaborator seams consumed by the parsing core.
//!
//! The parser never does I/O or holds global state, so everything it
//! needs from the outside world — URL resolution against the indexer's
//! base, language normalization, a place to send non-fatal warnings —
//! comes in through these traits at construction time. Default
//! implementations cover the common case; tests inject their own.

use serde::Serialize;
use url::Url;

/// Resolves possibly-relative URL strings from a feed into absolute form.
pub trait UrlResolver: Send + Sync {
    /// Resolves `maybe_relative` to an absolute URL string. Absolute
    /// input passes through unchanged; input that cannot be resolved is
    /// returned as-is (the dialect decides what to do with it).
    fn resolve(&self, maybe_relative: &str) -> String;
}

/// Resolves relative paths against a configured indexer base URL.
#[derive(Debug, Clone)]
pub struct IndexerUrls {
    base: Url,
}

impl IndexerUrls {
    /// # Errors
    ///
    /// Returns `url::ParseError` when the base URL itself is invalid.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
        })
    }
}

impl UrlResolver for IndexerUrls {
    fn resolve(&self, maybe_relative: &str) -> String {
        let raw = maybe_relative.trim();
        if raw.is_empty() {
            return String::new();
        }
        if Url::parse(raw).is_ok() {
            return raw.to_string();
        }
        match self.base.join(raw) {
            Ok(url) => url.to_string(),
            Err(error) => {
                tracing::debug!(%error, url = raw, "Could not resolve URL against indexer base");
                raw.to_string()
            }
        }
    }
}

/// A canonical language, as produced by the language resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub id: i32,
    pub name: &'static str,
}

/// Maps free-text language names or ISO 639 codes to canonical languages.
pub trait LanguageResolver: Send + Sync {
    /// Returns the canonical language for `name`, or `None` when the
    /// name does not resolve. Unresolved names are dropped by the
    /// dialect, never defaulted.
    fn find_by_name(&self, name: &str) -> Option<Language>;
}

/// English name, ISO 639-1 code, ISO 639-2 code, canonical language.
/// Matching is case-insensitive on all three keys.
const ISO_LANGUAGES: &[(&str, &str, &str, Language)] = &[
    ("english", "en", "eng", Language { id: 1, name: "English" }),
    ("french", "fr", "fra", Language { id: 2, name: "French" }),
    ("spanish", "es", "spa", Language { id: 3, name: "Spanish" }),
    ("german", "de", "deu", Language { id: 4, name: "German" }),
    ("italian", "it", "ita", Language { id: 5, name: "Italian" }),
    ("danish", "da", "dan", Language { id: 6, name: "Danish" }),
    ("dutch", "nl", "nld", Language { id: 7, name: "Dutch" }),
    ("japanese", "ja", "jpn", Language { id: 8, name: "Japanese" }),
    ("chinese", "zh", "zho", Language { id: 10, name: "Chinese" }),
    ("russian", "ru", "rus", Language { id: 11, name: "Russian" }),
    ("polish", "pl", "pol", Language { id: 12, name: "Polish" }),
    ("swedish", "sv", "swe", Language { id: 14, name: "Swedish" }),
    ("norwegian", "no", "nor", Language { id: 15, name: "Norwegian" }),
    ("finnish", "fi", "fin", Language { id: 16, name: "Finnish" }),
    ("turkish", "tr", "tur", Language { id: 17, name: "Turkish" }),
    ("portuguese", "pt", "por", Language { id: 18, name: "Portuguese" }),
    ("greek", "el", "ell", Language { id: 20, name: "Greek" }),
    ("korean", "ko", "kor", Language { id: 21, name: "Korean" }),
    ("hungarian", "hu", "hun", Language { id: 22, name: "Hungarian" }),
    ("hebrew", "he", "heb", Language { id: 23, name: "Hebrew" }),
    ("czech", "cs", "ces", Language { id: 25, name: "Czech" }),
    ("arabic", "ar", "ara", Language { id: 26, name: "Arabic" }),
];

/// Static ISO 639 lookup table covering the languages indexers commonly
/// tag releases with.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoLanguages;

impl LanguageResolver for IsoLanguages {
    fn find_by_name(&self, name: &str) -> Option<Language> {
        let needle = name.trim();
        if needle.is_empty() {
            return None;
        }
        ISO_LANGUAGES
            .iter()
            .find(|(english, two, three, _)| {
                needle.eq_ignore_ascii_case(english)
                    || needle.eq_ignore_ascii_case(two)
                    || needle.eq_ignore_ascii_case(three)
            })
            .map(|(_, _, _, language)| *language)
    }
}

/// Receives non-fatal warnings from the parsing pipeline. Fire-and-forget:
/// implementations must never affect control flow.
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Default sink that forwards warnings to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_relative_against_base() {
        let urls = IndexerUrls::new("https://indexer.example/api/").unwrap();
        assert_eq!(
            urls.resolve("/download/123.torrent"),
            "https://indexer.example/download/123.torrent"
        );
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let urls = IndexerUrls::new("https://indexer.example/").unwrap();
        assert_eq!(
            urls.resolve("https://other.example/file.torrent"),
            "https://other.example/file.torrent"
        );
        let magnet = "magnet:?xt=urn:btih:abcdef";
        assert_eq!(urls.resolve(magnet), magnet);
    }

    #[test]
    fn test_resolve_empty_stays_empty() {
        let urls = IndexerUrls::new("https://indexer.example/").unwrap();
        assert_eq!(urls.resolve(""), "");
        assert_eq!(urls.resolve("   "), "");
    }

    #[test]
    fn test_language_by_name_case_insensitive() {
        let iso = IsoLanguages;
        assert_eq!(iso.find_by_name("English").map(|l| l.id), Some(1));
        assert_eq!(iso.find_by_name("GERMAN").map(|l| l.id), Some(4));
        assert_eq!(iso.find_by_name("german").map(|l| l.id), Some(4));
    }

    #[test]
    fn test_language_by_iso_code() {
        let iso = IsoLanguages;
        assert_eq!(iso.find_by_name("ja").map(|l| l.name), Some("Japanese"));
        assert_eq!(iso.find_by_name("jpn").map(|l| l.name), Some("Japanese"));
    }

    #[test]
    fn test_unknown_language_is_none() {
        let iso = IsoLanguages;
        assert_eq!(iso.find_by_name("XYZZY-NOT-A-LANGUAGE"), None);
        assert_eq!(iso.find_by_name(""), None);
    }
}
