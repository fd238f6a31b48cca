//! Parser configuration, optionally loaded from a TOML file.
//!
//! A missing file yields `ParserConfig::default()`. All fields use
//! `#[serde(default)]` so any subset of keys can be specified.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds the maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Enclosure mime-type expectations used by the aggregate feed sanity
/// check. The defaults describe a torrent-protocol indexer; a feed whose
/// enclosures only match the usenet set is probably configured with the
/// wrong protocol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Mime types an on-protocol feed is expected to carry.
    pub preferred_enclosure_types: Vec<String>,

    /// Mime types typical of the *other* protocol family; matching these
    /// produces a pointed "wrong protocol?" diagnostic.
    pub usenet_enclosure_types: Vec<String>,

    /// The single type named in diagnostic messages as the expected one.
    pub torrent_enclosure_type: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            preferred_enclosure_types: vec![
                "application/x-bittorrent".to_string(),
                "application/x-bittorrent;x-scheme-handler/magnet".to_string(),
            ],
            usenet_enclosure_types: vec!["application/x-nzb".to_string()],
            torrent_enclosure_type: "application/x-bittorrent".to_string(),
        }
    }
}

impl ParserConfig {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(ParserConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let config: ParserConfig = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded parser configuration");
        Ok(config)
    }
}
