//! Extraction options

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

/// Upper bound on the boundary table when none is configured
pub const DEFAULT_MAX_BOUNDARIES: usize = 64;

/// What to do with a part whose `Content-Transfer-Encoding` is not recognized
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEncoding {
    /// Append the lowercased encoding token to the stripped body.
    ///
    /// Compatibility only: existing consumers were built against this output.
    #[default]
    AppendToken,

    /// Keep the stripped body unchanged
    Passthrough,
}

/// Tunables for [`crate::MimeFragmentExtractor`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractOptions {
    /// Boundary declarations beyond this count are ignored
    pub max_boundaries: usize,

    pub unknown_encoding: UnknownEncoding,

    /// Strip `Content*` header lines even when no transfer encoding is declared
    pub strip_headers_without_encoding: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_boundaries: DEFAULT_MAX_BOUNDARIES,
            unknown_encoding: UnknownEncoding::default(),
            strip_headers_without_encoding: false,
        }
    }
}

impl ExtractOptions {
    /// Load options from a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| ParseError::Config(e.to_string()))?;

        if options.max_boundaries == 0 {
            return Err(ParseError::Config(
                "max_boundaries must be at least 1".into(),
            ));
        }

        Ok(options)
    }
}
