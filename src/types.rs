//! Core types for extracted message content

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Which textual representation a fragment carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Html,
    Plain,
}

impl FragmentKind {
    /// Subtype as it appears after `text/` in a `Content-Type` header
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Plain => "plain",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FragmentKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Self::Html),
            "plain" => Ok(Self::Plain),
            other => Err(ParseError::InvalidHeader {
                header: "Content-Type".into(),
                details: format!("unsupported text subtype: {other}"),
            }),
        }
    }
}

/// A decoded piece of human-readable content from the original message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fragment {
    /// Decoded text (or the raw part text when no transfer encoding was declared)
    pub content: String,

    /// Declared text subtype
    pub kind: FragmentKind,
}

impl Fragment {
    pub fn new(content: impl Into<String>, kind: FragmentKind) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }

    #[must_use]
    pub const fn is_html(&self) -> bool {
        matches!(self.kind, FragmentKind::Html)
    }
}

/// Fragments of one document, in the order their parts appear.
///
/// Index 0 is the first declared representation of the message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Fragments(Vec<Fragment>);

impl Fragments {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Fragment> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Fragment] {
        &self.0
    }

    /// The original message text.
    ///
    /// Returns the first fragment of the requested representation, or the
    /// first fragment of any kind when the message has none of it.
    #[must_use]
    pub fn preferred(&self, prefer_html: bool) -> Option<&Fragment> {
        let wanted = if prefer_html {
            FragmentKind::Html
        } else {
            FragmentKind::Plain
        };

        self.0
            .iter()
            .find(|f| f.kind == wanted)
            .or_else(|| self.0.first())
    }

    /// Every text of the requested representation, in document order
    #[must_use]
    pub fn texts(&self, prefer_html: bool) -> Vec<&str> {
        self.0
            .iter()
            .filter(|f| f.is_html() == prefer_html)
            .map(|f| f.content.as_str())
            .collect()
    }
}

impl From<Vec<Fragment>> for Fragments {
    fn from(fragments: Vec<Fragment>) -> Self {
        Self(fragments)
    }
}

impl<'a> IntoIterator for &'a Fragments {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Fragments {
    type Item = Fragment;
    type IntoIter = std::vec::IntoIter<Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
