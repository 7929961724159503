//! Multipart scanner for the original message attached to a PEC envelope
//!
//! The embedded `postacert.eml` is processed in two passes. The first pass
//! collects every `multipart/mixed` and `multipart/alternative` boundary
//! declared anywhere in the document. The second walks the document line by
//! line, starting a new part on every line that is exactly a delimiter.
//! Parts declaring `text/html` or `text/plain` are then decoded according to
//! their `Content-Transfer-Encoding`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::decode::{TransferEncoding, bytes_to_text};
use crate::options::ExtractOptions;
use crate::types::{Fragment, FragmentKind, Fragments};

// Boundary characters are more permissive than RFC 2046 allows: real
// generators emit '@' and '\' too.
static MULTIPART_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"Content-Type: multipart/(mixed|alternative);\s+boundary="([A-Za-z0-9_\\'()+,./:=?@-]+)""#,
    )
    .unwrap()
});

static TEXT_TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Content-Type: text/(html|plain)").unwrap());

static TRANSFER_ENCODING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Content-Transfer-Encoding: ([A-Za-z0-9_]+)").unwrap());

/// Multipart subtype that declared a boundary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MultipartKind {
    Mixed,
    Alternative,
}

impl fmt::Display for MultipartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixed => f.write_str("mixed"),
            Self::Alternative => f.write_str("alternative"),
        }
    }
}

/// A boundary declared by a `Content-Type: multipart/...` header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundaryDeclaration {
    pub kind: MultipartKind,

    /// Delimiter line: `--` followed by the boundary token
    pub delimiter: String,
}

impl BoundaryDeclaration {
    #[must_use]
    pub fn new(kind: MultipartKind, token: &str) -> Self {
        Self {
            kind,
            delimiter: format!("--{token}"),
        }
    }

    /// The boundary token as declared
    #[must_use]
    pub fn token(&self) -> &str {
        self.delimiter.strip_prefix("--").unwrap_or(&self.delimiter)
    }
}

/// Text fragments of an embedded message, computed once at construction.
///
/// # Example
///
/// ```rust
/// use pec_parser::{FragmentKind, MimeFragmentExtractor};
///
/// let raw = "Content-Type: multipart/alternative; boundary=\"b1\"\n\
///            \n\
///            --b1\n\
///            Content-Type: text/plain; charset=UTF-8\n\
///            Content-Transfer-Encoding: 7bit\n\
///            \n\
///            Ciao\n\
///            --b1--\n";
///
/// let extractor = MimeFragmentExtractor::new(raw);
/// let first = extractor.fragments().get(0).unwrap();
/// assert_eq!(first.content, "Ciao");
/// assert_eq!(first.kind, FragmentKind::Plain);
/// ```
#[derive(Debug, Clone)]
pub struct MimeFragmentExtractor {
    boundaries: Vec<BoundaryDeclaration>,
    fragments: Fragments,
}

impl MimeFragmentExtractor {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self::with_options(raw, &ExtractOptions::default())
    }

    #[must_use]
    pub fn with_options(raw: &str, options: &ExtractOptions) -> Self {
        let boundaries = discover_boundaries(raw, options.max_boundaries);
        let parts = split_parts(raw, &boundaries);
        let terminals = terminal_delimiters(&boundaries);

        let fragments: Vec<Fragment> = parts
            .iter()
            .filter_map(|part| extract_fragment(part, terminals.as_ref(), options))
            .collect();

        debug!(
            "Extracted {} fragments from {} parts ({} boundaries)",
            fragments.len(),
            parts.len(),
            boundaries.len()
        );

        Self {
            boundaries,
            fragments: fragments.into(),
        }
    }

    /// Accept raw `.eml` bytes; non-UTF-8 input is read as Windows-1252.
    #[must_use]
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self::new(&bytes_to_text(raw.to_vec()))
    }

    #[must_use]
    pub const fn fragments(&self) -> &Fragments {
        &self.fragments
    }

    #[must_use]
    pub fn boundaries(&self) -> &[BoundaryDeclaration] {
        &self.boundaries
    }

    #[must_use]
    pub fn into_fragments(self) -> Fragments {
        self.fragments
    }
}

/// Extract the text fragments of an embedded message with default options
#[must_use]
pub fn extract_fragments(raw: &str) -> Fragments {
    MimeFragmentExtractor::new(raw).into_fragments()
}

fn discover_boundaries(raw: &str, max: usize) -> Vec<BoundaryDeclaration> {
    let mut boundaries = Vec::new();

    for caps in MULTIPART_REGEX.captures_iter(raw) {
        if boundaries.len() >= max {
            warn!("Boundary table full at {max} entries, ignoring further declarations");
            break;
        }

        let kind = if &caps[1] == "mixed" {
            MultipartKind::Mixed
        } else {
            MultipartKind::Alternative
        };
        boundaries.push(BoundaryDeclaration::new(kind, &caps[2]));
    }

    debug!("Discovered {} multipart boundaries", boundaries.len());
    boundaries
}

/// Split on delimiter lines. Part 0 is whatever precedes the first delimiter.
fn split_parts(raw: &str, boundaries: &[BoundaryDeclaration]) -> Vec<String> {
    let delimiters: HashSet<&str> = boundaries.iter().map(|b| b.delimiter.as_str()).collect();
    let mut parts = vec![String::new()];

    for line in lines(raw) {
        if delimiters.contains(trim_ws(line)) {
            parts.push(String::new());
            continue;
        }

        if let Some(current) = parts.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }

    parts
}

fn extract_fragment(
    part: &str,
    terminals: Option<&Regex>,
    options: &ExtractOptions,
) -> Option<Fragment> {
    let kind: FragmentKind = TEXT_TYPE_REGEX.captures(part)?[1].parse().ok()?;
    let cleaned = match terminals {
        Some(terminals) => terminals.replace_all(part, "").into_owned(),
        None => part.to_owned(),
    };

    let Some(encoding) = TRANSFER_ENCODING_REGEX
        .captures(&cleaned)
        .map(|caps| TransferEncoding::from_token(&caps[1]))
    else {
        let content = if options.strip_headers_without_encoding {
            strip_content_headers(&cleaned)
        } else {
            cleaned
        };
        return Some(Fragment::new(content, kind));
    };

    let body = strip_content_headers(&cleaned);
    let content = match encoding.decode(&body, options.unknown_encoding) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Keeping undecoded {kind} fragment ({encoding}): {e}");
            body
        }
    };

    debug!(
        "Decoded {kind} fragment ({encoding}), {} bytes",
        content.len()
    );
    Some(Fragment::new(content, kind))
}

/// One pattern matching the closing delimiter (`--token--` plus line break)
/// of every known section, longest first so nested tokens sharing a prefix
/// match whole.
fn terminal_delimiters(boundaries: &[BoundaryDeclaration]) -> Option<Regex> {
    if boundaries.is_empty() {
        return None;
    }

    let mut delimiters: Vec<&str> = boundaries.iter().map(|b| b.delimiter.as_str()).collect();
    delimiters.sort_by_key(|d| std::cmp::Reverse(d.len()));
    let pattern = delimiters
        .iter()
        .map(|d| format!("{}--\n", regex::escape(d)))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&pattern)
        .map_err(|e| warn!("Closing delimiters left in place: {e}"))
        .ok()
}

/// Blank every `Content*` header line, with its folded continuation lines,
/// then trim what is left.
fn strip_content_headers(text: &str) -> String {
    let mut in_header = false;
    let stripped: Vec<&str> = text
        .split('\n')
        .map(|line| {
            if line.starts_with("Content") {
                in_header = true;
                ""
            } else if in_header && line.starts_with([' ', '\t']) {
                ""
            } else {
                in_header = false;
                line
            }
        })
        .collect();

    trim_ws(&stripped.join("\n")).to_owned()
}

/// Lines separated by `\n`, `\r\n` or a lone `\r`.
///
/// A trailing line break yields a final empty line.
fn lines(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }

        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    let line = &text[start..i];
                    start = i + 1;
                    return Some(line);
                }
                b'\r' => {
                    let line = &text[start..i];
                    start = i + 1;
                    if bytes.get(start) == Some(&b'\n') {
                        start += 1;
                    }
                    return Some(line);
                }
                _ => i += 1,
            }
        }

        done = true;
        Some(&text[start..])
    })
}

fn trim_ws(s: &str) -> &str {
    s.trim_matches([' ', '\t', '\n', '\r', '\0', '\x0B'])
}
