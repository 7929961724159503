// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! PEC Parser
//!
//! Reads Italian certified email (PEC, Posta Elettronica Certificata)
//! envelopes and extracts the text of the original message they wrap.
//!
//! # Features
//!
//! - Multipart scanning of the embedded `postacert.eml`
//! - `text/html` and `text/plain` fragments in document order
//! - base64, quoted-printable, 7bit (UTF-7) and 8bit bodies
//! - Receipt and transport metadata from envelope headers
//!
//! # Example
//!
//! ```rust
//! use pec_parser::{FragmentKind, extract_fragments};
//!
//! let postacert = "Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
//!                  \r\n\
//!                  --sep\r\n\
//!                  Content-Type: text/html; charset=UTF-8\r\n\
//!                  Content-Transfer-Encoding: 7bit\r\n\
//!                  \r\n\
//!                  <p>Buongiorno</p>\r\n\
//!                  --sep--\r\n";
//!
//! let fragments = extract_fragments(postacert);
//! let html = fragments.preferred(true).unwrap();
//! assert_eq!(html.kind, FragmentKind::Html);
//! assert_eq!(html.content, "<p>Buongiorno</p>");
//! ```

mod decode;
mod envelope;
mod error;
mod options;
mod parser;
mod types;

pub use decode::{
    TransferEncoding, bytes_to_text, decode_base64, decode_quoted_printable, decode_utf7,
};
pub use envelope::*;
pub use error::{ParseError, Result};
pub use options::*;
pub use parser::{BoundaryDeclaration, MimeFragmentExtractor, MultipartKind, extract_fragments};
pub use types::*;
