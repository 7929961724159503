//! PEC envelope metadata
//!
//! The provider's envelope carries the receipt and transport details in
//! `X-` headers, and the original message as the `postacert.eml`
//! attachment. Fetching the envelope is left to the mail client.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{ParseError, Result};

/// Attachment holding the original message
pub const POSTACERT_FILENAME: &str = "postacert.eml";

/// Attachments added by the PEC provider rather than the sender
pub const SERVICE_ATTACHMENTS: [&str; 3] = ["daticert.xml", "smime.p7s", POSTACERT_FILENAME];

static MESSAGE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\S+>").unwrap());

/// Whether an attachment was added by the provider (certificate data,
/// signature, or the wrapped original message)
#[must_use]
pub fn is_service_attachment(filename: &str) -> bool {
    SERVICE_ATTACHMENTS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(filename.trim()))
}

/// Receipt kind (`X-Ricevuta`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Receipt {
    NonAccettazione,
    Accettazione,
    PreavvisoErroreConsegna,
    PresaInCarico,
    RilevazioneVirus,
    ErroreConsegna,
    AvvenutaConsegna,
}

impl Receipt {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NonAccettazione => "non-accettazione",
            Self::Accettazione => "accettazione",
            Self::PreavvisoErroreConsegna => "preavviso-errore-consegna",
            Self::PresaInCarico => "presa-in-carico",
            Self::RilevazioneVirus => "rilevazione-virus",
            Self::ErroreConsegna => "errore-consegna",
            Self::AvvenutaConsegna => "avvenuta-consegna",
        }
    }

    /// Receipts reporting that the message did not reach its recipient
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            Self::NonAccettazione
                | Self::PreavvisoErroreConsegna
                | Self::RilevazioneVirus
                | Self::ErroreConsegna
        )
    }
}

impl FromStr for Receipt {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "non-accettazione" => Ok(Self::NonAccettazione),
            "accettazione" => Ok(Self::Accettazione),
            "preavviso-errore-consegna" => Ok(Self::PreavvisoErroreConsegna),
            "presa-in-carico" => Ok(Self::PresaInCarico),
            "rilevazione-virus" => Ok(Self::RilevazioneVirus),
            "errore-consegna" => Ok(Self::ErroreConsegna),
            "avvenuta-consegna" => Ok(Self::AvvenutaConsegna),
            other => Err(invalid("X-Ricevuta", other)),
        }
    }
}

/// Receipt detail requested by the sender (`X-TipoRicevuta`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptType {
    Completa,
    Breve,
    Sintetica,
}

impl ReceiptType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completa => "completa",
            Self::Breve => "breve",
            Self::Sintetica => "sintetica",
        }
    }
}

impl FromStr for ReceiptType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "completa" => Ok(Self::Completa),
            "breve" => Ok(Self::Breve),
            "sintetica" => Ok(Self::Sintetica),
            other => Err(invalid("X-TipoRicevuta", other)),
        }
    }
}

/// Envelope transport (`X-Trasporto`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    PostaCertificata,
    Errore,
}

impl Transport {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostaCertificata => "posta-certificata",
            Self::Errore => "errore",
        }
    }
}

impl FromStr for Transport {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "posta-certificata" => Ok(Self::PostaCertificata),
            "errore" => Ok(Self::Errore),
            other => Err(invalid("X-Trasporto", other)),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Receipt, ReceiptType, Transport);

fn invalid(header: &str, value: &str) -> ParseError {
    ParseError::InvalidHeader {
        header: header.into(),
        details: format!("unexpected value: {value}"),
    }
}

/// Metadata read from the envelope's headers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PecHeaders {
    /// `X-Ricevuta`
    pub receipt: Option<Receipt>,

    /// `X-TipoRicevuta`
    pub receipt_type: Option<ReceiptType>,

    /// `X-Trasporto`
    pub transport: Option<Transport>,

    /// `X-Riferimento-Message-ID`: the `Message-ID` of the message a
    /// receipt refers to
    pub reference_message_id: Option<String>,

    pub date: Option<DateTime<Utc>>,
}

impl PecHeaders {
    /// Parse the raw header block of a PEC envelope.
    ///
    /// Absent or unrecognized values are left as `None`.
    pub fn from_raw(raw_headers: &[u8]) -> Result<Self> {
        let (headers, _) = mailparse::parse_headers(raw_headers)?;

        let receipt = parse_header(&headers, "X-Ricevuta");
        let receipt_type = parse_header(&headers, "X-TipoRicevuta");
        let transport = parse_header(&headers, "X-Trasporto");

        let reference_message_id = header_value(&headers, "X-Riferimento-Message-ID")
            .and_then(|v| MESSAGE_ID_REGEX.find(&v).map(|m| m.as_str().to_string()));

        let date = header_value(&headers, "Date")
            .and_then(|v| DateTime::parse_from_rfc2822(v.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc));

        debug!("PEC envelope: receipt={receipt:?} transport={transport:?}");

        Ok(Self {
            receipt,
            receipt_type,
            transport,
            reference_message_id,
            date,
        })
    }

    /// Whether this envelope is a provider receipt rather than a delivered message
    #[must_use]
    pub const fn is_receipt(&self) -> bool {
        self.receipt.is_some()
    }
}

fn header_value(headers: &[mailparse::MailHeader], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|h| h.get_key().eq_ignore_ascii_case(name))
        .map(mailparse::MailHeader::get_value)
}

fn parse_header<T>(headers: &[mailparse::MailHeader], name: &str) -> Option<T>
where
    T: FromStr<Err = ParseError>,
{
    header_value(headers, name)?
        .parse()
        .map_err(|e| debug!("Ignoring envelope header: {e}"))
        .ok()
}
