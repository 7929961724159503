use chrono::{TimeZone, Utc};
use pec_parser::*;

const RECEIPT_ENVELOPE: &[u8] = include_bytes!("emails/busta_avvenuta_consegna.eml");

#[test]
fn test_receipt_envelope_headers() {
    let headers = PecHeaders::from_raw(RECEIPT_ENVELOPE).unwrap();

    assert_eq!(headers.receipt, Some(Receipt::AvvenutaConsegna));
    assert_eq!(headers.receipt_type, Some(ReceiptType::Completa));
    assert_eq!(headers.transport, Some(Transport::PostaCertificata));
    assert_eq!(
        headers.reference_message_id.as_deref(),
        Some("<opec21.20171213102100.1234.05.1.1@pec.example.it>")
    );
    assert_eq!(
        headers.date,
        Some(Utc.with_ymd_and_hms(2017, 12, 13, 9, 21, 5).unwrap())
    );
    assert!(headers.is_receipt());
}

#[test]
fn test_plain_message_has_no_pec_headers() {
    let raw = b"From: a@example.it\r\nSubject: Ciao\r\n\r\nCorpo";
    let headers = PecHeaders::from_raw(raw).unwrap();

    assert_eq!(headers, PecHeaders {
        receipt: None,
        receipt_type: None,
        transport: None,
        reference_message_id: None,
        date: None,
    });
    assert!(!headers.is_receipt());
}

#[test]
fn test_unrecognized_values_are_ignored() {
    let raw = b"X-Ricevuta: consegnata-forse\r\n\
                X-Trasporto: errore\r\n\
                X-Riferimento-Message-ID: senza-parentesi\r\n\
                \r\n";
    let headers = PecHeaders::from_raw(raw).unwrap();

    assert_eq!(headers.receipt, None);
    assert_eq!(headers.transport, Some(Transport::Errore));
    assert_eq!(headers.reference_message_id, None);
}

#[test]
fn test_header_names_are_case_insensitive() {
    let raw = b"x-ricevuta: non-accettazione\r\nx-tiporicevuta: sintetica\r\n\r\n";
    let headers = PecHeaders::from_raw(raw).unwrap();

    assert_eq!(headers.receipt, Some(Receipt::NonAccettazione));
    assert_eq!(headers.receipt_type, Some(ReceiptType::Sintetica));
}

// --- enums ---

#[test]
fn test_receipt_round_trip_spelling() {
    for receipt in [
        Receipt::NonAccettazione,
        Receipt::Accettazione,
        Receipt::PreavvisoErroreConsegna,
        Receipt::PresaInCarico,
        Receipt::RilevazioneVirus,
        Receipt::ErroreConsegna,
        Receipt::AvvenutaConsegna,
    ] {
        assert_eq!(receipt.to_string().parse::<Receipt>().unwrap(), receipt);
    }
}

#[test]
fn test_receipt_failure_kinds() {
    assert!(Receipt::ErroreConsegna.is_failure());
    assert!(Receipt::RilevazioneVirus.is_failure());
    assert!(!Receipt::AvvenutaConsegna.is_failure());
    assert!(!Receipt::PresaInCarico.is_failure());
}

#[test]
fn test_receipt_invalid_value() {
    let err = "consegnata".parse::<Receipt>().unwrap_err();
    assert!(matches!(err, ParseError::InvalidHeader { .. }));
    assert!(err.to_string().contains("X-Ricevuta"));
}

#[test]
fn test_serde_spelling_matches_headers() {
    assert_eq!(
        serde_json::to_string(&Receipt::PreavvisoErroreConsegna).unwrap(),
        "\"preavviso-errore-consegna\""
    );
    assert_eq!(
        serde_json::to_string(&Transport::PostaCertificata).unwrap(),
        "\"posta-certificata\""
    );
    assert_eq!(
        serde_json::to_string(&ReceiptType::Breve).unwrap(),
        "\"breve\""
    );
}

// --- attachments ---

#[test]
fn test_service_attachments() {
    assert!(is_service_attachment("daticert.xml"));
    assert!(is_service_attachment("smime.p7s"));
    assert!(is_service_attachment(POSTACERT_FILENAME));
    assert!(is_service_attachment("PostaCert.EML"));
    assert!(!is_service_attachment("fattura.pdf"));
}
