use pec_parser::*;
use proptest::prelude::*;

// --- TransferEncoding ---

#[test]
fn test_encoding_from_token() {
    assert_eq!(TransferEncoding::from_token("BASE64"), TransferEncoding::Base64);
    assert_eq!(TransferEncoding::from_token("7bit"), TransferEncoding::SevenBit);
    assert_eq!(TransferEncoding::from_token("8Bit"), TransferEncoding::EightBit);
    assert_eq!(
        TransferEncoding::from_token("quoted"),
        TransferEncoding::QuotedPrintable
    );
    assert_eq!(
        TransferEncoding::from_token("Binary"),
        TransferEncoding::Other("binary".into())
    );
}

#[test]
fn test_encoding_display() {
    assert_eq!(TransferEncoding::QuotedPrintable.to_string(), "quoted-printable");
    assert_eq!(TransferEncoding::Other("x-uue".into()).to_string(), "x-uue");
}

#[test]
fn test_eight_bit_is_passthrough() {
    let decoded = TransferEncoding::EightBit
        .decode("perché =E8", UnknownEncoding::AppendToken)
        .unwrap();
    assert_eq!(decoded, "perché =E8");
}

// --- base64 ---

#[test]
fn test_base64_across_lines() {
    let decoded = decode_base64("QnVvbmdp\r\nb3JubyE=\n").unwrap();
    assert_eq!(decoded, "Buongiorno!");
}

#[test]
fn test_base64_without_padding() {
    assert_eq!(decode_base64("Q2lhbw").unwrap(), "Ciao");
}

#[test]
fn test_base64_invalid() {
    let err = decode_base64("Q").unwrap_err();
    assert!(matches!(err, ParseError::Decode(_)));
}

// --- UTF-7 ---

#[test]
fn test_utf7_plain_ascii() {
    assert_eq!(decode_utf7("hello world"), "hello world");
}

#[test]
fn test_utf7_rfc_examples() {
    assert_eq!(decode_utf7("Hi Mom +Jjo-!"), "Hi Mom ☺!");
    assert_eq!(decode_utf7("+ZeVnLIqe-"), "日本語");
    assert_eq!(decode_utf7("A+ImIDkQ."), "A≢Α.");
    assert_eq!(decode_utf7("Item 3 is +AKM-1."), "Item 3 is £1.");
}

#[test]
fn test_utf7_plus_before_digits_is_text() {
    assert_eq!(decode_utf7("Tel. +39 06 1234567"), "Tel. +39 06 1234567");
    assert_eq!(decode_utf7("anno +2024"), "anno +2024");
    assert_eq!(decode_utf7("+2024-"), "+2024-");
}

#[test]
fn test_utf7_unpaired_surrogate_is_text() {
    // "+2D0-" would be a lone high surrogate (U+D83D)
    assert_eq!(decode_utf7("a +2D0- b"), "a +2D0- b");
}

#[test]
fn test_utf7_literal_plus() {
    assert_eq!(decode_utf7("1 +- 1"), "1 + 1");
    assert_eq!(decode_utf7("C++"), "C++");
    assert_eq!(decode_utf7("hello+"), "hello+");
    assert_eq!(decode_utf7("hello+."), "hello+.");
}

// --- quoted-printable ---

#[test]
fn test_quoted_printable_escapes() {
    assert_eq!(
        decode_quoted_printable("perch=C3=A9 =3D").unwrap(),
        "perché =".as_bytes()
    );
}

#[test]
fn test_quoted_printable_soft_breaks() {
    assert_eq!(decode_quoted_printable("un=\r\nico").unwrap(), b"unico");
    assert_eq!(decode_quoted_printable("un=\nico").unwrap(), b"unico");
}

#[test]
fn test_quoted_printable_malformed_escape_kept() {
    assert_eq!(decode_quoted_printable("100=ZZ").unwrap(), b"100=ZZ");
}

#[test]
fn test_quoted_printable_hard_breaks_are_lf() {
    let decoded = TransferEncoding::QuotedPrintable
        .decode("riga uno\nriga =\ndue", UnknownEncoding::AppendToken)
        .unwrap();
    assert_eq!(decoded, "riga uno\nriga due");
}

#[test]
fn test_quoted_printable_latin1_upgrade() {
    let decoded = TransferEncoding::QuotedPrintable
        .decode("Citt=E0", UnknownEncoding::AppendToken)
        .unwrap();
    assert_eq!(decoded, "Città");
}

// --- bytes_to_text ---

#[test]
fn test_bytes_to_text() {
    assert_eq!(bytes_to_text("già".as_bytes().to_vec()), "già");
    assert_eq!(bytes_to_text(vec![b'g', b'i', 0xE0]), "già");
    assert_eq!(bytes_to_text(vec![0x80]), "€");
}

proptest! {
    #[test]
    fn utf7_decoding_never_panics(s in ".*") {
        let _ = decode_utf7(&s);
    }

    #[test]
    fn quoted_printable_never_panics(s in ".*") {
        let _ = decode_quoted_printable(&s);
    }
}
