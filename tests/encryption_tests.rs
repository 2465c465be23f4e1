//! Encrypted-document round trips: the fixtures are built with the
//! same published derivation algorithms the handler verifies against,
//! then parsed end to end.

mod common;

use common::{PdfBuilder, hex};
use pdfsift::encryption::algorithms::{
    compute_encryption_key, object_key, user_value_r2, user_value_r3,
};
use pdfsift::encryption::rc4_crypt;
use pdfsift::{Error, Parser};

const OWNER_HASH: [u8; 32] = [0x41; 32];
const PERMISSIONS: i32 = -44;
const FILE_ID: &[u8] = b"0123456789abcdef";

/// AES-128-CBC encryption with PKCS#7 padding, IV prepended, for
/// building fixtures.
fn aes_encrypt(key: &[u8], iv: [u8; 16], plaintext: &[u8]) -> Vec<u8> {
    use aes::cipher::{BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
    type Enc = cbc::Encryptor<aes::Aes128>;

    let pad = 16 - plaintext.len() % 16;
    let mut buffer = plaintext.to_vec();
    buffer.extend(std::iter::repeat(pad as u8).take(pad));
    let len = buffer.len();
    let cipher = Enc::new(key.into(), (&iv[..]).into());
    cipher
        .encrypt_padded_mut::<NoPadding>(&mut buffer, len)
        .unwrap();

    let mut out = iv.to_vec();
    out.extend_from_slice(&buffer);
    out
}

fn rc4_document(password: &[u8]) -> Vec<u8> {
    let key = compute_encryption_key(
        password,
        &OWNER_HASH,
        PERMISSIONS,
        FILE_ID,
        2,
        5,
        true,
    );
    let u = user_value_r2(&key);

    let mut b = PdfBuilder::new();
    // encrypted string value
    let lang = rc4_crypt(&object_key(&key, 12, 0, false), b"en-US");
    b.object(12, &format!("<< /Lang <{}> >>", hex(&lang)));
    // encrypted stream, no filters
    let cid = b"/CIDInit /ProcSet findresource begin";
    let payload = rc4_crypt(&object_key(&key, 8, 0, false), cid);
    b.stream_object(8, &format!("<< /Length {} >>", payload.len()), &payload);
    // the encryption dictionary itself
    b.object(
        20,
        &format!(
            "<< /Filter /Standard /V 1 /R 2 /O <{}> /U <{}> /P {} >>",
            hex(&OWNER_HASH),
            hex(&u),
            PERMISSIONS
        ),
    );
    b.finish_with_table(&format!(
        "/Encrypt 20 0 R /ID [ <{}> <{}> ]",
        hex(FILE_ID),
        hex(FILE_ID)
    ))
}

#[test]
fn test_rc4_document_decrypts_strings_and_streams() {
    let mut parser = Parser::new(rc4_document(b"hunter2"));
    parser.load(b"hunter2").expect("correct password");

    let object = parser.read_object(12);
    let lang = object.value.as_dict().unwrap().get("Lang").unwrap();
    assert_eq!(lang.as_string(), Some(&b"en-US"[..]));

    let object = parser.read_object(8);
    let data = object.stream_data().unwrap();
    assert!(data.starts_with(b"/CIDInit"));
}

#[test]
fn test_empty_password_document() {
    let mut parser = Parser::new(rc4_document(b""));
    parser.load(b"").expect("empty password");
    let object = parser.read_object(12);
    let lang = object.value.as_dict().unwrap().get("Lang").unwrap();
    assert_eq!(lang.as_string(), Some(&b"en-US"[..]));
}

#[test]
fn test_wrong_password_is_fatal() {
    let mut parser = Parser::new(rc4_document(b"hunter2"));
    let result = parser.load(b"wrong");
    assert!(matches!(result, Err(Error::PasswordIncorrect)));
}

#[test]
fn test_encryption_dictionary_is_never_decrypted() {
    let key = compute_encryption_key(b"", &OWNER_HASH, PERMISSIONS, FILE_ID, 2, 5, true);
    let u = user_value_r2(&key);

    let mut parser = Parser::new(rc4_document(b""));
    parser.load(b"").unwrap();

    // the stored /U comes back byte-identical, not cipher-mangled
    let encrypt = parser.read_object(20);
    let stored_u = encrypt.value.as_dict().unwrap().get("U").unwrap();
    assert_eq!(stored_u.as_string(), Some(&u[..]));
}

#[test]
fn test_unsupported_revision_is_fatal() {
    let mut b = PdfBuilder::new();
    b.object(
        20,
        &format!(
            "<< /Filter /Standard /V 5 /R 6 /O <{}> /U <{}> /P {} >>",
            hex(&OWNER_HASH),
            hex(&[0u8; 48]),
            PERMISSIONS
        ),
    );
    let data = b.finish_with_table(&format!("/Encrypt 20 0 R /ID [ <{}> <{}> ]", hex(FILE_ID), hex(FILE_ID)));

    let mut parser = Parser::new(data);
    assert!(matches!(
        parser.load(b""),
        Err(Error::UnsupportedEncryption(_))
    ));
}

fn aes_document() -> Vec<u8> {
    let key = compute_encryption_key(b"", &OWNER_HASH, PERMISSIONS, FILE_ID, 4, 16, true);
    let mut u = user_value_r3(&key, FILE_ID);
    u.extend_from_slice(&[0u8; 16]);

    let mut b = PdfBuilder::new();
    // AES-encrypted stream: the first 16 payload bytes are the IV
    let payload = aes_encrypt(
        &object_key(&key, 5, 0, true),
        [7u8; 16],
        b"exfiltrated payload bytes",
    );
    b.stream_object(5, &format!("<< /Length {} >>", payload.len()), &payload);
    // AES-encrypted string
    let secret = aes_encrypt(&object_key(&key, 6, 0, true), [9u8; 16], b"aes string");
    b.object(6, &format!("<< /S <{}> >>", hex(&secret)));
    // a stream that opts out through a per-stream Identity crypt filter
    b.stream_object(
        7,
        "<< /Filter /Crypt /DecodeParms << /Name /Identity >> >>",
        b"left in the clear",
    );
    b.object(
        20,
        &format!(
            "<< /Filter /Standard /V 4 /R 4 /Length 128 /O <{}> /U <{}> /P {} \
             /CF << /StdCF << /CFM /AESV2 /AuthEvent /DocOpen /Length 16 >> >> \
             /StmF /StdCF /StrF /StdCF >>",
            hex(&OWNER_HASH),
            hex(&u),
            PERMISSIONS
        ),
    );
    b.finish_with_table(&format!(
        "/Encrypt 20 0 R /ID [ <{}> <{}> ]",
        hex(FILE_ID),
        hex(FILE_ID)
    ))
}

#[test]
fn test_aes_document_decrypts_streams_and_strings() {
    let mut parser = Parser::new(aes_document());
    parser.load(b"").expect("empty password");

    let object = parser.read_object(5);
    assert_eq!(object.stream_data(), Some(&b"exfiltrated payload bytes"[..]));

    let object = parser.read_object(6);
    let s = object.value.as_dict().unwrap().get("S").unwrap();
    assert_eq!(s.as_string(), Some(&b"aes string"[..]));
}

#[test]
fn test_per_stream_identity_crypt_filter() {
    let mut parser = Parser::new(aes_document());
    parser.load(b"").unwrap();

    // the /Crypt filter picked Identity and dropped out of the chain
    let object = parser.read_object(7);
    assert_eq!(object.stream_data(), Some(&b"left in the clear"[..]));
}

#[test]
fn test_malformed_aes_payload_degrades_to_raw_bytes() {
    let key = compute_encryption_key(b"", &OWNER_HASH, PERMISSIONS, FILE_ID, 4, 16, true);
    let mut u = user_value_r3(&key, FILE_ID);
    u.extend_from_slice(&[0u8; 16]);

    let mut b = PdfBuilder::new();
    // far too short to contain an IV
    b.stream_object(5, "<< /Length 5 >>", b"stub!");
    b.object(
        20,
        &format!(
            "<< /Filter /Standard /V 4 /R 4 /Length 128 /O <{}> /U <{}> /P {} \
             /CF << /StdCF << /CFM /AESV2 >> >> /StmF /StdCF /StrF /StdCF >>",
            hex(&OWNER_HASH),
            hex(&u),
            PERMISSIONS
        ),
    );
    let data = b.finish_with_table(&format!(
        "/Encrypt 20 0 R /ID [ <{}> <{}> ]",
        hex(FILE_ID),
        hex(FILE_ID)
    ));

    let mut parser = Parser::new(data);
    parser.load(b"").unwrap();
    // decryption degrades to a no-op instead of aborting the object
    let object = parser.read_object(5);
    assert_eq!(object.stream_data(), Some(&b"stub!"[..]));
}
