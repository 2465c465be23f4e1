//! AES-128-CBC decryption for V4 crypt filters.
//!
//! Ciphertext layout per the PDF convention: the first 16 bytes are the
//! IV, the remainder is the CBC payload with PKCS#7 padding. Malformed
//! ciphertext never aborts object reading — a hostile file that lies
//! about its encryption gets its bytes passed through untouched, which
//! keeps the rest of the document reachable.

use aes::Aes128;
use aes::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
use cbc::Decryptor;

type Aes128CbcDec = Decryptor<Aes128>;

/// Decrypt AES-128-CBC data whose first 16 bytes are the IV.
///
/// Structural problems (short key, missing IV, ragged block length,
/// bad padding) degrade to returning the input or the unpadded block
/// output instead of failing.
pub fn aes128_cbc_decrypt(key: &[u8], data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }
    if key.len() != 16 || data.len() < 16 {
        log::warn!("AES: malformed key or missing IV, passing data through");
        return data.to_vec();
    }
    let (iv, ciphertext) = data.split_at(16);
    if ciphertext.is_empty() {
        return Vec::new();
    }
    if ciphertext.len() % 16 != 0 {
        log::warn!("AES: ciphertext not block aligned, passing data through");
        return data.to_vec();
    }

    let mut buffer = ciphertext.to_vec();
    let cipher = Aes128CbcDec::new(key.into(), iv.into());
    if cipher.decrypt_padded_mut::<NoPadding>(&mut buffer).is_err() {
        log::warn!("AES: block decryption failed, passing data through");
        return data.to_vec();
    }

    strip_pkcs7(buffer)
}

/// Remove PKCS#7 padding; leave the buffer alone when the padding is
/// nonsense.
fn strip_pkcs7(mut data: Vec<u8>) -> Vec<u8> {
    let Some(&last) = data.last() else {
        return data;
    };
    let pad = last as usize;
    if pad == 0 || pad > 16 || pad > data.len() {
        log::warn!("AES: invalid padding length {}, keeping raw block output", pad);
        return data;
    }
    if data[data.len() - pad..].iter().any(|&b| b != last) {
        log::warn!("AES: inconsistent padding, keeping raw block output");
        return data;
    }
    data.truncate(data.len() - pad);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockEncryptMut;
    use cbc::Encryptor;

    type Aes128CbcEnc = Encryptor<Aes128>;

    fn encrypt(key: &[u8; 16], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
        let pad = 16 - plaintext.len() % 16;
        let mut buffer = plaintext.to_vec();
        buffer.extend(std::iter::repeat(pad as u8).take(pad));
        let len = buffer.len();
        let cipher = Aes128CbcEnc::new((&key[..]).into(), (&iv[..]).into());
        cipher
            .encrypt_padded_mut::<NoPadding>(&mut buffer, len)
            .unwrap();
        let mut out = iv.to_vec();
        out.extend_from_slice(&buffer);
        out
    }

    #[test]
    fn test_round_trip() {
        let key = b"0123456789abcdef";
        let iv = b"fedcba9876543210";
        let plaintext = b"Attack at dawn, or maybe later.";
        let ciphertext = encrypt(key, iv, plaintext);
        assert_eq!(aes128_cbc_decrypt(key, &ciphertext), plaintext);
    }

    #[test]
    fn test_block_aligned_round_trip() {
        let key = b"0123456789abcdef";
        let iv = b"fedcba9876543210";
        let plaintext = b"Exactly16bytes!!";
        let ciphertext = encrypt(key, iv, plaintext);
        assert_eq!(aes128_cbc_decrypt(key, &ciphertext), plaintext);
    }

    #[test]
    fn test_empty_input() {
        assert!(aes128_cbc_decrypt(b"0123456789abcdef", b"").is_empty());
    }

    #[test]
    fn test_short_input_passes_through() {
        let data = b"tooshort";
        assert_eq!(aes128_cbc_decrypt(b"0123456789abcdef", data), data);
    }

    #[test]
    fn test_ragged_length_passes_through() {
        let mut data = vec![0u8; 16]; // IV
        data.extend_from_slice(&[1, 2, 3]); // not a block
        assert_eq!(aes128_cbc_decrypt(b"0123456789abcdef", &data), data);
    }

    #[test]
    fn test_wrong_key_length_passes_through() {
        let data = vec![7u8; 32];
        assert_eq!(aes128_cbc_decrypt(b"short", &data), data);
    }
}
