//! Key derivation and password verification for the standard security
//! handler, revisions 2-4.

use md5::{Digest, Md5};

use super::rc4::rc4_crypt;

/// The fixed 32-byte password padding string.
pub const PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

/// Pad or truncate a password to exactly 32 bytes.
pub fn pad_password(password: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    let take = password.len().min(32);
    padded[..take].copy_from_slice(&password[..take]);
    padded[take..].copy_from_slice(&PADDING[..32 - take]);
    padded
}

/// Derive the file encryption key from a user password.
///
/// MD5 over padded-password, O, P as a little-endian u32, ID\[0\], and
/// four 0xFF bytes when R >= 4 with EncryptMetadata false. For R >= 3
/// the first `length_bytes` of the digest are washed through MD5 fifty
/// more times.
pub fn compute_encryption_key(
    password: &[u8],
    o: &[u8],
    p: i32,
    id0: &[u8],
    r: i64,
    length_bytes: usize,
    encrypt_metadata: bool,
) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(pad_password(password));
    hasher.update(o);
    hasher.update((p as u32).to_le_bytes());
    hasher.update(id0);
    if r >= 4 && !encrypt_metadata {
        hasher.update([0xFF, 0xFF, 0xFF, 0xFF]);
    }
    let mut key = hasher.finalize().to_vec();

    if r >= 3 {
        for _ in 0..50 {
            let mut hasher = Md5::new();
            hasher.update(&key[..length_bytes]);
            key = hasher.finalize().to_vec();
        }
    }

    key.truncate(length_bytes);
    key
}

/// Compute the expected /U value for a derived key (revision 2).
pub fn user_value_r2(key: &[u8]) -> Vec<u8> {
    rc4_crypt(key, &PADDING)
}

/// Compute the expected first 16 bytes of /U for a derived key
/// (revision 3 and 4).
pub fn user_value_r3(key: &[u8], id0: &[u8]) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(PADDING);
    hasher.update(id0);
    let mut value = hasher.finalize().to_vec();

    for i in 0..20u8 {
        let pass_key: Vec<u8> = key.iter().map(|b| b ^ i).collect();
        value = rc4_crypt(&pass_key, &value);
    }
    value
}

/// Check a derived key against the stored /U entry.
pub fn verify_user_password(key: &[u8], u: &[u8], id0: &[u8], r: i64) -> bool {
    if r == 2 {
        let expected = user_value_r2(key);
        let take = u.len().min(32);
        take > 0 && expected[..take] == u[..take]
    } else {
        if u.len() < 16 {
            return false;
        }
        user_value_r3(key, id0)[..16] == u[..16]
    }
}

/// Salt the file key for one indirect object: key, the low 3 bytes of
/// the object number, the low 2 bytes of the generation, and for AES
/// the literal `sAlT`; MD5, truncated to min(L + 5, 16) bytes.
pub fn object_key(key: &[u8], number: u32, generation: u16, aes: bool) -> Vec<u8> {
    let mut hasher = Md5::new();
    hasher.update(key);
    hasher.update(&number.to_le_bytes()[..3]);
    hasher.update(generation.to_le_bytes());
    if aes {
        hasher.update(b"sAlT");
    }
    let mut salted = hasher.finalize().to_vec();
    salted.truncate((key.len() + 5).min(16));
    salted
}
