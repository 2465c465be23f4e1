//! PDF decryption: the standard security handler.
//!
//! Supports V 1/2/4 with revisions 2/3/4: RC4 with 40-128 bit keys and
//! AES-128-CBC through V4 crypt filters. Keys derive from the user
//! password per the standard handler algorithms in `algorithms`; every
//! indirect object then gets its own salted key.
//!
//! Newer schemes (R >= 5 / AES-256) and public-key security handlers
//! are rejected up front with `Error::UnsupportedEncryption` — for a
//! triage tool an honest refusal beats silently wrong plaintext.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::object::Dictionary;

pub mod aes;
pub mod algorithms;
mod handler;
mod rc4;

pub use handler::{ObjectCrypt, StandardSecurityHandler};
pub use rc4::rc4_crypt;

/// How one crypt filter transforms bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptMethod {
    /// Pass-through.
    Identity,
    /// RC4 stream cipher with the object-salted key.
    Rc4,
    /// AES-128-CBC; the first 16 ciphertext bytes are the IV.
    AesV2,
}

/// Parsed `/Encrypt` dictionary plus the first file identifier, frozen
/// before any decryption starts.
#[derive(Debug, Clone)]
pub struct SecuritySettings {
    /// Algorithm version (V).
    pub v: i64,
    /// Standard handler revision (R).
    pub r: i64,
    /// Derived key length in bytes, already clamped to 5..=16.
    pub length_bytes: usize,
    /// Owner password hash (O).
    pub o: Vec<u8>,
    /// User password hash (U).
    pub u: Vec<u8>,
    /// Permission bits (P).
    pub p: i32,
    /// EncryptMetadata flag; false feeds four 0xFF bytes into the key.
    pub encrypt_metadata: bool,
    /// First element of the trailer /ID array.
    pub id0: Vec<u8>,
    /// Default crypt filter for streams.
    pub stream_filter: CryptMethod,
    /// Default crypt filter for strings.
    pub string_filter: CryptMethod,
    /// Default crypt filter for embedded file streams.
    pub file_filter: CryptMethod,
    /// Named crypt filters from /CF; `Identity` is built in.
    pub named_filters: HashMap<String, CryptMethod>,
}

impl SecuritySettings {
    /// Parse an encryption dictionary. `id0` is the first entry of the
    /// trailer `/ID` array (empty when absent).
    pub fn from_dict(encrypt: &Dictionary, id0: Vec<u8>) -> Result<Self> {
        let filter = encrypt
            .get("Filter")
            .and_then(|o| o.as_name())
            .unwrap_or_default();
        if filter != "Standard" {
            return Err(Error::UnsupportedEncryption(format!(
                "security handler {:?}",
                filter
            )));
        }

        let v = encrypt.get("V").and_then(|o| o.as_i64()).unwrap_or(0);
        let r = encrypt.get("R").and_then(|o| o.as_i64()).unwrap_or(0);
        if !matches!(v, 1 | 2 | 4) || !matches!(r, 2 | 3 | 4) {
            return Err(Error::UnsupportedEncryption(format!("V={} R={}", v, r)));
        }

        let o = encrypt
            .get("O")
            .and_then(|o| o.as_string())
            .ok_or_else(|| Error::UnsupportedEncryption("missing /O entry".to_string()))?
            .to_vec();
        let u = encrypt
            .get("U")
            .and_then(|o| o.as_string())
            .ok_or_else(|| Error::UnsupportedEncryption("missing /U entry".to_string()))?
            .to_vec();
        let p = encrypt
            .get("P")
            .and_then(|o| o.as_i64())
            .ok_or_else(|| Error::UnsupportedEncryption("missing /P entry".to_string()))?
            as i32;

        let length_bits = encrypt.get("Length").and_then(|o| o.as_i64()).unwrap_or(40);
        let length_bytes = if r == 2 {
            5
        } else {
            ((length_bits / 8) as usize).clamp(5, 16)
        };

        let encrypt_metadata = encrypt
            .get("EncryptMetadata")
            .and_then(|o| o.as_bool())
            .unwrap_or(true);

        let mut named_filters = HashMap::new();
        named_filters.insert("Identity".to_string(), CryptMethod::Identity);

        let (stream_filter, string_filter, file_filter) = if v == 4 {
            if let Some(cf) = encrypt.get("CF").and_then(|o| o.as_dict()) {
                for (name, value) in cf {
                    let method = value
                        .as_dict()
                        .and_then(|d| d.get("CFM"))
                        .and_then(|o| o.as_name())
                        .unwrap_or("None");
                    named_filters.insert(name.clone(), parse_crypt_method(method)?);
                }
            }
            let slot = |key: &str| -> Result<Option<CryptMethod>> {
                match encrypt.get(key).and_then(|o| o.as_name()) {
                    None => Ok(None),
                    Some(name) => match named_filters.get(name) {
                        Some(m) => Ok(Some(*m)),
                        None => Err(Error::UnsupportedEncryption(format!(
                            "unknown crypt filter {:?}",
                            name
                        ))),
                    },
                }
            };
            let stream = slot("StmF")?.unwrap_or(CryptMethod::Identity);
            let string = slot("StrF")?.unwrap_or(CryptMethod::Identity);
            let file = slot("EFF")?.unwrap_or(stream);
            (stream, string, file)
        } else {
            (CryptMethod::Rc4, CryptMethod::Rc4, CryptMethod::Rc4)
        };

        Ok(Self {
            v,
            r,
            length_bytes,
            o,
            u,
            p,
            encrypt_metadata,
            id0,
            stream_filter,
            string_filter,
            file_filter,
            named_filters,
        })
    }
}

fn parse_crypt_method(name: &str) -> Result<CryptMethod> {
    match name {
        "V2" => Ok(CryptMethod::Rc4),
        "AESV2" => Ok(CryptMethod::AesV2),
        "None" | "Identity" => Ok(CryptMethod::Identity),
        other => Err(Error::UnsupportedEncryption(format!(
            "crypt filter method {:?}",
            other
        ))),
    }
}
