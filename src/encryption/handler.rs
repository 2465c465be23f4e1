//! Authenticated security handler and per-object decryptors.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::object::Dictionary;

use super::aes::aes128_cbc_decrypt;
use super::algorithms;
use super::rc4::rc4_crypt;
use super::{CryptMethod, SecuritySettings};

/// The standard security handler after successful password
/// verification. Immutable once built.
#[derive(Debug, Clone)]
pub struct StandardSecurityHandler {
    settings: SecuritySettings,
    encryption_key: Vec<u8>,
}

impl StandardSecurityHandler {
    /// Parse the encryption dictionary, derive the key from `password`
    /// and verify it against /U.
    ///
    /// Fails with [`Error::PasswordIncorrect`] on a mismatch and
    /// [`Error::UnsupportedEncryption`] for schemes outside V 1/2/4,
    /// R 2-4.
    pub fn authenticate(encrypt: &Dictionary, id0: Vec<u8>, password: &[u8]) -> Result<Self> {
        let settings = SecuritySettings::from_dict(encrypt, id0)?;
        let key = algorithms::compute_encryption_key(
            password,
            &settings.o,
            settings.p,
            &settings.id0,
            settings.r,
            settings.length_bytes,
            settings.encrypt_metadata,
        );
        if !algorithms::verify_user_password(&key, &settings.u, &settings.id0, settings.r) {
            return Err(Error::PasswordIncorrect);
        }
        log::debug!(
            "authenticated standard security handler V={} R={} key length {}",
            settings.v,
            settings.r,
            settings.length_bytes
        );
        Ok(Self {
            settings,
            encryption_key: key,
        })
    }

    /// The parsed settings.
    pub fn settings(&self) -> &SecuritySettings {
        &self.settings
    }

    /// The derived file key.
    pub fn encryption_key(&self) -> &[u8] {
        &self.encryption_key
    }

    /// Build the decryptor for one indirect object. Both salted keys
    /// are precomputed so the decryptor is self-contained.
    pub fn object_crypt(&self, number: u32, generation: u16) -> ObjectCrypt {
        ObjectCrypt {
            rc4_key: algorithms::object_key(&self.encryption_key, number, generation, false),
            aes_key: algorithms::object_key(&self.encryption_key, number, generation, true),
            stream_method: self.settings.stream_filter,
            string_method: self.settings.string_filter,
            file_method: self.settings.file_filter,
            named_filters: self.settings.named_filters.clone(),
        }
    }
}

/// Decryptor bound to one indirect object's salted keys.
#[derive(Debug, Clone)]
pub struct ObjectCrypt {
    rc4_key: Vec<u8>,
    aes_key: Vec<u8>,
    stream_method: CryptMethod,
    string_method: CryptMethod,
    file_method: CryptMethod,
    named_filters: HashMap<String, CryptMethod>,
}

impl ObjectCrypt {
    /// Decrypt a string value.
    pub fn decrypt_string(&self, data: &[u8]) -> Vec<u8> {
        self.apply(self.string_method, data)
    }

    /// Decrypt a stream payload.
    ///
    /// `named_override` carries the `/Crypt` filter's `/Name` when the
    /// stream chose its own crypt filter; `embedded_file` switches to
    /// the EFF slot for embedded file streams.
    pub fn decrypt_stream(
        &self,
        data: &[u8],
        named_override: Option<&str>,
        embedded_file: bool,
    ) -> Vec<u8> {
        let method = match named_override {
            Some(name) => match self.named_filters.get(name) {
                Some(m) => *m,
                None => {
                    log::warn!("unknown crypt filter {:?}, treating as Identity", name);
                    CryptMethod::Identity
                },
            },
            None if embedded_file => self.file_method,
            None => self.stream_method,
        };
        self.apply(method, data)
    }

    fn apply(&self, method: CryptMethod, data: &[u8]) -> Vec<u8> {
        match method {
            CryptMethod::Identity => data.to_vec(),
            CryptMethod::Rc4 => rc4_crypt(&self.rc4_key, data),
            CryptMethod::AesV2 => aes128_cbc_decrypt(&self.aes_key, data),
        }
    }
}
