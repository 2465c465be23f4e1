//! Stream decoder implementations for PDF filters.
//!
//! Supported filters:
//! - ASCIIHexDecode, ASCII85Decode (text encodings)
//! - RunLengthDecode
//! - FlateDecode (zlib), LZWDecode (both EarlyChange variants)
//! - TIFF and PNG predictor inversion after Flate/LZW
//!
//! Filters chain in the order the stream dictionary declares them. The
//! chain never aborts object reading: the first unsupported filter or
//! decode failure stops the chain and the caller receives the output of
//! the last stage that decoded successfully. Anything else would let a
//! single corrupt stream hide the rest of a hostile document.

use crate::error::{Error, Result};
use crate::object::Dictionary;
use crate::parser_config::ParserOptions;

mod ascii85;
mod ascii_hex;
mod flate;
mod lzw;
mod predictor;
mod runlength;

pub use ascii85::Ascii85Decoder;
pub use ascii_hex::AsciiHexDecoder;
pub use flate::FlateDecoder;
pub use lzw::LzwDecoder;
pub use predictor::reverse_predictor;
pub use runlength::RunLengthDecoder;

/// Decode parameters carried by `/DecodeParms`.
#[derive(Debug, Clone)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i64,
    /// Samples per row
    pub columns: i64,
    /// Color components per sample
    pub colors: i64,
    /// Bits per component; only 8 is supported by predictor inversion
    pub bits_per_component: i64,
    /// LZW code-width switch: 1 grows the table one code early
    pub early_change: i64,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            columns: 1,
            colors: 1,
            bits_per_component: 8,
            early_change: 1,
        }
    }
}

impl DecodeParams {
    /// Read parameters out of a `/DecodeParms` dictionary, falling back
    /// to the defaults for anything absent.
    pub fn from_dict(dict: Option<&Dictionary>) -> Self {
        let defaults = Self::default();
        let dict = match dict {
            Some(d) => d,
            None => return defaults,
        };
        let int = |key: &str, fallback: i64| {
            dict.get(key).and_then(|o| o.as_i64()).unwrap_or(fallback)
        };
        Self {
            predictor: int("Predictor", defaults.predictor),
            columns: int("Columns", defaults.columns),
            colors: int("Colors", defaults.colors),
            bits_per_component: int("BitsPerComponent", defaults.bits_per_component),
            early_change: int("EarlyChange", defaults.early_change),
        }
    }
}

/// Trait for PDF stream decoders. Decoders are pure byte-to-byte
/// functions; parameters they do not use are ignored.
pub trait StreamDecoder {
    /// Decode the input data.
    fn decode(&self, input: &[u8], params: &DecodeParams) -> Result<Vec<u8>>;

    /// Filter name as it appears in `/Filter`.
    fn name(&self) -> &str;
}

/// Look up the decoder for a filter name.
pub fn decoder_for(name: &str) -> Option<Box<dyn StreamDecoder>> {
    match name {
        "ASCIIHexDecode" => Some(Box::new(AsciiHexDecoder)),
        "ASCII85Decode" => Some(Box::new(Ascii85Decoder)),
        "RunLengthDecode" => Some(Box::new(RunLengthDecoder)),
        "FlateDecode" => Some(Box::new(FlateDecoder)),
        "LZWDecode" => Some(Box::new(LzwDecoder)),
        _ => None,
    }
}

/// Run the filter chain over `data`.
///
/// `filters` and `parms` are positional: `parms[i]` configures
/// `filters[i]`. The first unsupported filter, decode failure, or
/// resource-limit violation stops the chain; the buffer from the last
/// successful stage is returned.
pub fn decode_chain(
    data: &[u8],
    filters: &[String],
    parms: &[Option<Dictionary>],
    options: &ParserOptions,
) -> Vec<u8> {
    let mut current = data.to_vec();
    let compressed_size = data.len().max(1);

    for (i, name) in filters.iter().enumerate() {
        let params = DecodeParams::from_dict(parms.get(i).and_then(|p| p.as_ref()));
        let decoder = match decoder_for(name) {
            Some(d) => d,
            None => {
                log::warn!("unsupported filter {}, keeping last decoded stage", name);
                break;
            },
        };
        match decoder.decode(&current, &params) {
            Ok(decoded) => {
                if exceeds_limits(decoded.len(), compressed_size, options) {
                    log::warn!(
                        "{} output of {} bytes exceeds decompression limits, keeping last stage",
                        name,
                        decoded.len()
                    );
                    break;
                }
                current = decoded;
            },
            Err(e) => {
                log::warn!("{} failed: {}, keeping last decoded stage", name, e);
                break;
            },
        }
    }
    current
}

fn exceeds_limits(decoded: usize, compressed: usize, options: &ParserOptions) -> bool {
    if options.max_decompressed_size > 0 && decoded > options.max_decompressed_size {
        return true;
    }
    if options.max_decompression_ratio > 0
        && decoded / compressed > options.max_decompression_ratio as usize
    {
        return true;
    }
    false
}

/// Helper shared by Flate and LZW: run predictor inversion, keeping the
/// un-inverted bytes when the predictor is unsupported or broken.
fn apply_predictor(decoded: Vec<u8>, params: &DecodeParams) -> Result<Vec<u8>> {
    if params.predictor == 1 {
        return Ok(decoded);
    }
    match reverse_predictor(&decoded, params) {
        Ok(out) => Ok(out),
        Err(e) => {
            log::warn!("predictor inversion failed: {}, keeping unpredicted data", e);
            Ok(decoded)
        },
    }
}

/// Internal decode error constructor shared by the submodules.
fn decode_error(msg: impl Into<String>) -> Error {
    Error::Decode(msg.into())
}
