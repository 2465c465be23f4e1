//! FlateDecode implementation.
//!
//! zlib-stream inflate via `flate2`, followed by predictor inversion
//! when `/DecodeParms` asks for one. Hostile files routinely truncate
//! deflate streams or append garbage; whatever inflated before the
//! breakage is kept.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::decoders::{DecodeParams, StreamDecoder, apply_predictor, decode_error};
use crate::error::Result;

/// FlateDecode filter implementation.
pub struct FlateDecoder;

impl StreamDecoder for FlateDecoder {
    fn decode(&self, input: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(input);
        let mut decoded = Vec::new();
        match decoder.read_to_end(&mut decoded) {
            Ok(_) => {},
            Err(e) => {
                // keep a partial inflate, fail only if nothing came out
                if decoded.is_empty() {
                    return Err(decode_error(format!("FlateDecode: {}", e)));
                }
                log::warn!("FlateDecode: stream damaged after {} bytes: {}", decoded.len(), e);
            },
        }
        apply_predictor(decoded, params)
    }

    fn name(&self) -> &str {
        "FlateDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let original = b"hello world\n".repeat(5);
        let compressed = deflate(&original);
        let decoded = FlateDecoder.decode(&compressed, &DecodeParams::default()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_garbage_is_error() {
        let result = FlateDecoder.decode(b"not zlib data", &DecodeParams::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_unsupported_predictor_keeps_inflated_bytes() {
        let original = b"columns of data";
        let compressed = deflate(original);
        let params = DecodeParams {
            predictor: 99,
            ..DecodeParams::default()
        };
        let decoded = FlateDecoder.decode(&compressed, &params).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_png_predictor_applied() {
        // one row of 3 columns, PNG Sub
        let raw = vec![1u8, 10, 10, 10];
        let compressed = deflate(&raw);
        let params = DecodeParams {
            predictor: 11,
            columns: 3,
            ..DecodeParams::default()
        };
        let decoded = FlateDecoder.decode(&compressed, &params).unwrap();
        assert_eq!(decoded, vec![10, 20, 30]);
    }
}
