//! LZWDecode implementation.
//!
//! MSB-first LZW with an 8-bit literal width, in the two flavors PDF
//! allows. `/EarlyChange 1` (the default) grows the code width one
//! code early, the TIFF way; `/EarlyChange 0` follows compress(1).
//! `weezl` implements both. Predictor inversion runs afterwards when
//! requested.

use weezl::{BitOrder, decode::Decoder};

use crate::decoders::{DecodeParams, StreamDecoder, apply_predictor, decode_error};
use crate::error::Result;

/// LZWDecode filter implementation.
pub struct LzwDecoder;

impl StreamDecoder for LzwDecoder {
    fn decode(&self, input: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
        let mut decoder = if params.early_change == 0 {
            Decoder::new(BitOrder::Msb, 8)
        } else {
            Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
        };

        let decoded = decoder
            .decode(input)
            .map_err(|e| decode_error(format!("LZWDecode: {:?}", e)))?;

        apply_predictor(decoded, params)
    }

    fn name(&self) -> &str {
        "LZWDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weezl::encode::Encoder;

    #[test]
    fn test_early_change_round_trip() {
        let original = b"hello world!hello world!hello world!";
        let compressed = Encoder::with_tiff_size_switch(BitOrder::Msb, 8)
            .encode(original)
            .unwrap();
        let decoded = LzwDecoder.decode(&compressed, &DecodeParams::default()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_compress_style_round_trip() {
        let original = b"ABABABABABABABAB";
        let compressed = Encoder::new(BitOrder::Msb, 8).encode(original).unwrap();
        let params = DecodeParams {
            early_change: 0,
            ..DecodeParams::default()
        };
        let decoded = LzwDecoder.decode(&compressed, &params).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_garbage_is_error() {
        let result = LzwDecoder.decode(b"\xff\xff\xff\xff", &DecodeParams::default());
        assert!(result.is_err());
    }
}
