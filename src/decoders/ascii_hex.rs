//! ASCIIHexDecode implementation.
//!
//! Pairs of hex digits become bytes. Whitespace is skipped, `>` ends
//! the data, an odd trailing digit is padded with `0`, and any other
//! byte is skipped rather than aborting the stream.

use crate::decoders::{DecodeParams, StreamDecoder};
use crate::error::Result;
use crate::lexer::is_whitespace;

/// ASCIIHexDecode filter implementation.
pub struct AsciiHexDecoder;

impl StreamDecoder for AsciiHexDecoder {
    fn decode(&self, input: &[u8], _params: &DecodeParams) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() / 2);
        let mut high: Option<u8> = None;

        for &b in input {
            if b == b'>' {
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            let digit = match hex_value(b) {
                Some(d) => d,
                None => {
                    log::warn!("ASCIIHexDecode: skipping illegal byte 0x{:02x}", b);
                    continue;
                },
            };
            match high.take() {
                None => high = Some(digit),
                Some(h) => output.push(h * 16 + digit),
            }
        }

        // odd trailing digit acts as the high nibble of a final byte
        if let Some(h) = high {
            output.push(h * 16);
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "ASCIIHexDecode"
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
