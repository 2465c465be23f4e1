//! ASCII85Decode (base-85) implementation.
//!
//! Five characters in `!`..`u` encode four bytes; `z` alone encodes
//! four zero bytes. The decoder is deliberately tolerant: whitespace
//! may appear anywhere, `~` or plain end of input closes a short final
//! group, and a misplaced `z` is skipped rather than killing the
//! stream.

use crate::decoders::{DecodeParams, StreamDecoder, decode_error};
use crate::error::Result;
use crate::lexer::is_whitespace;

/// ASCII85Decode filter implementation.
pub struct Ascii85Decoder;

impl StreamDecoder for Ascii85Decoder {
    fn decode(&self, input: &[u8], _params: &DecodeParams) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() * 4 / 5);
        let mut value: u32 = 0;
        let mut count = 0usize;

        for &b in input {
            if b == b'~' {
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            if b == b'z' {
                if count != 0 {
                    log::warn!("ASCII85Decode: 'z' inside a group, skipping");
                    continue;
                }
                output.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            if !(b'!'..=b'u').contains(&b) {
                return Err(decode_error(format!(
                    "ASCII85Decode: invalid byte 0x{:02x}",
                    b
                )));
            }

            value = value.wrapping_mul(85).wrapping_add((b - b'!') as u32);
            count += 1;
            if count == 5 {
                output.extend_from_slice(&value.to_be_bytes());
                value = 0;
                count = 0;
            }
        }

        // short final group: pad with zeros, emit count-1 bytes
        if count > 1 {
            for _ in count..5 {
                value = value.wrapping_mul(85);
            }
            output.extend_from_slice(&value.to_be_bytes()[..count - 1]);
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "ASCII85Decode"
    }
}
