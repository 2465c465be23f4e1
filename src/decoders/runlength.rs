//! RunLengthDecode implementation.
//!
//! A length byte `L` controls each run: `L < 128` copies the next
//! `L + 1` bytes literally, `L > 128` repeats the next byte `257 - L`
//! times, `L == 128` ends the data. Truncated input yields whatever
//! was decoded up to the cut.

use crate::decoders::{DecodeParams, StreamDecoder};
use crate::error::Result;

/// RunLengthDecode filter implementation.
pub struct RunLengthDecoder;

impl StreamDecoder for RunLengthDecoder {
    fn decode(&self, input: &[u8], _params: &DecodeParams) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len());
        let mut i = 0usize;

        while i < input.len() {
            let length = input[i] as usize;
            if length == 128 {
                break;
            }
            i += 1;
            if i >= input.len() {
                break;
            }
            if length < 128 {
                let run = length + 1;
                let end = (i + run).min(input.len());
                output.extend_from_slice(&input[i..end]);
                i = end;
            } else {
                let times = 257 - length;
                let byte = input[i];
                output.extend(std::iter::repeat(byte).take(times));
                i += 1;
            }
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "RunLengthDecode"
    }
}

#[cfg(test)]
/// Run-length encoder for round-trip tests. Emits literal runs of up
/// to 128 bytes and repeat runs for 3+ repeated bytes.
fn run_length_encode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    let mut i = 0usize;
    while i < input.len() {
        // measure the repeat run at i
        let mut run = 1usize;
        while i + run < input.len() && input[i + run] == input[i] && run < 128 {
            run += 1;
        }
        if run >= 3 {
            output.push((257 - run) as u8);
            output.push(input[i]);
            i += run;
            continue;
        }
        // literal run until the next 3-byte repeat or 128 bytes
        let start = i;
        let mut len = 0usize;
        while i < input.len() && len < 128 {
            if i + 2 < input.len() && input[i] == input[i + 1] && input[i] == input[i + 2] {
                break;
            }
            i += 1;
            len += 1;
        }
        output.push((len - 1) as u8);
        output.extend_from_slice(&input[start..i]);
    }
    output.push(128);
    output
}
