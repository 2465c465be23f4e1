//! Predictor inversion for Flate and LZW streams.
//!
//! Predictors difference each row against its neighbors before
//! compression; decoding adds the prediction back. Two families exist:
//! TIFF horizontal differencing (predictor 2) and the PNG filters
//! (10-15), where every input row carries a leading tag byte that the
//! output strips. All arithmetic is modulo 256; Paeth intermediates
//! widen to i32 before taking absolute values.

use crate::decoders::DecodeParams;
use crate::error::{Error, Result};

/// Invert the predictor named by `params` over `data`.
///
/// Predictor 1 is the identity. Only 8 bits per component is
/// supported; other depths and unknown predictor values are recoverable
/// errors the caller absorbs.
pub fn reverse_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    if params.bits_per_component != 8 {
        return Err(Error::UnsupportedBitsPerComponent(params.bits_per_component));
    }

    let colors = params.colors.max(0) as usize;
    let columns = params.columns.max(0) as usize;
    let row_width = columns * colors;
    if row_width == 0 {
        return Err(Error::Decode(format!(
            "invalid predictor row width: {} columns x {} colors",
            columns, params.colors
        )));
    }

    match params.predictor {
        1 => Ok(data.to_vec()),
        2 => Ok(reverse_tiff(data, row_width, colors)),
        10..=15 => Ok(reverse_png(data, params.predictor, row_width, colors)),
        p => Err(Error::UnsupportedPredictor(p)),
    }
}

/// TIFF predictor 2: each sample is a delta against the sample one
/// pixel to the left within the same row.
fn reverse_tiff(data: &[u8], row_width: usize, colors: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    let mut start = 0;
    while start < out.len() {
        let end = (start + row_width).min(out.len());
        for i in (start + colors)..end {
            out[i] = out[i].wrapping_add(out[i - colors]);
        }
        start = end;
    }
    out
}

/// PNG predictors: each input row is one tag byte plus `row_width`
/// bytes of filtered data. The declared predictor fixes the method for
/// 10-14; Optimum (15) lets every row choose through its tag.
fn reverse_png(data: &[u8], predictor: i64, row_width: usize, colors: usize) -> Vec<u8> {
    let png_row = row_width + 1;
    let mut out = Vec::with_capacity(data.len());
    let mut row_index = 0usize;
    let mut r = 0usize;

    while r < data.len() {
        let end = (r + png_row).min(data.len());
        let method = if predictor == 15 {
            data[r]
        } else {
            (predictor - 10) as u8
        };
        let row_data = &data[r + 1..end];
        let row_start = out.len();

        for (i, &b) in row_data.iter().enumerate() {
            let left = if i >= colors {
                out[row_start + i - colors]
            } else {
                0
            };
            let up = if row_index > 0 {
                out[row_start - row_width + i]
            } else {
                0
            };
            let up_left = if row_index > 0 && i >= colors {
                out[row_start - row_width + i - colors]
            } else {
                0
            };

            let predicted = match method {
                0 => 0,
                1 => left,
                2 => up,
                3 => (((left as u16) + (up as u16)) / 2) as u8,
                4 => paeth(left, up, up_left),
                // unknown tag: pass the byte through
                _ => 0,
            };
            out.push(b.wrapping_add(predicted));
        }

        row_index += 1;
        r += png_row;
    }
    out
}

/// Paeth predictor selection from the PNG specification.
fn paeth(left: u8, up: u8, up_left: u8) -> u8 {
    let (a, b, c) = (left as i32, up as i32, up_left as i32);
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();
    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        up
    } else {
        up_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(predictor: i64, columns: i64, colors: i64) -> DecodeParams {
        DecodeParams {
            predictor,
            columns,
            colors,
            ..DecodeParams::default()
        }
    }

    #[test]
    fn test_predictor_one_is_identity() {
        let data = b"unchanged";
        assert_eq!(reverse_predictor(data, &params(1, 3, 1)).unwrap(), data);
    }

    #[test]
    fn test_tiff_horizontal_difference() {
        // row: 10, +5, +5 -> 10, 15, 20
        let data = vec![10u8, 5, 5, 1, 1, 1];
        let out = reverse_predictor(&data, &params(2, 3, 1)).unwrap();
        assert_eq!(out, vec![10, 15, 20, 1, 2, 3]);
    }

    #[test]
    fn test_tiff_multi_color_deltas_per_sample() {
        // two pixels of two components each
        let data = vec![10u8, 100, 5, 50];
        let out = reverse_predictor(&data, &params(2, 2, 2)).unwrap();
        assert_eq!(out, vec![10, 100, 15, 150]);
    }

    #[test]
    fn test_png_none() {
        let data = vec![0u8, 9, 8, 7];
        let out = reverse_predictor(&data, &params(10, 3, 1)).unwrap();
        assert_eq!(out, vec![9, 8, 7]);
    }

    #[test]
    fn test_png_sub() {
        let data = vec![1u8, 10, 10, 10];
        let out = reverse_predictor(&data, &params(11, 3, 1)).unwrap();
        assert_eq!(out, vec![10, 20, 30]);
    }

    #[test]
    fn test_png_up() {
        let data = vec![2u8, 10, 20, 30, 2, 5, 5, 5];
        let out = reverse_predictor(&data, &params(12, 3, 1)).unwrap();
        assert_eq!(out, vec![10, 20, 30, 15, 25, 35]);
    }

    #[test]
    fn test_png_average() {
        // row 0: up = 0, so each byte adds floor(left/2)
        let data = vec![3u8, 10, 10, 3, 4, 4];
        let out = reverse_predictor(&data, &params(13, 2, 1)).unwrap();
        // row 0: 10, 10+5=15; row 1: 4+(0+10)/2=9, 4+(9+15)/2=16
        assert_eq!(out, vec![10, 15, 9, 16]);
    }

    #[test]
    fn test_png_paeth() {
        let data = vec![4u8, 10, 20, 4, 5, 5];
        let out = reverse_predictor(&data, &params(14, 2, 1)).unwrap();
        // row 0: paeth(0,0,0)=0 -> 10, then left=10 -> 30
        // row 1: paeth(0,10,0)=10 -> 15; paeth(15,30,10)=15? p=35 pa=20 pb=5 pc=25 -> up=30 -> 35
        assert_eq!(out, vec![10, 30, 15, 35]);
    }

    #[test]
    fn test_png_optimum_switches_per_row() {
        // row 0 uses None, row 1 uses Up
        let data = vec![0u8, 1, 2, 3, 2, 10, 10, 10];
        let out = reverse_predictor(&data, &params(15, 3, 1)).unwrap();
        assert_eq!(out, vec![1, 2, 3, 11, 12, 13]);
    }

    #[test]
    fn test_wraparound_is_mod_256() {
        let data = vec![1u8, 200, 200];
        let out = reverse_predictor(&data, &params(11, 2, 1)).unwrap();
        assert_eq!(out, vec![200, 144]);
    }

    #[test]
    fn test_unsupported_bits_per_component() {
        let p = DecodeParams {
            predictor: 2,
            bits_per_component: 4,
            columns: 4,
            ..DecodeParams::default()
        };
        assert!(matches!(
            reverse_predictor(b"xx", &p),
            Err(Error::UnsupportedBitsPerComponent(4))
        ));
    }

    #[test]
    fn test_unknown_predictor() {
        assert!(matches!(
            reverse_predictor(b"xx", &params(9, 1, 1)),
            Err(Error::UnsupportedPredictor(9))
        ));
    }
}
