//! ToUnicode cmap decoding.
//!
//! Page text shown by `Tj` and friends is a sequence of glyph codes,
//! not characters. A font's `/ToUnicode` stream is a cmap whose
//! `bfchar` and `bfrange` sections map code ranges to Unicode; this is
//! the only piece of font machinery text recovery needs. Codes outside
//! the map pass through as raw bytes.

use std::collections::HashMap;

use crate::object::{Dictionary, Object};
use crate::parser::Parser;

/// Glyph-code to text mapping for one font.
#[derive(Debug, Clone)]
pub struct Font {
    cmap: HashMap<u32, String>,
    width: usize,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            cmap: HashMap::new(),
            width: 1,
        }
    }
}

impl Font {
    /// Build the font for a font dictionary by parsing its `/ToUnicode`
    /// stream. Fonts without one decode as raw bytes.
    pub fn load(parser: &mut Parser, font_dict: &Dictionary) -> Self {
        let cmap_bytes = match font_dict.get("ToUnicode") {
            Some(Object::Reference(r)) => parser.resolve_stream(*r).to_vec(),
            Some(Object::Stream { data, .. }) => data.to_vec(),
            _ => Vec::new(),
        };
        Self::from_cmap(&cmap_bytes)
    }

    /// Parse cmap bytes. Only `bfchar` and `bfrange` sections matter;
    /// the surrounding CID machinery is skipped.
    pub fn from_cmap(data: &[u8]) -> Self {
        let mut font = Font::default();
        if data.is_empty() {
            return font;
        }

        let mut reader = Parser::new(data.to_vec());
        while let Some((operator, operands)) = reader.read_command() {
            match operator.as_str() {
                // `<src> <dst>` pairs collected between begin/endbfchar
                "endbfchar" => {
                    for pair in operands.chunks(2) {
                        let [src, dst] = pair else { continue };
                        let (Some(src), Some(dst)) = (src.as_string(), dst.as_string()) else {
                            continue;
                        };
                        if src.is_empty() {
                            continue;
                        }
                        font.width = src.len();
                        font.cmap.insert(code_value(src), utf16_be_to_string(dst));
                    }
                },
                // `<lo> <hi> <dst>` triples collected between begin/endbfrange
                "endbfrange" => {
                    for triple in operands.chunks(3) {
                        let [lo, hi, dst] = triple else { continue };
                        let (Some(lo), Some(hi), Some(dst)) =
                            (lo.as_string(), hi.as_string(), dst.as_string())
                        else {
                            continue;
                        };
                        if lo.is_empty() {
                            continue;
                        }
                        font.width = lo.len();
                        let text = utf16_be_to_string(dst);
                        let (start, end) = (code_value(lo), code_value(hi));
                        if end.saturating_sub(start) > 0xFFFF {
                            log::debug!("oversized bfrange {}..{} skipped", start, end);
                            continue;
                        }
                        for code in start..=end {
                            font.cmap.insert(code, text.clone());
                        }
                    }
                },
                _ => {},
            }
        }
        font
    }

    /// Decode a show-operator string through the cmap. Unmapped codes
    /// pass through as raw bytes; a trailing partial code is dropped.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut text = String::new();
        for chunk in bytes.chunks(self.width) {
            if chunk.len() < self.width {
                break;
            }
            match self.cmap.get(&code_value(chunk)) {
                Some(mapped) => text.push_str(mapped),
                None => text.push_str(&String::from_utf8_lossy(chunk)),
            }
        }
        text
    }
}

/// Big-endian integer value of a glyph code.
fn code_value(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Decode UTF-16BE destination text; odd-length or otherwise ragged
/// input falls back to a lossy byte view.
fn utf16_be_to_string(bytes: &[u8]) -> String {
    if bytes.len() % 2 != 0 {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_font_passes_bytes_through() {
        let font = Font::default();
        assert_eq!(font.decode(b"Hello"), "Hello");
    }

    #[test]
    fn test_bfchar_mapping() {
        let cmap = b"/CIDInit /ProcSet findresource begin\n\
            begincmap\n\
            2 beginbfchar\n<01> <0041>\n<02> <0042>\nendbfchar\n\
            endcmap";
        let font = Font::from_cmap(cmap);
        assert_eq!(font.decode(&[0x01, 0x02]), "AB");
    }

    #[test]
    fn test_bfrange_maps_whole_range() {
        let cmap = b"1 beginbfrange\n<0041> <0043> <0058>\nendbfrange";
        let font = Font::from_cmap(cmap);
        // two-byte codes; every code in the range shares the value
        assert_eq!(font.decode(&[0x00, 0x41, 0x00, 0x43]), "XX");
    }

    #[test]
    fn test_unmapped_codes_pass_through() {
        let cmap = b"1 beginbfchar\n<41> <005A>\nendbfchar";
        let font = Font::from_cmap(cmap);
        assert_eq!(font.decode(b"AB"), "ZB");
    }

    #[test]
    fn test_partial_trailing_code_dropped() {
        let cmap = b"1 beginbfchar\n<0041> <005A>\nendbfchar";
        let font = Font::from_cmap(cmap);
        // width is 2; the lone trailing byte cannot form a code
        assert_eq!(font.decode(&[0x00, 0x41, 0x07]), "Z");
    }

    #[test]
    fn test_utf16_destinations() {
        let cmap = b"1 beginbfchar\n<01> <D83DDE00>\nendbfchar";
        let font = Font::from_cmap(cmap);
        assert_eq!(font.decode(&[0x01]), "\u{1F600}");
    }
}
