//! Minimal page-text extraction.
//!
//! Walks a page's content stream for text blocks and show operators:
//! `BT`/`ET`, `Tf` (font selection), `Tj`, `'`, `"` and `TJ`. No
//! graphics state is modeled; one line is emitted per show operator,
//! decoded through the current font's ToUnicode cmap.

use std::io::Write;

use crate::extract::font::Font;
use crate::object::{Dictionary, Object};
use crate::parser::Parser;

/// Extract the text of one page into `out`.
pub fn extract_page_text(parser: &mut Parser, page: &Dictionary, out: &mut dyn Write) {
    let fonts = load_fonts(parser, page);
    let contents = page_contents(parser, page);
    if contents.is_empty() {
        return;
    }

    let default_font = Font::default();
    let mut reader = Parser::new(contents);

    while let Some((operator, _)) = reader.read_command() {
        if operator != "BT" {
            continue;
        }
        // inside a text block until ET or end of stream
        let mut current_font = &default_font;
        while let Some((operator, operands)) = reader.read_command() {
            match operator.as_str() {
                "ET" => break,
                "Tf" => {
                    // `/F1 12 Tf`: the font name is the second-to-last operand
                    current_font = operands
                        .len()
                        .checked_sub(2)
                        .and_then(|i| operands[i].as_name())
                        .and_then(|name| fonts.get(name))
                        .unwrap_or(&default_font);
                },
                "Tj" | "'" | "\"" => {
                    if let Some(text) = operands.last().and_then(|o| o.as_string()) {
                        let _ = writeln!(out, "{}", current_font.decode(text));
                    }
                },
                "TJ" => {
                    // positioned text: glue the string elements, ignore
                    // the kerning numbers
                    if let Some(items) = operands.last().and_then(|o| o.as_array()) {
                        let mut glyphs = Vec::new();
                        for item in items {
                            if let Some(s) = item.as_string() {
                                glyphs.extend_from_slice(s);
                            }
                        }
                        let _ = writeln!(out, "{}", current_font.decode(&glyphs));
                    }
                },
                _ => {},
            }
        }
    }
}

/// Load the page's font resources, keyed by resource name.
fn load_fonts(
    parser: &mut Parser,
    page: &Dictionary,
) -> std::collections::HashMap<String, Font> {
    let mut fonts = std::collections::HashMap::new();
    let resources = match page.get("Resources").map(|o| parser.deref(o)) {
        Some(Object::Dictionary(d)) => d,
        _ => return fonts,
    };
    let font_dict = match resources.get("Font").map(|o| parser.deref(o)) {
        Some(Object::Dictionary(d)) => d,
        _ => return fonts,
    };
    for (name, value) in &font_dict {
        if let Object::Dictionary(fd) = parser.deref(value) {
            fonts.insert(name.clone(), Font::load(parser, &fd));
        }
    }
    fonts
}

/// Collect the page's content stream bytes; `/Contents` may be one
/// stream reference or an array of them.
fn page_contents(parser: &mut Parser, page: &Dictionary) -> Vec<u8> {
    match page.get("Contents") {
        Some(Object::Reference(r)) => parser.resolve_stream(*r).to_vec(),
        Some(Object::Array(items)) => {
            let items = items.clone();
            let mut data = Vec::new();
            for item in &items {
                if let Object::Reference(r) = item {
                    data.extend_from_slice(&parser.resolve_stream(*r));
                    data.push(b'\n');
                }
            }
            data
        },
        Some(Object::Stream { data, .. }) => data.to_vec(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_operators_collected_in_order() {
        let content = b"BT (Hello) Tj (World) ' ET (outside) Tj".to_vec();
        let mut reader = Parser::new(content);
        let mut lines = Vec::new();
        while let Some((op, operands)) = reader.read_command() {
            if matches!(op.as_str(), "Tj" | "'") {
                if let Some(s) = operands.last().and_then(|o| o.as_string()) {
                    lines.push(s.to_vec());
                }
            }
        }
        assert_eq!(lines, vec![b"Hello".to_vec(), b"World".to_vec(), b"outside".to_vec()]);
    }

    #[test]
    fn test_contents_free_page_emits_nothing() {
        let mut out = Vec::new();
        let mut parser = Parser::new(Vec::new());
        let page = Dictionary::new();
        extract_page_text(&mut parser, &page, &mut out);
        assert!(out.is_empty());
    }
}
