//! PDF lexer (tokenizer).
//!
//! Low-level tokenization of PDF syntax over a seekable [`Source`].
//! The lexer recognizes:
//!
//! - Numbers: integers (`42`, `-17`) and reals (`3.14`, `-.002`); no
//!   scientific notation
//! - Strings: literal (`(Hello)`) with escape sequences decoded, and
//!   hexadecimal (`<48656C6C6F>`) decoded to bytes
//! - Names: `/Type`, with `#hh` escapes decoded
//! - Keywords: any other bare run (`obj`, `endobj`, `R`, `n`, `f`,
//!   `true`, `stream`, content-stream operators, ...)
//! - Structural delimiters: `[`, `]`, `<<`, `>>`
//!
//! Whitespace (`\0 \t \n \f \r` space) and comments (`%` to end of
//! line) are skipped between tokens.
//!
//! The lexer never panics on hostile input. Unexpected end of input
//! inside a composite closes the composite with whatever was read and
//! reports the event through the [`ErrorSink`]; `Error::Read` is
//! returned in place of a token only at a clean end of input.

use crate::error::{Error, ErrorSink, RecoveryCode, Result};
use crate::source::Source;

/// PDF whitespace bytes.
pub const WHITESPACE: &[u8] = b"\x00\t\n\x0c\r ";

/// PDF delimiter bytes.
pub const DELIMITERS: &[u8] = b"()<>[]/%";

/// True for the six PDF whitespace bytes.
pub fn is_whitespace(b: u8) -> bool {
    WHITESPACE.contains(&b)
}

/// True for the eight PDF delimiter bytes.
pub fn is_delimiter(b: u8) -> bool {
    DELIMITERS.contains(&b)
}

fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

/// Tokens produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric token. `integral` records that the token carried no
    /// decimal point, which is what the reference lookahead requires.
    Number {
        /// Parsed value.
        value: f64,
        /// Token had integer form.
        integral: bool,
    },
    /// Literal string content with escapes already decoded.
    LiteralString(Vec<u8>),
    /// Hex string content decoded to bytes.
    HexString(Vec<u8>),
    /// Name with `#hh` escapes decoded, without the leading slash.
    Name(String),
    /// Any bare token that is not a number: `obj`, `R`, `n`, `true`,
    /// content operators, and stray delimiters recovered as keywords.
    Keyword(String),
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `<<`
    DictStart,
    /// `>>`
    DictEnd,
}

impl Token {
    /// True if this token is the given keyword.
    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Token::Keyword(s) if s == kw)
    }
}

/// Streaming tokenizer over a [`Source`].
///
/// The lexer owns the source; callers reposition through
/// [`Lexer::seek`], which moves the single shared cursor and therefore
/// cannot leave stale lookahead behind.
#[derive(Debug)]
pub struct Lexer {
    src: Source,
}

impl Lexer {
    /// Build a lexer over a source.
    pub fn new(src: Source) -> Self {
        Self { src }
    }

    /// The underlying bytes.
    pub fn data(&self) -> &[u8] {
        self.src.data()
    }

    /// Current byte position of the token stream.
    pub fn position(&self) -> u64 {
        self.src.position()
    }

    /// Reposition the token stream.
    pub fn seek(&mut self, offset: u64) {
        self.src.seek(offset);
    }

    /// Read one raw byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.src.read_byte()
    }

    /// Push the last raw byte back.
    pub fn unread_byte(&mut self) {
        self.src.unread_byte();
    }

    /// Non-consuming look-ahead.
    pub fn peek_bytes(&self, n: usize) -> &[u8] {
        self.src.peek_bytes(n)
    }

    /// Skip whitespace and comments, returning the first interesting
    /// byte. A comment runs from `%` to the next `\n` or `\r`
    /// (`\r\n` counts as one terminator).
    pub fn consume_whitespace(&mut self, sink: &mut dyn ErrorSink) -> Result<u8> {
        loop {
            let b = self.src.read_byte()?;
            if is_whitespace(b) {
                continue;
            }
            if b == b'%' {
                loop {
                    match self.src.read_byte() {
                        Ok(b'\n') => break,
                        Ok(b'\r') => {
                            if let Ok(n) = self.src.read_byte() {
                                if n != b'\n' {
                                    self.src.unread_byte();
                                }
                            }
                            break;
                        },
                        Ok(_) => continue,
                        Err(_) => {
                            sink.error(
                                RecoveryCode::UnclosedComment,
                                &format!("at offset {}", self.src.position()),
                            );
                            return Err(Error::Read);
                        },
                    }
                }
                continue;
            }
            return Ok(b);
        }
    }

    /// Produce the next token.
    pub fn next_token(&mut self, sink: &mut dyn ErrorSink) -> Result<Token> {
        let b = self.consume_whitespace(sink)?;
        match b {
            b'[' => Ok(Token::ArrayStart),
            b']' => Ok(Token::ArrayEnd),
            b'(' => Ok(self.read_literal_string(sink)),
            b'/' => Ok(self.read_name(sink)),
            b'<' => {
                // either a dictionary start or a hex string
                match self.consume_whitespace(sink) {
                    Ok(b'<') => Ok(Token::DictStart),
                    Ok(first) => Ok(self.read_hex_string(first, sink)),
                    Err(_) => {
                        sink.error(
                            RecoveryCode::UnclosedHexString,
                            &format!("at offset {}", self.src.position()),
                        );
                        Ok(Token::HexString(Vec::new()))
                    },
                }
            },
            b'>' => {
                match self.src.read_byte() {
                    Ok(b'>') => Ok(Token::DictEnd),
                    Ok(_) => {
                        // stray closing angle; surface it for the reader to skip
                        self.src.unread_byte();
                        Ok(Token::Keyword(">".to_string()))
                    },
                    Err(_) => Ok(Token::Keyword(">".to_string())),
                }
            },
            b')' => Ok(Token::Keyword(")".to_string())),
            _ => Ok(self.read_bare(b)),
        }
    }

    /// Literal string: paren-balanced with backslash escapes decoded.
    fn read_literal_string(&mut self, sink: &mut dyn ErrorSink) -> Token {
        let mut out = Vec::new();
        let mut open_parens = 1u32;
        loop {
            let b = match self.src.read_byte() {
                Ok(b) => b,
                Err(_) => {
                    sink.error(
                        RecoveryCode::UnclosedString,
                        &format!("at offset {}", self.src.position()),
                    );
                    break;
                },
            };
            match b {
                b'\\' => {
                    let e = match self.src.read_byte() {
                        Ok(e) => e,
                        Err(_) => {
                            // keep the dangling backslash and close
                            out.push(b'\\');
                            sink.error(
                                RecoveryCode::UnclosedEscape,
                                &format!("at offset {}", self.src.position()),
                            );
                            break;
                        },
                    };
                    match e {
                        // escaped line breaks vanish
                        b'\n' => {},
                        b'\r' => {
                            if let Ok(n) = self.src.read_byte() {
                                if n != b'\n' {
                                    self.src.unread_byte();
                                }
                            }
                        },
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'0'..=b'7' => {
                            let mut value = (e - b'0') as u32;
                            for _ in 0..2 {
                                match self.src.read_byte() {
                                    Ok(d @ b'0'..=b'7') => {
                                        let next = value * 8 + (d - b'0') as u32;
                                        if next > 0xFF {
                                            // overflow drops the last digit
                                            sink.error(
                                                RecoveryCode::InvalidOctal,
                                                &format!("at offset {}", self.src.position()),
                                            );
                                            self.src.unread_byte();
                                            break;
                                        }
                                        value = next;
                                    },
                                    Ok(_) => {
                                        self.src.unread_byte();
                                        break;
                                    },
                                    Err(_) => break,
                                }
                            }
                            out.push(value as u8);
                        },
                        // \( \) \\ and unknown escapes keep the byte
                        other => out.push(other),
                    }
                },
                b'(' => {
                    open_parens += 1;
                    out.push(b);
                },
                b')' => {
                    open_parens -= 1;
                    if open_parens == 0 {
                        break;
                    }
                    out.push(b);
                },
                _ => out.push(b),
            }
        }
        Token::LiteralString(out)
    }

    /// Name: bytes to the next whitespace or delimiter, `#hh` decoded.
    fn read_name(&mut self, sink: &mut dyn ErrorSink) -> Token {
        let mut out = Vec::new();
        loop {
            let b = match self.src.read_byte() {
                Ok(b) => b,
                Err(_) => {
                    sink.error(
                        RecoveryCode::UnclosedName,
                        &format!("at offset {}", self.src.position()),
                    );
                    break;
                },
            };
            if is_whitespace(b) || is_delimiter(b) {
                self.src.unread_byte();
                break;
            }
            if b == b'#' {
                let peeked = self.src.peek_bytes(2);
                if peeked.len() == 2 && is_hex_digit(peeked[0]) && is_hex_digit(peeked[1]) {
                    let value = hex_value(peeked[0]) * 16 + hex_value(peeked[1]);
                    let _ = self.src.read_byte();
                    let _ = self.src.read_byte();
                    out.push(value);
                } else {
                    // ill-formed escape: keep the literal bytes
                    sink.error(
                        RecoveryCode::InvalidNameEscape,
                        &format!("at offset {}", self.src.position()),
                    );
                    out.push(b'#');
                }
                continue;
            }
            out.push(b);
        }
        Token::Name(String::from_utf8_lossy(&out).into_owned())
    }

    /// Hex string: whitespace skipped, invalid bytes skipped and
    /// reported, odd trailing digit padded with `0`.
    fn read_hex_string(&mut self, first: u8, sink: &mut dyn ErrorSink) -> Token {
        let mut out = Vec::new();
        let mut high: Option<u8> = None;
        let mut current = Some(first);
        loop {
            let b = match current.take() {
                Some(b) => b,
                None => match self.src.read_byte() {
                    Ok(b) => b,
                    Err(_) => {
                        if let Some(h) = high {
                            out.push(hex_value(h) * 16);
                        }
                        sink.error(
                            RecoveryCode::UnclosedHexString,
                            &format!("at offset {}", self.src.position()),
                        );
                        break;
                    },
                },
            };
            if b == b'>' {
                if let Some(h) = high {
                    out.push(hex_value(h) * 16);
                }
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            if !is_hex_digit(b) {
                sink.error(
                    RecoveryCode::InvalidHexChar,
                    &format!("0x{:02x} at offset {}", b, self.src.position()),
                );
                continue;
            }
            match high.take() {
                None => high = Some(b),
                Some(h) => out.push(hex_value(h) * 16 + hex_value(b)),
            }
        }
        Token::HexString(out)
    }

    /// Bare run: a number if it has number form, otherwise a keyword.
    fn read_bare(&mut self, first: u8) -> Token {
        let mut bytes = vec![first];
        while let Ok(b) = self.src.read_byte() {
            if is_whitespace(b) || is_delimiter(b) {
                self.src.unread_byte();
                break;
            }
            bytes.push(b);
        }

        if let Some((value, integral)) = parse_number(&bytes) {
            Token::Number { value, integral }
        } else {
            Token::Keyword(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Parse a bare token as a PDF number: optional sign, digits, at most
/// one decimal point, at least one digit, nothing else.
fn parse_number(bytes: &[u8]) -> Option<(f64, bool)> {
    let mut digits = 0usize;
    let mut dots = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'+' | b'-' if i == 0 => {},
            b'.' => dots += 1,
            b'0'..=b'9' => digits += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;
    let value: f64 = text.parse().ok()?;
    Some((value, dots == 0))
}
