//! The parser: object reading, xref loading and repair, reference
//! resolution, and the stream pipeline.
//!
//! A [`Parser`] wraps one document held in memory and serves object
//! reads on demand; nothing is cached. Loading runs in two phases:
//! the declared cross-reference data is walked first (the chain from
//! `startxref`, then any sections a damaged chain orphaned), then every
//! `N G obj` marker in the file is checked against the table and used
//! to patch or extend it. A file whose xref lies about offsets, or has
//! none at all, still comes up readable.
//!
//! Reading an object never fails: free, missing, cyclic, or mangled
//! objects all surface as [`Object::Null`]. Fatal errors exist only at
//! [`Parser::load`], and only for encryption the handler cannot or must
//! not work around.

use std::collections::HashSet;

use bytes::Bytes;

use crate::decoders;
use crate::encryption::{ObjectCrypt, StandardSecurityHandler};
use crate::error::{Error, ErrorSink, LogSink, RecoveryCode, Result};
use crate::lexer::{Lexer, Token};
use crate::object::{Dictionary, IndirectObject, Object, ObjectRef, StringKind};
use crate::parser_config::ParserOptions;
use crate::source::Source;
use crate::xref::{self, Xref, XrefEntry, XrefEntryKind};
use crate::xref_reconstruction;

/// Upper bound on entries a single xref subsection may declare.
const MAX_SUBSECTION_ENTRIES: i64 = 1_000_000;

/// PDF document parser.
pub struct Parser {
    lexer: Lexer,
    options: ParserOptions,
    sink: Box<dyn ErrorSink>,
    xref: Xref,
    trailer: Dictionary,
    handler: Option<StandardSecurityHandler>,
    visited_xref_offsets: HashSet<u64>,
}

impl Parser {
    /// Parser over an in-memory document with default options.
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_options(data, ParserOptions::default())
    }

    /// Parser with explicit options.
    pub fn with_options(data: Vec<u8>, options: ParserOptions) -> Self {
        Self {
            lexer: Lexer::new(Source::new(data)),
            options,
            sink: Box::new(LogSink),
            xref: Xref::new(),
            trailer: Dictionary::new(),
            handler: None,
            visited_xref_offsets: HashSet::new(),
        }
    }

    /// Read the file at `path` and build a parser over it.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }

    /// Replace the recoverable-error sink.
    pub fn set_error_sink(&mut self, sink: Box<dyn ErrorSink>) {
        self.sink = sink;
    }

    /// The raw document bytes.
    pub fn data(&self) -> &[u8] {
        self.lexer.data()
    }

    /// The cross-reference table.
    pub fn xref(&self) -> &Xref {
        &self.xref
    }

    /// The accumulated trailer dictionary.
    pub fn trailer(&self) -> &Dictionary {
        &self.trailer
    }

    /// Whether the trailer declares encryption.
    pub fn is_encrypted(&self) -> bool {
        self.trailer.contains_key("Encrypt")
    }

    /// The authenticated security handler, when the document is
    /// encrypted and `load` succeeded.
    pub fn security_handler(&self) -> Option<&StandardSecurityHandler> {
        self.handler.as_ref()
    }

    // ------------------------------------------------------------------
    // loading
    // ------------------------------------------------------------------

    /// Load the cross-reference data and, for encrypted documents,
    /// verify `password` and arm the security handler.
    ///
    /// Damaged or missing xref data is repaired silently; the only
    /// failures surfacing here are a wrong password or an encryption
    /// scheme outside the supported range.
    pub fn load(&mut self, password: &[u8]) -> Result<()> {
        self.xref.clear();
        self.trailer.clear();
        self.visited_xref_offsets.clear();
        self.handler = None;

        // most recent revision first, so it wins every merge tie
        match xref::find_startxref(self.lexer.data()) {
            Some(offset) => {
                if let Err(e) = self.load_xref_section(offset) {
                    log::debug!("declared xref chain at {} failed: {}", offset, e);
                }
            },
            None => log::debug!("startxref marker not found"),
        }

        // sections a broken chain left orphaned
        for offset in xref_reconstruction::scan_declared_sections(self.lexer.data()) {
            if let Err(e) = self.load_xref_section(offset) {
                log::debug!("xref section at {} failed: {}", offset, e);
            }
        }

        self.repair_xref();
        self.setup_encryption(password)?;

        log::debug!(
            "loaded {} xref entries ({} in use)",
            self.xref.len(),
            self.xref.in_use_count()
        );
        Ok(())
    }

    /// Load one xref section (table or stream form) and its `/Prev`
    /// predecessors. Offsets already visited are skipped, which bounds
    /// looped chains.
    fn load_xref_section(&mut self, offset: u64) -> Result<()> {
        if !self.visited_xref_offsets.insert(offset) {
            return Ok(());
        }
        self.lexer.seek(offset);
        let token = self.next_token()?;
        if token.is_keyword("xref") {
            self.read_xref_table()
        } else {
            self.lexer.seek(offset);
            self.read_xref_stream()
        }
    }

    /// Table form: subsections of `offset generation flag` lines up to
    /// the `trailer` keyword, then the trailer dictionary.
    fn read_xref_table(&mut self) -> Result<()> {
        loop {
            let token = self.next_token()?;
            if token.is_keyword("trailer") {
                break;
            }
            let first = match token {
                Token::Number { value, integral: true } if value >= 0.0 => value as i64,
                _ => return Err(Error::InvalidXref),
            };
            let count = self.next_integer()?;
            if !(0..=MAX_SUBSECTION_ENTRIES).contains(&count) {
                return Err(Error::InvalidXref);
            }
            for i in 0..count {
                let offset = self.next_integer()? as u64;
                let generation = self.next_integer()?.clamp(0, u32::MAX as i64) as u32;
                let flag = self.next_token()?;
                let number = match u32::try_from(first + i) {
                    Ok(n) => n,
                    Err(_) => continue,
                };
                let entry = if flag.is_keyword("n") {
                    XrefEntry::in_use(offset, generation)
                } else {
                    XrefEntry::free(offset, generation)
                };
                self.xref.add(number, entry);
            }
        }

        let trailer = match self.next_object(None)? {
            Object::Dictionary(d) => d,
            _ => return Err(Error::InvalidXref),
        };
        self.merge_trailer(&trailer);

        if let Some(prev) = trailer.get("Prev").and_then(|o| o.as_i64()) {
            return self.load_xref_section(prev as u64);
        }
        Ok(())
    }

    /// Stream form: an indirect object with `/Type /XRef` whose decoded
    /// payload holds fixed-width big-endian `(type, field2, field3)`
    /// records.
    fn read_xref_stream(&mut self) -> Result<()> {
        let number = self.next_integer()?;
        let _generation = self.next_integer()?;
        if !self.next_token()?.is_keyword("obj") {
            return Err(Error::InvalidXref);
        }
        let dict = match self.next_object(None)? {
            Object::Dictionary(d) => d,
            _ => return Err(Error::InvalidXref),
        };
        if !self.next_token()?.is_keyword("stream") {
            return Err(Error::InvalidXref);
        }

        // xref streams are never encrypted; only the filter chain runs
        let raw = self.carve_stream_payload();
        let (filters, parms) = self.filter_chain(&dict);
        let data = decoders::decode_chain(&raw, &filters, &parms, &self.options);

        let widths = dict
            .get("W")
            .and_then(|o| o.as_array())
            .map(|a| a.iter().filter_map(|o| o.as_i64()).collect::<Vec<_>>())
            .ok_or(Error::InvalidXref)?;
        if widths.len() < 3 || widths.iter().any(|w| !(0..=8).contains(w)) {
            return Err(Error::InvalidXref);
        }
        let (type_w, field2_w, field3_w) =
            (widths[0] as usize, widths[1] as usize, widths[2] as usize);

        let index: Vec<i64> = match dict.get("Index").and_then(|o| o.as_array()) {
            Some(a) => a.iter().filter_map(|o| o.as_i64()).collect(),
            None => {
                let size = dict
                    .get("Size")
                    .and_then(|o| o.as_i64())
                    .ok_or(Error::InvalidXref)?;
                vec![0, size]
            },
        };

        let mut cursor = &data[..];
        'sections: for pair in index.chunks(2) {
            let (&start, &count) = match pair {
                [s, c] => (s, c),
                _ => break,
            };
            if !(0..=MAX_SUBSECTION_ENTRIES).contains(&count) {
                return Err(Error::InvalidXref);
            }
            for j in 0..count {
                let record_len = type_w + field2_w + field3_w;
                if cursor.len() < record_len {
                    break 'sections;
                }
                let kind = read_be(&mut cursor, type_w);
                let field2 = read_be(&mut cursor, field2_w);
                let field3 = read_be(&mut cursor, field3_w);

                let number = match u32::try_from(start + j) {
                    Ok(n) => n,
                    Err(_) => continue,
                };
                let entry = match kind {
                    1 => XrefEntry::in_use(field2, field3 as u32),
                    2 => XrefEntry::compressed(field2, field3 as u32),
                    _ => XrefEntry::free(field2, field3 as u32),
                };
                self.xref.add(number, entry);
            }
        }

        // the carrier object itself must never be decrypted
        if let Ok(number) = u32::try_from(number) {
            if let Some(entry) = self.xref.get_mut(number) {
                entry.is_xref_stream = true;
                entry.is_encrypted = false;
            }
        }

        self.merge_trailer(&dict);
        if let Some(prev) = dict.get("Prev").and_then(|o| o.as_i64()) {
            return self.load_xref_section(prev as u64);
        }
        Ok(())
    }

    /// Accumulate trailer keys, first seen wins. Sections are walked
    /// most-recent-revision first, so the current revision's keys take
    /// precedence over anything reached through `/Prev`.
    fn merge_trailer(&mut self, trailer: &Dictionary) {
        for (key, value) in trailer {
            if !self.trailer.contains_key(key) {
                self.trailer.insert(key.clone(), value.clone());
            }
        }
    }

    /// Check every `N G obj` marker in the file against the table:
    /// absent numbers are added, declared offsets that do not actually
    /// hold the object are replaced, free entries whose object body
    /// still exists are resurrected.
    fn repair_xref(&mut self) {
        let markers = xref_reconstruction::scan_object_markers(self.lexer.data());
        let mut rebuilt: HashSet<u32> = HashSet::new();

        for marker in markers {
            let found = XrefEntry::in_use(marker.offset, marker.generation);
            match self.xref.get(marker.number).cloned() {
                None => {
                    self.xref.put(marker.number, found);
                    rebuilt.insert(marker.number);
                },
                Some(_) if rebuilt.contains(&marker.number) => {
                    // among rediscovered copies the later one is the
                    // newer incremental revision
                    self.xref.put(marker.number, found);
                },
                Some(entry) if entry.kind == XrefEntryKind::InUse => {
                    if !self.object_header_matches(entry.offset, marker.number) {
                        log::debug!(
                            "object {} not at declared offset {}, repaired to {}",
                            marker.number,
                            entry.offset,
                            marker.offset
                        );
                        let mut fixed = found;
                        fixed.is_encrypted = entry.is_encrypted;
                        fixed.is_xref_stream = entry.is_xref_stream;
                        self.xref.put(marker.number, fixed);
                    }
                },
                Some(entry) if entry.kind == XrefEntryKind::Free => {
                    // the body still carries this object; keep it reachable
                    self.xref.put(marker.number, found);
                    rebuilt.insert(marker.number);
                },
                Some(_) => {},
            }
        }
    }

    /// Does `offset` hold the header of object `number`?
    fn object_header_matches(&mut self, offset: u64, number: u32) -> bool {
        let saved = self.lexer.position();
        self.lexer.seek(offset);
        let matches = (|| -> Result<bool> {
            let n = self.next_integer()?;
            let _g = self.next_integer()?;
            let tok = self.next_token()?;
            Ok(tok.is_keyword("obj") && n == number as i64)
        })()
        .unwrap_or(false);
        self.lexer.seek(saved);
        matches
    }

    /// Arm the security handler when the trailer declares encryption.
    /// The encryption dictionary's own entry is exempted first so its
    /// strings are never run through the cipher.
    fn setup_encryption(&mut self, password: &[u8]) -> Result<()> {
        let encrypt_value = match self.trailer.get("Encrypt") {
            Some(v) => v.clone(),
            None => return Ok(()),
        };
        if let Object::Reference(r) = &encrypt_value {
            if let Some(entry) = self.xref.get_mut(r.number) {
                entry.is_encrypted = false;
            }
        }

        let encrypt_dict = match self.deref(&encrypt_value) {
            Object::Dictionary(d) => d,
            _ => {
                return Err(Error::UnsupportedEncryption(
                    "encryption dictionary unreadable".to_string(),
                ));
            },
        };

        let id0 = match self.trailer.get("ID").cloned() {
            Some(id_value) => match self.deref(&id_value) {
                Object::Array(items) => items
                    .first()
                    .and_then(|o| o.as_string())
                    .map(|s| s.to_vec())
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
            None => Vec::new(),
        };

        self.handler = Some(StandardSecurityHandler::authenticate(
            &encrypt_dict,
            id0,
            password,
        )?);
        Ok(())
    }

    // ------------------------------------------------------------------
    // object reading
    // ------------------------------------------------------------------

    /// Read the indirect object `number` through the xref. Free,
    /// missing, compressed, and unreadable objects come back as Null;
    /// this call never fails and never disturbs xref state.
    pub fn read_object(&mut self, number: u32) -> IndirectObject {
        let entry = match self.xref.get(number) {
            Some(e) => e.clone(),
            None => return IndirectObject::null(number),
        };
        if !entry.is_in_use() {
            let mut object = IndirectObject::null(number);
            object.generation = entry.generation.min(u16::MAX as u32) as u16;
            return object;
        }

        self.lexer.seek(entry.offset);
        let generation = match self.read_object_header(number) {
            Some(g) => g,
            None => {
                log::debug!("bad object header for object {}", number);
                return IndirectObject::null(number);
            },
        };

        let crypt = match &self.handler {
            Some(h) if entry.is_encrypted => Some(h.object_crypt(number, generation)),
            _ => None,
        };

        let value = self.next_object(crypt.as_ref()).unwrap_or(Object::Null);

        // a stream keyword after the value makes this a stream object
        let saved = self.lexer.position();
        let value = match self.next_token() {
            Ok(token) if token.is_keyword("stream") => {
                let dict = match value {
                    Object::Dictionary(d) => d,
                    other => {
                        log::debug!(
                            "stream for object {} carried a {} instead of a dictionary",
                            number,
                            other.type_name()
                        );
                        Dictionary::new()
                    },
                };
                let data = self.read_stream_payload(&dict, crypt.as_ref());
                Object::Stream { dict, data }
            },
            Ok(_) => {
                self.lexer.seek(saved);
                value
            },
            Err(_) => value,
        };

        IndirectObject {
            number,
            generation,
            value,
        }
    }

    fn read_object_header(&mut self, number: u32) -> Option<u16> {
        let n = self.next_integer().ok()?;
        let g = self.next_integer().ok()?;
        if !self.next_token().ok()?.is_keyword("obj") {
            return None;
        }
        if n != number as i64 {
            log::debug!("object header number {} does not match entry {}", n, number);
        }
        u16::try_from(g.clamp(0, u16::MAX as i64)).ok()
    }

    /// Dereference `reference`, following chains, guarding cycles with
    /// a per-call visited set, and restoring the file position so an
    /// in-progress parse is undisturbed. Cycles and dead ends yield
    /// Null.
    pub fn resolve(&mut self, reference: ObjectRef) -> Object {
        let saved = self.lexer.position();
        let mut visited: HashSet<u32> = HashSet::new();
        let mut current = reference;
        let value = loop {
            if !visited.insert(current.number) {
                break Object::Null;
            }
            match self.read_object(current.number).value {
                Object::Reference(next) => current = next,
                value => break value,
            }
        };
        self.lexer.seek(saved);
        value
    }

    /// Stream-valued resolution: the decoded payload of the referenced
    /// object, or empty bytes when the target is not a stream.
    pub fn resolve_stream(&mut self, reference: ObjectRef) -> Bytes {
        match self.resolve(reference) {
            Object::Stream { data, .. } => data,
            _ => Bytes::new(),
        }
    }

    /// Resolve `object` if it is a reference; clone it otherwise.
    pub fn deref(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(r) => self.resolve(*r),
            other => other.clone(),
        }
    }

    // ------------------------------------------------------------------
    // token-to-object reading
    // ------------------------------------------------------------------

    fn next_token(&mut self) -> Result<Token> {
        self.lexer.next_token(self.sink.as_mut())
    }

    fn next_integer(&mut self) -> Result<i64> {
        match self.next_token()? {
            Token::Number { value, .. } if value.fract() == 0.0 && value.is_finite() => {
                Ok(value as i64)
            },
            _ => Err(Error::InvalidXref),
        }
    }

    /// Read one object at the current position. `crypt` decrypts
    /// string values on the way in; composites recover from EOF by
    /// closing early and reporting once.
    pub fn next_object(&mut self, crypt: Option<&ObjectCrypt>) -> Result<Object> {
        let token = self.next_token()?;
        self.object_from_token(token, crypt)
    }

    fn object_from_token(&mut self, token: Token, crypt: Option<&ObjectCrypt>) -> Result<Object> {
        match token {
            Token::Number { value, integral } => {
                // an integer may begin an `N G R` reference; rewind on
                // mismatch so the caller sees a plain number
                if integral && value >= 0.0 {
                    let saved = self.lexer.position();
                    let gen_token = self.next_token();
                    let r_token = self.next_token();
                    if let (
                        Ok(Token::Number {
                            value: generation,
                            integral: true,
                        }),
                        Ok(r),
                    ) = (gen_token, r_token)
                    {
                        if generation >= 0.0 && r.is_keyword("R") {
                            return Ok(Object::Reference(ObjectRef::new(
                                value as u32,
                                generation as u16,
                            )));
                        }
                    }
                    self.lexer.seek(saved);
                }
                Ok(Object::Number(value))
            },

            Token::LiteralString(bytes) => {
                let bytes = match crypt {
                    Some(c) => c.decrypt_string(&bytes),
                    None => bytes,
                };
                Ok(Object::String(bytes, StringKind::Literal))
            },

            Token::HexString(bytes) => {
                let bytes = match crypt {
                    Some(c) => c.decrypt_string(&bytes),
                    None => bytes,
                };
                Ok(Object::String(bytes, StringKind::Hex))
            },

            Token::Name(name) => Ok(Object::Name(name)),

            Token::ArrayStart => {
                let mut items = Vec::new();
                loop {
                    match self.next_object(crypt) {
                        Ok(Object::Keyword(ref k)) if k == "]" => break,
                        Ok(item) => items.push(item),
                        Err(_) => {
                            self.report(RecoveryCode::UnclosedArray);
                            break;
                        },
                    }
                }
                Ok(Object::Array(items))
            },

            Token::DictStart => {
                let mut dict = Dictionary::new();
                loop {
                    let key = match self.next_token() {
                        Ok(Token::DictEnd) => break,
                        Ok(Token::Name(key)) => key,
                        Ok(_) => {
                            self.report(RecoveryCode::InvalidDictionaryKeyType);
                            continue;
                        },
                        Err(_) => {
                            self.report(RecoveryCode::UnclosedDictionary);
                            break;
                        },
                    };
                    match self.next_object(crypt) {
                        Ok(Object::Keyword(ref k)) if k == ">>" => {
                            self.report(RecoveryCode::MissingDictionaryValue);
                            break;
                        },
                        Ok(value) => {
                            dict.insert(key, value);
                        },
                        Err(_) => {
                            self.report(RecoveryCode::MissingDictionaryValue);
                            break;
                        },
                    }
                }
                Ok(Object::Dictionary(dict))
            },

            // closers surface as keywords so composite loops can stop
            Token::ArrayEnd => Ok(Object::Keyword("]".to_string())),
            Token::DictEnd => Ok(Object::Keyword(">>".to_string())),

            Token::Keyword(keyword) => match keyword.as_str() {
                "true" => Ok(Object::Boolean(true)),
                "false" => Ok(Object::Boolean(false)),
                "null" => Ok(Object::Null),
                _ => Ok(Object::Keyword(keyword)),
            },
        }
    }

    /// Read one content-stream command: operands in postfix order up
    /// to the next operator keyword. Returns `None` at end of input.
    ///
    /// `true`, `false` and `null` are operands, not operators; every
    /// other bare token ends the command.
    pub fn read_command(&mut self) -> Option<(String, Vec<Object>)> {
        let mut operands = Vec::new();
        loop {
            let token = self.next_token().ok()?;
            match token {
                Token::Keyword(ref k) if !matches!(k.as_str(), "true" | "false" | "null") => {
                    return Some((k.clone(), operands));
                },
                token => {
                    if let Ok(object) = self.object_from_token(token, None) {
                        operands.push(object);
                    }
                },
            }
        }
    }

    fn report(&mut self, code: RecoveryCode) {
        let context = format!("at offset {}", self.lexer.position());
        self.sink.error(code, &context);
    }

    // ------------------------------------------------------------------
    // stream carving and decoding
    // ------------------------------------------------------------------

    /// Carve the raw payload between `stream` and `endstream`. The
    /// cursor must sit right after the `stream` keyword; afterwards it
    /// sits past the `endstream` marker.
    ///
    /// One line terminator after `stream` is consumed, and one before
    /// `endstream` is dropped. `/Length` is advisory and deliberately
    /// ignored; the terminator marker is authoritative.
    fn carve_stream_payload(&mut self) -> Vec<u8> {
        loop {
            match self.lexer.read_byte() {
                Ok(b'\n') => break,
                Ok(b'\r') => {
                    if let Ok(next) = self.lexer.read_byte() {
                        if next != b'\n' {
                            self.lexer.unread_byte();
                        }
                    }
                    break;
                },
                Ok(_) => continue,
                Err(_) => return Vec::new(),
            }
        }

        let start = self.lexer.position() as usize;
        let (payload, resume) = {
            let data = self.lexer.data();
            match data[start..].windows(9).position(|w| w == b"endstream") {
                Some(found) => {
                    let marker = start + found;
                    let mut end = marker;
                    if end > start && data[end - 1] == b'\n' {
                        end -= 1;
                        if end > start && data[end - 1] == b'\r' {
                            end -= 1;
                        }
                    } else if end > start && data[end - 1] == b'\r' {
                        end -= 1;
                    }
                    (data[start..end].to_vec(), (marker + 9) as u64)
                },
                None => {
                    log::debug!("endstream marker not found, taking remainder of file");
                    (data[start..].to_vec(), data.len() as u64)
                },
            }
        };
        self.lexer.seek(resume);
        payload
    }

    /// Decrypt and decode a carved payload according to the stream
    /// dictionary: crypt-filter selection first, then the cipher, then
    /// the filter chain.
    fn read_stream_payload(&mut self, dict: &Dictionary, crypt: Option<&ObjectCrypt>) -> Bytes {
        let raw = self.carve_stream_payload();
        let (mut filters, mut parms) = self.filter_chain(dict);

        // a leading /Crypt filter picks a named crypt filter for this
        // stream only and drops out of the decode chain
        let mut crypt_name: Option<String> = None;
        if filters.first().map(|f| f == "Crypt").unwrap_or(false) {
            crypt_name = Some(
                parms
                    .first()
                    .and_then(|p| p.as_ref())
                    .and_then(|d| d.get("Name"))
                    .and_then(|o| o.as_name())
                    .unwrap_or("Identity")
                    .to_string(),
            );
            filters.remove(0);
            parms.remove(0);
        }

        let embedded_file = dict.get("Type").and_then(|o| o.as_name()) == Some("EmbeddedFile");
        let decrypted = match crypt {
            Some(c) => c.decrypt_stream(&raw, crypt_name.as_deref(), embedded_file),
            None => raw,
        };

        Bytes::from(decoders::decode_chain(
            &decrypted,
            &filters,
            &parms,
            &self.options,
        ))
    }

    /// Pull the `/Filter` names and positional `/DecodeParms` out of a
    /// stream dictionary, resolving references along the way.
    fn filter_chain(&mut self, dict: &Dictionary) -> (Vec<String>, Vec<Option<Dictionary>>) {
        let filters: Vec<String> = match dict.get("Filter") {
            None => Vec::new(),
            Some(value) => match self.deref(value) {
                Object::Name(name) => vec![name],
                Object::Array(items) => {
                    let mut names = Vec::new();
                    for item in &items {
                        if let Object::Name(name) = self.deref(item) {
                            names.push(name);
                        }
                    }
                    names
                },
                _ => Vec::new(),
            },
        };

        let mut parms: Vec<Option<Dictionary>> = match dict.get("DecodeParms") {
            None => Vec::new(),
            Some(value) => match self.deref(value) {
                Object::Dictionary(d) => vec![Some(d)],
                Object::Array(items) => {
                    let mut list = Vec::new();
                    for item in &items {
                        list.push(match self.deref(item) {
                            Object::Dictionary(d) => Some(d),
                            _ => None,
                        });
                    }
                    list
                },
                _ => Vec::new(),
            },
        };
        parms.resize(filters.len(), None);
        (filters, parms)
    }
}

fn read_be(cursor: &mut &[u8], width: usize) -> u64 {
    let mut value = 0u64;
    for _ in 0..width {
        value = (value << 8) | cursor[0] as u64;
        *cursor = &cursor[1..];
    }
    value
}
