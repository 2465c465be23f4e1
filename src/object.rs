//! PDF object types.
//!
//! One tagged variant covers everything the grammar can produce. Numbers
//! are held as 64-bit floats with integer subtyping exposed through
//! [`Object::as_i64`]; strings and names keep their raw bytes from the
//! file (post-decryption). A [`Object::Stream`] pairs its dictionary
//! with the fully decoded payload.

use std::collections::HashMap;

/// Dictionary mapping name keys (without the leading slash) to objects.
/// Duplicate keys: last write wins. Insertion order is irrelevant.
pub type Dictionary = HashMap<String, Object>;

/// How a string was written in the file; round-tripped in dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// `(...)` form
    Literal,
    /// `<...>` form
    Hex,
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub number: u32,
    /// Generation number
    pub generation: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Numeric value; integers are the values with no fractional part
    Number(f64),
    /// Name with escapes decoded, stored without the leading slash
    Name(String),
    /// String bytes plus the form it was written in
    String(Vec<u8>, StringKind),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary
    Dictionary(Dictionary),
    /// Stream: dictionary plus decoded payload
    Stream {
        /// Stream dictionary
        dict: Dictionary,
        /// Payload after decryption and filter decoding
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
    /// Any other bare token: `obj`, `endobj`, `R`, `n`, `f`, content
    /// operators, and similar
    Keyword(String),
}

impl Object {
    /// Make a literal string object from bytes.
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Object::String(bytes.into(), StringKind::Literal)
    }

    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Number(_) => "Number",
            Object::Name(_) => "Name",
            Object::String(..) => "String",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
            Object::Keyword(_) => "Keyword",
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to cast to a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Object::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to cast to an integer: a number with no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Object::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    /// Try to cast to a name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to string bytes.
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s, _) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to an array.
    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to cast to a dictionary. Works for streams too.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to a reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Decoded payload of a stream object.
    pub fn as_stream_data(&self) -> Option<&[u8]> {
        match self {
            Object::Stream { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Serialize in the canonical dump form. Byte strings pass through
    /// unmodified, so the output is bytes rather than text.
    pub fn dump(&self, out: &mut Vec<u8>) {
        match self {
            Object::Null => out.extend_from_slice(b"null"),
            Object::Boolean(true) => out.extend_from_slice(b"true"),
            Object::Boolean(false) => out.extend_from_slice(b"false"),
            Object::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 9e15 {
                    out.extend_from_slice(format!("{}", *n as i64).as_bytes());
                } else {
                    out.extend_from_slice(format!("{}", n).as_bytes());
                }
            },
            Object::Name(s) => {
                out.push(b'/');
                out.extend_from_slice(s.as_bytes());
            },
            Object::String(s, StringKind::Literal) => {
                out.push(b'(');
                out.extend_from_slice(s);
                out.push(b')');
            },
            Object::String(s, StringKind::Hex) => {
                out.push(b'<');
                for b in s {
                    out.extend_from_slice(format!("{:02X}", b).as_bytes());
                }
                out.push(b'>');
            },
            Object::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    item.dump(out);
                    if i != items.len() - 1 {
                        out.push(b' ');
                    }
                }
                out.push(b']');
            },
            Object::Dictionary(d) => dump_dictionary(d, out),
            Object::Stream { dict, .. } => dump_dictionary(dict, out),
            Object::Reference(r) => {
                out.extend_from_slice(format!("{}", r).as_bytes());
            },
            Object::Keyword(s) => out.extend_from_slice(s.as_bytes()),
        }
    }
}

fn dump_dictionary(d: &Dictionary, out: &mut Vec<u8>) {
    out.extend_from_slice(b"<<");
    for (i, (key, value)) in d.iter().enumerate() {
        out.push(b'/');
        out.extend_from_slice(key.as_bytes());
        out.push(b' ');
        value.dump(out);
        if i != d.len() - 1 {
            out.push(b' ');
        }
    }
    out.extend_from_slice(b">>");
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = Vec::new();
        self.dump(&mut out);
        f.write_str(&String::from_utf8_lossy(&out))
    }
}

/// An object addressed through the xref: `N G obj ... endobj`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    /// Object number
    pub number: u32,
    /// Generation number
    pub generation: u16,
    /// Parsed value; [`Object::Null`] when the object is free, missing,
    /// or unreadable
    pub value: Object,
}

impl IndirectObject {
    /// A placeholder for a free or missing object number.
    pub fn null(number: u32) -> Self {
        Self {
            number,
            generation: 0,
            value: Object::Null,
        }
    }

    /// Decoded stream payload, if the value is a stream.
    pub fn stream_data(&self) -> Option<&[u8]> {
        self.value.as_stream_data()
    }

    /// Serialize in the dump form used by the raw artifact sink:
    ///
    /// ```text
    /// N G obj
    /// <value>
    /// stream
    /// <bytes>
    /// endstream
    /// endobj
    /// ```
    pub fn dump(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(format!("{} {} obj\n", self.number, self.generation).as_bytes());
        self.value.dump(out);
        out.push(b'\n');
        if let Object::Stream { data, .. } = &self.value {
            out.extend_from_slice(b"stream\n");
            out.extend_from_slice(data);
            out.extend_from_slice(b"\nendstream\n");
        }
        out.extend_from_slice(b"endobj\n");
    }
}
