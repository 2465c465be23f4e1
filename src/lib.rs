//! # pdfsift
//!
//! Defensive PDF parsing and artifact extraction, built for feeding
//! potentially hostile documents to analysis pipelines.
//!
//! The parser rebuilds a document's indirect-object graph no matter how
//! badly its cross-reference data lies: the declared xref chain is
//! loaded first, orphaned sections are scanned up, and every `N G obj`
//! marker in the file verifies or repairs the table. Streams run
//! through the standard security handler (RC4 and AES-128-CBC with
//! per-object salted keys) and the filter chain (ASCIIHex, ASCII85,
//! RunLength, Flate, LZW, with TIFF/PNG predictor inversion). Broken
//! structures degrade to `null` values, partial buffers, and reports
//! through an error sink; only a wrong password or an unsupported
//! encryption scheme aborts a load.
//!
//! The extractor walks the resolved graph and emits embedded files
//! (content-addressed by MD5), launch commands, URLs, JavaScript, page
//! text recovered through ToUnicode cmaps, and canonical dumps of every
//! object.
//!
//! ## Quick start
//!
//! ```no_run
//! use pdfsift::{Parser, extract};
//!
//! # fn main() -> pdfsift::Result<()> {
//! let mut parser = Parser::open("suspicious.pdf")?;
//! parser.load(b"")?; // password, empty for unprotected files
//!
//! let mut output = extract::Output::to_directory("suspicious.out")?;
//! extract::extract_document(&mut parser, &mut output);
//! # Ok(())
//! # }
//! ```
//!
//! Individual objects are served lazily and never cached:
//!
//! ```no_run
//! # use pdfsift::Parser;
//! # fn main() -> pdfsift::Result<()> {
//! # let mut parser = Parser::open("file.pdf")?;
//! # parser.load(b"")?;
//! let object = parser.read_object(9);
//! println!("{}", object.value);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Core PDF parsing
pub mod lexer;
pub mod object;
pub mod parser;
/// Parser configuration options
pub mod parser_config;
pub mod source;
pub mod xref;
pub mod xref_reconstruction;

// Stream decoders
pub mod decoders;

// Decryption
pub mod encryption;

// Artifact extraction
pub mod extract;

// Re-exports
pub use error::{CollectSink, Error, ErrorSink, LogSink, RecoveryCode, Result};
pub use object::{Dictionary, IndirectObject, Object, ObjectRef, StringKind};
pub use parser::Parser;
pub use parser_config::ParserOptions;
pub use xref::{Xref, XrefEntry, XrefEntryKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
