//! Error types for the PDF library.
//!
//! Failures split into two families. `Error` values are fatal and only
//! escape from `Parser::load` (wrong password, unsupported encryption,
//! unreadable input). Everything else — malformed syntax, unsupported
//! filters, broken predictors — is absorbed where it happens: parsing
//! continues with a best-effort recovery and the event is reported once
//! through an [`ErrorSink`].

/// Result type alias for PDF library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can abort an operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// End of input reached where a token was expected
    #[error("End of input")]
    Read,

    /// The document is encrypted and the supplied password does not match
    #[error("Incorrect password")]
    PasswordIncorrect,

    /// Encryption scheme outside the supported V/R/method range
    #[error("Unsupported encryption: {0}")]
    UnsupportedEncryption(String),

    /// Cross-reference data could not be located or parsed
    #[error("Invalid cross-reference table")]
    InvalidXref,

    /// Stream filter not implemented (DCTDecode, JBIG2Decode, ...)
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Predictor value outside 1, 2, 10..=15
    #[error("Unsupported predictor: {0}")]
    UnsupportedPredictor(i64),

    /// Predictor inversion only handles byte-granular samples
    #[error("Unsupported BitsPerComponent: {0}")]
    UnsupportedBitsPerComponent(i64),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),
}

/// Classification of recoverable syntax events.
///
/// Each is reported once to the [`ErrorSink`] at the point of recovery;
/// parsing then continues with a best-effort closure of the construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCode {
    /// Array not closed before end of input
    UnclosedArray,
    /// Dictionary not closed before end of input
    UnclosedDictionary,
    /// Literal string not closed before end of input
    UnclosedString,
    /// Hex string not closed before end of input
    UnclosedHexString,
    /// Name truncated by end of input
    UnclosedName,
    /// Comment ran to end of input
    UnclosedComment,
    /// Backslash escape truncated by end of input
    UnclosedEscape,
    /// Octal escape malformed or truncated
    InvalidOctal,
    /// Non-hex byte inside a hex string
    InvalidHexChar,
    /// Ill-formed `#hh` sequence in a name
    InvalidNameEscape,
    /// Dictionary key is not a name
    InvalidDictionaryKeyType,
    /// Dictionary key with no value before the dictionary closed
    MissingDictionaryValue,
}

impl RecoveryCode {
    /// Stable identifier used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryCode::UnclosedArray => "UnclosedArray",
            RecoveryCode::UnclosedDictionary => "UnclosedDictionary",
            RecoveryCode::UnclosedString => "UnclosedString",
            RecoveryCode::UnclosedHexString => "UnclosedHexString",
            RecoveryCode::UnclosedName => "UnclosedName",
            RecoveryCode::UnclosedComment => "UnclosedComment",
            RecoveryCode::UnclosedEscape => "UnclosedEscape",
            RecoveryCode::InvalidOctal => "InvalidOctal",
            RecoveryCode::InvalidHexChar => "InvalidHexChar",
            RecoveryCode::InvalidNameEscape => "InvalidNameEscape",
            RecoveryCode::InvalidDictionaryKeyType => "InvalidDictionaryKeyType",
            RecoveryCode::MissingDictionaryValue => "MissingDictionaryValue",
        }
    }
}

impl std::fmt::Display for RecoveryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver for recoverable errors.
///
/// Implementations must never fail; reporting is fire-and-forget so that
/// hostile input cannot turn diagnostics into a denial of service.
pub trait ErrorSink {
    /// Record one recoverable event with a short human-readable context.
    fn error(&mut self, code: RecoveryCode, context: &str);
}

/// Default sink: forwards reports to the `log` facade at warn level.
#[derive(Debug, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn error(&mut self, code: RecoveryCode, context: &str) {
        log::warn!("{}: {}", code, context);
    }
}

/// Sink that keeps reports, for assertions in tests and for callers that
/// want to inspect what recovery happened.
#[derive(Debug, Default)]
pub struct CollectSink {
    /// Recorded `(code, context)` pairs in report order.
    pub reports: Vec<(RecoveryCode, String)>,
}

impl ErrorSink for CollectSink {
    fn error(&mut self, code: RecoveryCode, context: &str) {
        self.reports.push((code, context.to_string()));
    }
}
