//! Output collaborators for extraction.
//!
//! The extractor talks to a bundle of append-only sinks: a manifest of
//! extracted files, launch commands, URLs, JavaScript, page text, raw
//! object dumps, and recoverable-error reports. Embedded payloads are
//! stored under the MD5 hex of their bytes, which makes dumping
//! idempotent and gives downstream tooling stable artifact names.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use md5::{Digest, Md5};

use crate::error::{ErrorSink, RecoveryCode, Result};

/// Manifest hash used when a file's bytes are not available.
pub const UNKNOWN_HASH: &str = "00000000000000000000000000000000";

/// MD5 hex digest of `data`.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(32);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

/// The sink bundle extraction writes into.
pub struct Output {
    commands: Box<dyn Write>,
    errors: Box<dyn Write>,
    files: Box<dyn Write>,
    javascript: Box<dyn Write>,
    raw: Box<dyn Write>,
    text: Box<dyn Write>,
    urls: Box<dyn Write>,
    directory: Option<PathBuf>,
    dumped: HashSet<String>,
    wrote_javascript: bool,
}

impl Output {
    /// Create `directory` (replacing a previous run) and open the
    /// artifact files inside it: `commands.txt`, `errors.txt`,
    /// `files.txt`, `javascript.js`, `raw.pdf`, `contents.txt`,
    /// `urls.txt`. Embedded payloads land next to them under their
    /// MD5 names.
    pub fn to_directory(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        let _ = std::fs::remove_dir_all(&directory);
        std::fs::create_dir_all(&directory)?;
        let open = |name: &str| -> Result<Box<dyn Write>> {
            Ok(Box::new(std::fs::File::create(directory.join(name))?))
        };
        let commands = open("commands.txt")?;
        let errors = open("errors.txt")?;
        let files = open("files.txt")?;
        let javascript = open("javascript.js")?;
        let raw = open("raw.pdf")?;
        let text = open("contents.txt")?;
        let urls = open("urls.txt")?;
        Ok(Self {
            commands,
            errors,
            files,
            javascript,
            raw,
            text,
            urls,
            directory: Some(directory),
            dumped: HashSet::new(),
            wrote_javascript: false,
        })
    }

    /// Bundle over caller-supplied writers, in the fixed order
    /// commands, errors, files, javascript, raw, text, urls. No
    /// directory is attached, so embedded payloads only reach the
    /// manifest.
    #[allow(clippy::too_many_arguments)]
    pub fn from_writers(
        commands: Box<dyn Write>,
        errors: Box<dyn Write>,
        files: Box<dyn Write>,
        javascript: Box<dyn Write>,
        raw: Box<dyn Write>,
        text: Box<dyn Write>,
        urls: Box<dyn Write>,
    ) -> Self {
        Self {
            commands,
            errors,
            files,
            javascript,
            raw,
            text,
            urls,
            directory: None,
            dumped: HashSet::new(),
            wrote_javascript: false,
        }
    }

    /// Bundle that swallows everything.
    pub fn discard() -> Self {
        Self::from_writers(
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
        )
    }

    /// One URL per line.
    pub fn url_line(&mut self, url: &[u8]) {
        let _ = self.urls.write_all(url);
        let _ = self.urls.write_all(b"\n");
    }

    /// One `<program> <args>` line per launchable command.
    pub fn command_line(&mut self, program: &[u8], args: Option<&[u8]>) {
        let _ = self.commands.write_all(program);
        if let Some(args) = args {
            let _ = self.commands.write_all(b" ");
            let _ = self.commands.write_all(args);
        }
        let _ = self.commands.write_all(b"\n");
    }

    /// One `<hash>:<declared name>` manifest line.
    pub fn manifest_line(&mut self, hash: &str, name: &[u8]) {
        let _ = self.files.write_all(hash.as_bytes());
        let _ = self.files.write_all(b":");
        let _ = self.files.write_all(name);
        let _ = self.files.write_all(b"\n");
    }

    /// Append a script, separated from the previous one by a newline.
    pub fn append_javascript(&mut self, script: &[u8]) {
        if self.wrote_javascript {
            let _ = self.javascript.write_all(b"\n");
        }
        let _ = self.javascript.write_all(script);
        self.wrote_javascript = true;
    }

    /// Append a raw object dump.
    pub fn dump_raw(&mut self, dump: &[u8]) {
        let _ = self.raw.write_all(dump);
    }

    /// The page-text sink.
    pub fn text_sink(&mut self) -> &mut dyn Write {
        self.text.as_mut()
    }

    /// Store an extracted payload under its MD5 name and record the
    /// declared name in the manifest. Identical content is written at
    /// most once.
    pub fn dump_file(&mut self, name: &[u8], data: &[u8]) {
        let hash = content_hash(data);
        if self.dumped.insert(hash.clone()) {
            if let Some(directory) = &self.directory {
                let path = directory.join(&hash);
                if !path.exists() {
                    if let Err(e) = std::fs::write(&path, data) {
                        log::warn!("failed to dump {}: {}", hash, e);
                    }
                }
            }
        }
        self.manifest_line(&hash, name);
    }

    /// Flush every sink.
    pub fn flush(&mut self) {
        let _ = self.commands.flush();
        let _ = self.errors.flush();
        let _ = self.files.flush();
        let _ = self.javascript.flush();
        let _ = self.raw.flush();
        let _ = self.text.flush();
        let _ = self.urls.flush();
    }
}

impl ErrorSink for Output {
    fn error(&mut self, code: RecoveryCode, context: &str) {
        let _ = writeln!(self.errors, "{}: {}", code, context);
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        self.flush();
    }
}

/// `Write` over a shared buffer, for capturing sink output in tests or
/// embedding hosts.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

impl SharedBuffer {
    /// New empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_md5_hex() {
        // md5("abc")
        assert_eq!(content_hash(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(content_hash(b"").len(), 32);
    }

    #[test]
    fn test_url_and_command_lines() {
        let urls = SharedBuffer::new();
        let commands = SharedBuffer::new();
        let mut output = Output::from_writers(
            Box::new(commands.clone()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(urls.clone()),
        );
        output.url_line(b"http://example.com/a");
        output.command_line(b"cmd.exe", Some(b"/c calc"));
        output.command_line(b"notepad.exe", None);
        assert_eq!(urls.contents(), b"http://example.com/a\n");
        assert_eq!(commands.contents(), b"cmd.exe /c calc\nnotepad.exe\n");
    }

    #[test]
    fn test_javascript_separated_by_newlines() {
        let js = SharedBuffer::new();
        let mut output = Output::from_writers(
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(js.clone()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
        );
        output.append_javascript(b"app.alert(1);");
        output.append_javascript(b"app.alert(2);");
        assert_eq!(js.contents(), b"app.alert(1);\napp.alert(2);");
    }

    #[test]
    fn test_dump_file_writes_manifest_and_payload() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let mut output = Output::to_directory(&dir).unwrap();
        output.dump_file(b"evil.exe", b"MZ payload");
        output.dump_file(b"copy-of-evil.exe", b"MZ payload");
        drop(output);

        let hash = content_hash(b"MZ payload");
        let stored = std::fs::read(dir.join(&hash)).unwrap();
        assert_eq!(stored, b"MZ payload");
        let manifest = std::fs::read_to_string(dir.join("files.txt")).unwrap();
        assert_eq!(
            manifest,
            format!("{}:evil.exe\n{}:copy-of-evil.exe\n", hash, hash)
        );
    }

    #[test]
    fn test_output_is_an_error_sink() {
        let errors = SharedBuffer::new();
        let mut output = Output::from_writers(
            Box::new(std::io::sink()),
            Box::new(errors.clone()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
            Box::new(std::io::sink()),
        );
        output.error(RecoveryCode::UnclosedString, "at offset 12");
        assert_eq!(errors.contents(), b"UnclosedString: at offset 12\n");
    }
}
