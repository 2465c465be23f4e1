//! Artifact extraction.
//!
//! Recursive descent over every in-use object in the document,
//! emitting to the [`Output`] sinks:
//!
//! - action dictionaries (`A`, `OpenAction`, `AA`), with `Launch`
//!   actions surfaced as commands
//! - file specifications (`FS=URL`, embedded payloads under `EF`,
//!   `P` command parameters, `Win` launch targets)
//! - the `EmbeddedFiles` and `URLS` name trees, flattened with cycle
//!   guards
//! - the page tree, with each page's text recovered through the
//!   minimal content-stream extractor
//! - `JS` scripts (strings or streams) and `URI` targets
//! - a raw dump of every object in canonical form
//!
//! Nothing here fails: extraction of a hostile document is expected to
//! hit broken structures constantly, and each one costs at most its
//! own artifact.

use std::collections::HashSet;

use crate::object::{Dictionary, Object};
use crate::parser::Parser;

pub mod font;
pub mod output;
pub mod text;

pub use font::Font;
pub use output::{Output, SharedBuffer, UNKNOWN_HASH, content_hash};

/// Extract every artifact from a loaded document into `output`.
pub fn extract_document(parser: &mut Parser, output: &mut Output) {
    Extractor::new(parser, output).extract_all();
}

/// Walks resolved objects and routes artifacts to the output sinks.
pub struct Extractor<'a> {
    parser: &'a mut Parser,
    output: &'a mut Output,
}

impl<'a> Extractor<'a> {
    /// Build an extractor over a loaded parser.
    pub fn new(parser: &'a mut Parser, output: &'a mut Output) -> Self {
        Self { parser, output }
    }

    /// Visit every in-use object in ascending number order: dump it to
    /// the raw sink, then walk its value for artifacts.
    pub fn extract_all(&mut self) {
        for number in self.parser.xref().in_use_numbers() {
            log::debug!("extracting object {}", number);
            let object = self.parser.read_object(number);
            let mut dump = Vec::new();
            object.dump(&mut dump);
            self.output.dump_raw(&dump);

            let mut visited = HashSet::new();
            self.walk(&object.value, &mut visited);
        }
        self.output.flush();
    }

    /// Descend through inline values. References are not chased here:
    /// every indirect object is visited by `extract_all` on its own,
    /// so chasing would only duplicate work and invite cycles.
    fn walk(&mut self, object: &Object, visited: &mut HashSet<u32>) {
        match object {
            Object::Dictionary(dict) => self.walk_dict(dict, visited),
            Object::Stream { dict, .. } => self.walk_dict(dict, visited),
            Object::Array(items) => {
                for item in items {
                    self.walk(item, visited);
                }
            },
            _ => {},
        }
    }

    fn walk_dict(&mut self, dict: &Dictionary, visited: &mut HashSet<u32>) {
        if let Some(js) = dict.get("JS") {
            let js = js.clone();
            self.extract_javascript(&js);
        }

        if let Some(uri) = dict.get("URI") {
            let uri = uri.clone();
            if let Object::String(url, _) = self.parser.deref(&uri) {
                self.output.url_line(&url);
            }
        }

        for key in ["A", "OpenAction"] {
            if let Some(Object::Dictionary(action)) = self.deref_key(dict, key) {
                self.extract_action(&action);
            }
        }
        // additional-actions: a dictionary of event handlers
        if let Some(Object::Dictionary(events)) = self.deref_key(dict, "AA") {
            for value in events.values() {
                let value = value.clone();
                if let Object::Dictionary(action) = self.parser.deref(&value) {
                    self.extract_action(&action);
                }
            }
        }

        if let Some(tree) = dict.get("EmbeddedFiles") {
            let tree = tree.clone();
            for value in self.name_tree_values(&tree, visited) {
                if let Object::Dictionary(spec) = self.parser.deref(&value) {
                    self.extract_file_spec(&spec, false);
                }
            }
        }

        if let Some(tree) = dict.get("URLS") {
            let tree = tree.clone();
            for value in self.name_tree_values(&tree, visited) {
                match self.parser.deref(&value) {
                    Object::String(url, _) => self.output.url_line(&url),
                    Object::Dictionary(spec) => self.extract_file_spec(&spec, false),
                    _ => {},
                }
            }
        }

        if dict.get("Type").and_then(|o| o.as_name()) == Some("Catalog") {
            if let Some(pages) = dict.get("Pages") {
                let pages = pages.clone();
                self.extract_pages(&pages, visited);
            }
        }

        for value in dict.values() {
            self.walk(value, visited);
        }
    }

    /// `JS` values are scripts, either inline or behind a reference to
    /// a string or stream object.
    fn extract_javascript(&mut self, value: &Object) {
        match value {
            Object::String(script, _) => self.output.append_javascript(script),
            Object::Stream { data, .. } => self.output.append_javascript(data),
            Object::Reference(r) => match self.parser.resolve(*r) {
                Object::String(script, _) => self.output.append_javascript(&script),
                Object::Stream { data, .. } => self.output.append_javascript(&data),
                _ => {},
            },
            _ => {},
        }
    }

    /// An action's file target lives in `F` (string or file spec) or a
    /// `Win` launch dictionary; `S = Launch` turns the target into a
    /// command.
    fn extract_action(&mut self, action: &Dictionary) {
        let is_command = action.get("S").and_then(|o| o.as_name()) == Some("Launch");

        match self.deref_key(action, "F") {
            Some(Object::String(file, _)) => {
                if is_command {
                    self.output.command_line(&file, None);
                }
                self.output.manifest_line(UNKNOWN_HASH, &file);
            },
            Some(Object::Dictionary(spec)) => self.extract_file_spec(&spec, is_command),
            _ => {},
        }
        if let Some(Object::Dictionary(win)) = self.deref_key(action, "Win") {
            self.extract_file_spec(&win, is_command);
        }
    }

    /// File specification dispatch: a URL, an embedded payload, or a
    /// named file (with command parameters when launched).
    fn extract_file_spec(&mut self, spec: &Dictionary, is_command: bool) {
        let fs = self
            .deref_key(spec, "FS")
            .and_then(|o| match o {
                Object::Name(n) => Some(n),
                Object::String(s, _) => Some(String::from_utf8_lossy(&s).into_owned()),
                _ => None,
            })
            .unwrap_or_default();

        if fs == "URL" {
            if let Some(Object::String(url, _)) = self.deref_key(spec, "F") {
                self.output.url_line(&url);
            }
            return;
        }

        if let Some(Object::Dictionary(ef)) = self.deref_key(spec, "EF") {
            let data = match ef.get("F") {
                Some(Object::Reference(r)) => self.parser.resolve_stream(*r).to_vec(),
                Some(Object::Stream { data, .. }) => data.to_vec(),
                _ => Vec::new(),
            };
            let name = match self.deref_key(spec, "F") {
                Some(Object::String(name, _)) => name,
                _ => UNKNOWN_HASH.as_bytes().to_vec(),
            };
            self.output.dump_file(&name, &data);
            return;
        }

        if let Some(Object::String(parameters, _)) = self.deref_key(spec, "P") {
            if let Some(Object::String(file, _)) = self.deref_key(spec, "F") {
                self.output.manifest_line(UNKNOWN_HASH, &file);
                self.output.command_line(&file, Some(&parameters));
            }
            return;
        }

        if let Some(Object::String(file, _)) = self.deref_key(spec, "F") {
            if is_command {
                self.output.command_line(&file, None);
            }
            self.output.manifest_line(UNKNOWN_HASH, &file);
        }
    }

    /// Flatten a name tree into its values, guarding `Kids` loops.
    fn name_tree_values(&mut self, node: &Object, visited: &mut HashSet<u32>) -> Vec<Object> {
        let resolved = match node {
            Object::Reference(r) => {
                if !visited.insert(r.number) {
                    return Vec::new();
                }
                self.parser.resolve(*r)
            },
            other => other.clone(),
        };
        let Some(dict) = resolved.as_dict() else {
            return Vec::new();
        };

        let mut values = Vec::new();
        if let Some(Object::Array(names)) = self.deref_key(dict, "Names") {
            // alternating key/value pairs
            for pair in names.chunks(2) {
                if let [_, value] = pair {
                    values.push(value.clone());
                }
            }
        }
        if let Some(Object::Array(kids)) = self.deref_key(dict, "Kids") {
            for kid in &kids {
                values.extend(self.name_tree_values(kid, visited));
            }
        }
        values
    }

    /// Flatten the page tree, extracting text from every `Page` leaf.
    fn extract_pages(&mut self, node: &Object, visited: &mut HashSet<u32>) {
        let resolved = match node {
            Object::Reference(r) => {
                if !visited.insert(r.number) {
                    return;
                }
                self.parser.resolve(*r)
            },
            other => other.clone(),
        };
        let Some(dict) = resolved.as_dict() else {
            return;
        };

        if dict.get("Type").and_then(|o| o.as_name()) == Some("Page") {
            text::extract_page_text(self.parser, dict, self.output.text_sink());
        }

        if let Some(Object::Array(kids)) = self.deref_key(dict, "Kids") {
            for kid in &kids {
                self.extract_pages(kid, visited);
            }
        }
    }

    fn deref_key(&mut self, dict: &Dictionary, key: &str) -> Option<Object> {
        let value = dict.get(key)?.clone();
        Some(self.parser.deref(&value))
    }
}
