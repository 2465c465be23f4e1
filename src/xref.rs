//! Cross-reference table model.
//!
//! The xref maps object numbers to byte offsets, enabling random access
//! to indirect objects. Entries come from traditional `xref` tables,
//! from cross-reference streams, and from the repair scan; they all
//! merge into one [`Xref`] under a single rule: an entry wins if its
//! generation is strictly greater than the one already present, or if
//! none is present. Sections are loaded most-recent-revision first, so
//! at equal generation the authoritative revision keeps its entry.

use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::collections::HashMap;

/// How far back from the end of the file the `startxref` marker is
/// searched for.
const STARTXREF_SCAN_WINDOW: usize = 256;

lazy_static! {
    static ref STARTXREF_RE: Regex = Regex::new(r"(?-u)startxref\s*(\d+)\s*%%EOF").unwrap();
}

/// Cross-reference entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntryKind {
    /// The object number is free.
    Free,
    /// In use at a byte offset in the file.
    InUse,
    /// Stored inside an object stream. Recorded for completeness and
    /// treated as free by the resolver.
    Compressed,
}

/// Cross-reference table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefEntry {
    /// Entry type.
    pub kind: XrefEntryKind,
    /// Byte offset for in-use entries; container stream number for
    /// compressed entries.
    pub offset: u64,
    /// Generation, or the index within the container stream for
    /// compressed entries.
    pub generation: u32,
    /// Cleared for the encryption dictionary and for xref streams so
    /// the security handler never touches either.
    pub is_encrypted: bool,
    /// Set on the entry of an object that carries a cross-reference
    /// stream.
    pub is_xref_stream: bool,
}

impl XrefEntry {
    /// In-use entry at a byte offset.
    pub fn in_use(offset: u64, generation: u32) -> Self {
        Self {
            kind: XrefEntryKind::InUse,
            offset,
            generation,
            is_encrypted: true,
            is_xref_stream: false,
        }
    }

    /// Free entry.
    pub fn free(offset: u64, generation: u32) -> Self {
        Self {
            kind: XrefEntryKind::Free,
            offset,
            generation,
            is_encrypted: true,
            is_xref_stream: false,
        }
    }

    /// Compressed entry: object lives in `container` at `index`.
    pub fn compressed(container: u64, index: u32) -> Self {
        Self {
            kind: XrefEntryKind::Compressed,
            offset: container,
            generation: index,
            is_encrypted: true,
            is_xref_stream: false,
        }
    }

    /// True for in-use entries.
    pub fn is_in_use(&self) -> bool {
        self.kind == XrefEntryKind::InUse
    }
}

/// Object-number → entry map with the generation merge rule.
#[derive(Debug, Default, Clone)]
pub struct Xref {
    entries: HashMap<u32, XrefEntry>,
}

impl Xref {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one entry in: inserted if the number is unseen or the new
    /// generation is strictly greater than the existing one.
    pub fn add(&mut self, number: u32, entry: XrefEntry) {
        match self.entries.get(&number) {
            Some(existing) if entry.generation <= existing.generation => {},
            _ => {
                self.entries.insert(number, entry);
            },
        }
    }

    /// Replace an entry unconditionally (repair path).
    pub fn put(&mut self, number: u32, entry: XrefEntry) {
        self.entries.insert(number, entry);
    }

    /// Entry lookup.
    pub fn get(&self, number: u32) -> Option<&XrefEntry> {
        self.entries.get(&number)
    }

    /// Mutable entry lookup.
    pub fn get_mut(&mut self, number: u32) -> Option<&mut XrefEntry> {
        self.entries.get_mut(&number)
    }

    /// Number of entries of any kind.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of in-use entries.
    pub fn in_use_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_in_use()).count()
    }

    /// All `(number, entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&u32, &XrefEntry)> {
        self.entries.iter()
    }

    /// Object numbers with in-use entries, sorted ascending.
    pub fn in_use_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_in_use())
            .map(|(n, _)| *n)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Locate the declared xref offset: the last `startxref <n> %%EOF`
/// marker within the final bytes of the file.
pub fn find_startxref(data: &[u8]) -> Option<u64> {
    let tail_start = data.len().saturating_sub(STARTXREF_SCAN_WINDOW);
    let tail = &data[tail_start..];
    let caps = STARTXREF_RE.captures_iter(tail).last()?;
    let digits = caps.get(1)?.as_bytes();
    std::str::from_utf8(digits).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_rule_higher_generation_wins() {
        let mut xref = Xref::new();
        xref.add(5, XrefEntry::in_use(100, 0));
        xref.add(5, XrefEntry::in_use(200, 1));
        assert_eq!(xref.get(5).unwrap().offset, 200);
        // lower generation cannot displace
        xref.add(5, XrefEntry::in_use(300, 0));
        assert_eq!(xref.get(5).unwrap().offset, 200);
    }

    #[test]
    fn test_merge_rule_first_seen_wins_at_equal_generation() {
        let mut xref = Xref::new();
        xref.add(5, XrefEntry::in_use(100, 0));
        xref.add(5, XrefEntry::in_use(999, 0));
        assert_eq!(xref.get(5).unwrap().offset, 100);
    }

    #[test]
    fn test_in_use_count_ignores_free_entries() {
        let mut xref = Xref::new();
        xref.add(0, XrefEntry::free(0, 65535));
        xref.add(1, XrefEntry::in_use(15, 0));
        xref.add(2, XrefEntry::compressed(9, 1));
        assert_eq!(xref.len(), 3);
        assert_eq!(xref.in_use_count(), 1);
        assert_eq!(xref.in_use_numbers(), vec![1]);
    }

    #[test]
    fn test_find_startxref() {
        let data = b"%PDF-1.4\njunk\nstartxref\n123\n%%EOF\n";
        assert_eq!(find_startxref(data), Some(123));
    }

    #[test]
    fn test_find_startxref_takes_last_marker() {
        let data = b"startxref\n11\n%%EOF\nstartxref\n42\n%%EOF";
        assert_eq!(find_startxref(data), Some(42));
    }

    #[test]
    fn test_find_startxref_missing() {
        assert_eq!(find_startxref(b"%PDF-1.4 no trailer here"), None);
    }

    #[test]
    fn test_find_startxref_only_scans_tail() {
        // marker buried deeper than the scan window is ignored
        let mut data = b"startxref\n7\n%%EOF\n".to_vec();
        data.extend(std::iter::repeat(b' ').take(512));
        assert_eq!(find_startxref(&data), None);
    }
}
