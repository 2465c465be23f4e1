//! Cross-reference recovery scans.
//!
//! Two linear scans over the raw file support the loader. The declared
//! scan finds every place a cross-reference section could legitimately
//! start (`xref` keywords and `/Type /XRef` stream objects), so
//! sections orphaned by a damaged chain still get loaded. The marker
//! scan finds every `N G obj` header, tolerating the whitespace and
//! comment games hostile files play, and drives repair when the
//! declared data is absent or lies about offsets.

use lazy_static::lazy_static;
use regex::bytes::Regex;

lazy_static! {
    // whitespace between the numbers may include NUL bytes or line comments
    static ref OBJ_MARKER_RE: Regex = Regex::new(
        r"(?-u)(?P<num>\d+)(?:[\s\x00]|(?:%[^\n]*\n))+(?P<gen>\d+)(?:[\s\x00]|(?:%[^\n]*\n))+obj"
    )
    .unwrap();
    static ref XREF_STREAM_TYPE_RE: Regex = Regex::new(r"(?-u)/Type[\s\x00]*/XRef").unwrap();
}

/// One `N G obj` header found in the raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMarker {
    /// Byte offset of the header start.
    pub offset: u64,
    /// Object number.
    pub number: u32,
    /// Generation number.
    pub generation: u32,
}

/// Scan the whole file for `N G obj` headers.
pub fn scan_object_markers(data: &[u8]) -> Vec<ObjectMarker> {
    let mut markers = Vec::new();
    for caps in OBJ_MARKER_RE.captures_iter(data) {
        let whole = caps.get(0).expect("match");
        let number = parse_u32(caps.name("num").expect("num").as_bytes());
        let generation = parse_u32(caps.name("gen").expect("gen").as_bytes());
        if let (Some(number), Some(generation)) = (number, generation) {
            markers.push(ObjectMarker {
                offset: whole.start() as u64,
                number,
                generation,
            });
        }
    }
    markers
}

/// Scan for every offset at which a cross-reference section may start:
/// each `xref` table keyword plus each object whose dictionary declares
/// `/Type /XRef`. Offsets are returned ascending and deduplicated.
pub fn scan_declared_sections(data: &[u8]) -> Vec<u64> {
    let mut offsets = Vec::new();

    // "xref" keywords; skip the tail of every "startxref"
    let mut search = 0usize;
    while let Some(found) = find(data, b"xref", search) {
        let clear_before = match found.checked_sub(1) {
            None => true,
            Some(prev) => !data[prev].is_ascii_alphanumeric(),
        };
        let clear_after = data
            .get(found + 4)
            .map(|b| !b.is_ascii_alphanumeric())
            .unwrap_or(true);
        if clear_before && clear_after {
            offsets.push(found as u64);
        }
        search = found + 4;
    }

    // xref stream objects: markers whose dictionary declares /Type /XRef
    let markers = scan_object_markers(data);
    for (i, marker) in markers.iter().enumerate() {
        let start = marker.offset as usize;
        let end = markers
            .get(i + 1)
            .map(|next| next.offset as usize)
            .unwrap_or(data.len())
            .min(start + 1024);
        if XREF_STREAM_TYPE_RE.is_match(&data[start..end]) {
            offsets.push(marker.offset);
        }
    }

    offsets.sort_unstable();
    offsets.dedup();
    offsets
}

fn find(data: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= data.len() {
        return None;
    }
    data[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn parse_u32(digits: &[u8]) -> Option<u32> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_markers() {
        let data = b"%PDF-1.4\n1 0 obj\n(A)\nendobj\n12 3 obj\n(B)\nendobj\n";
        let markers = scan_object_markers(data);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].number, 1);
        assert_eq!(markers[0].offset, 9);
        assert_eq!(markers[1].number, 12);
        assert_eq!(markers[1].generation, 3);
    }

    #[test]
    fn test_scan_tolerates_nul_and_comments() {
        let data = b"7\x00\x000 obj\n(A)\nendobj\n8 %hidden\n0 %more\nobj\n";
        let markers = scan_object_markers(data);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].number, 7);
        assert_eq!(markers[1].number, 8);
    }

    #[test]
    fn test_marker_number_is_not_swallowed_by_prefix() {
        // "3" here is an operand, not part of the header
        let data = b"3 12 0 obj\n";
        let markers = scan_object_markers(data);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].number, 12);
    }

    #[test]
    fn test_declared_sections_skip_startxref() {
        let data = b"xref\n0 1\n0000000000 65535 f \ntrailer\n<<>>\nstartxref\n0\n%%EOF";
        let offsets = scan_declared_sections(data);
        assert_eq!(offsets, vec![0]);
    }

    #[test]
    fn test_declared_sections_find_xref_streams() {
        let data = b"9 0 obj\n<</Type /XRef /W [1 2 1]>>\nstream\nx\nendstream\nendobj\n";
        let offsets = scan_declared_sections(data);
        assert_eq!(offsets, vec![0]);
    }
}
