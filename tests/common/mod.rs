//! Shared fixture builder: assembles synthetic PDF byte streams with
//! correct offsets so tests never hand-maintain an xref table.

#![allow(dead_code)]

use std::collections::BTreeMap;

/// Incremental PDF byte-stream builder.
pub struct PdfBuilder {
    data: Vec<u8>,
    offsets: BTreeMap<u32, u64>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            data: b"%PDF-1.4\n".to_vec(),
            offsets: BTreeMap::new(),
        }
    }

    /// Current length, i.e. the offset the next write lands at.
    pub fn here(&self) -> u64 {
        self.data.len() as u64
    }

    /// Recorded offset of an object added earlier.
    pub fn offset_of(&self, number: u32) -> u64 {
        self.offsets[&number]
    }

    /// Append arbitrary bytes.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Append `N 0 obj <body> endobj`.
    pub fn object(&mut self, number: u32, body: &str) -> &mut Self {
        self.object_with_generation(number, 0, body)
    }

    pub fn object_with_generation(&mut self, number: u32, generation: u32, body: &str) -> &mut Self {
        self.offsets.insert(number, self.here());
        self.data
            .extend_from_slice(format!("{} {} obj\n{}\nendobj\n", number, generation, body).as_bytes());
        self
    }

    /// Append a stream object. The payload is terminated with `\r\n`
    /// before `endstream` so carving strips exactly the terminator we
    /// added, whatever bytes the payload ends with.
    pub fn stream_object(&mut self, number: u32, dict: &str, payload: &[u8]) -> &mut Self {
        self.offsets.insert(number, self.here());
        self.data
            .extend_from_slice(format!("{} 0 obj\n{}\nstream\n", number, dict).as_bytes());
        self.data.extend_from_slice(payload);
        self.data.extend_from_slice(b"\r\nendstream\nendobj\n");
        self
    }

    /// Append a classic xref table covering objects 0..=max recorded,
    /// a trailer with `extra_trailer` spliced in, and `startxref`.
    pub fn finish_with_table(mut self, extra_trailer: &str) -> Vec<u8> {
        let max = self.offsets.keys().max().copied().unwrap_or(0);
        let xref_offset = self.here();
        self.data
            .extend_from_slice(format!("xref\n0 {}\n", max + 1).as_bytes());
        self.data
            .extend_from_slice(b"0000000000 65535 f \n");
        for number in 1..=max {
            match self.offsets.get(&number) {
                Some(offset) => self
                    .data
                    .extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes()),
                None => self.data.extend_from_slice(b"0000000000 65535 f \n"),
            }
        }
        self.data.extend_from_slice(
            format!(
                "trailer\n<< /Size {} {} >>\nstartxref\n{}\n%%EOF\n",
                max + 1,
                extra_trailer,
                xref_offset
            )
            .as_bytes(),
        );
        self.data
    }

    /// Like `finish_with_table` but every in-use offset is replaced by
    /// `bogus`, simulating a table damaged by editing.
    pub fn finish_with_damaged_table(mut self, bogus: u64) -> Vec<u8> {
        let max = self.offsets.keys().max().copied().unwrap_or(0);
        let xref_offset = self.here();
        self.data
            .extend_from_slice(format!("xref\n0 {}\n", max + 1).as_bytes());
        self.data
            .extend_from_slice(b"0000000000 65535 f \n");
        for _ in 1..=max {
            self.data
                .extend_from_slice(format!("{:010} 00000 n \n", bogus).as_bytes());
        }
        self.data.extend_from_slice(
            format!(
                "trailer\n<< /Size {} >>\nstartxref\n{}\n%%EOF\n",
                max + 1,
                xref_offset
            )
            .as_bytes(),
        );
        self.data
    }

    /// No xref, no trailer, no startxref: repair territory.
    pub fn finish_raw(self) -> Vec<u8> {
        self.data
    }

    /// Finish with a custom tail (xref streams, hand-rolled trailers).
    pub fn finish_with(mut self, tail: &str) -> Vec<u8> {
        self.data.extend_from_slice(tail.as_bytes());
        self.data
    }
}

/// Uppercase hex encoding, for embedding binary data in fixtures.
pub fn hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for b in data {
        out.push_str(&format!("{:02X}", b));
    }
    out
}

/// zlib-compress, for FlateDecode fixtures.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    use std::io::Write;
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
