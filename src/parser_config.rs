//! Parser configuration options.
//!
//! Options are plain data passed at construction; there is no global
//! state. The limits exist because hostile documents weaponize the
//! decode pipeline: a few hundred bytes of input can declare gigabytes
//! of output.

/// Per-parser options controlling resource limits.
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Maximum decompression ratio (decompressed : compressed) allowed
    /// across the filter chain. 0 disables the check.
    pub max_decompression_ratio: u32,

    /// Maximum decompressed stream size in bytes. 0 disables the check.
    pub max_decompressed_size: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_decompression_ratio: 1_000,
            max_decompressed_size: 100 * 1024 * 1024, // 100 MB
        }
    }
}

impl ParserOptions {
    /// Remove all resource limits. Only for trusted input.
    pub fn unlimited() -> Self {
        Self {
            max_decompression_ratio: 0,
            max_decompressed_size: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_bounded() {
        let opts = ParserOptions::default();
        assert!(opts.max_decompression_ratio > 0);
        assert!(opts.max_decompressed_size > 0);
    }

    #[test]
    fn test_unlimited_disables_checks() {
        let opts = ParserOptions::unlimited();
        assert_eq!(opts.max_decompression_ratio, 0);
        assert_eq!(opts.max_decompressed_size, 0);
    }
}
