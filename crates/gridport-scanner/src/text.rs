//! Byte offset to line/column conversion and class-token splitting.

use gridport_core::Location;

/// Maps byte offsets of one source text to 1-based line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    base: Location,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        Self::with_base(text, Location::new(1, 1))
    }

    /// Index for text embedded in a larger file, starting at `base`.
    ///
    /// Offsets on the first line are shifted by `base.col - 1`, every line
    /// by `base.line - 1`.
    pub fn with_base(text: &str, base: Location) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts, base }
    }

    pub fn location(&self, offset: usize) -> Location {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let mut col = (offset - self.line_starts[line]) as u32 + 1;
        if line == 0 {
            col += self.base.col - 1;
        }
        Location::new(line as u32 + self.base.line, col)
    }
}

/// Splits text into class-name-like tokens with their byte offsets.
///
/// Token characters are ASCII alphanumerics, `-` and `_`.
pub fn class_tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < bytes.len() && !is_token_byte(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            return None;
        }
        let start = pos;
        while pos < bytes.len() && is_token_byte(bytes[pos]) {
            pos += 1;
        }
        Some((start, &text[start..pos]))
    })
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}
