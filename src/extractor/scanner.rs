//! Case-insensitive anchor scanner
//!
//! Keeps an ASCII-lowercased mirror of the document so anchors can be located without
//! regard to case while values are sliced from the original text. ASCII lowering never
//! changes byte lengths, so offsets are shared between the two.

/// Scanner over one document
pub struct Scanner<'a> {
    text: &'a str,
    lower: String,
}

impl<'a> Scanner<'a> {
    /// Prepare a document for scanning
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_ascii_lowercase(),
        }
    }

    /// Document length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the document is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Original text between two offsets
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start..end]
    }

    /// Byte at `at`, if any
    pub fn byte_at(&self, at: usize) -> Option<u8> {
        self.text.as_bytes().get(at).copied()
    }

    /// Offset of the next occurrence of `needle` at or after `from`, ignoring ASCII case
    pub fn find_ci(&self, needle: &str, from: usize) -> Option<usize> {
        let needle = needle.to_ascii_lowercase();
        self.lower.get(from..)?.find(&needle).map(|i| i + from)
    }

    /// Offset of the next `needle` in `[from, limit)`, ignoring ASCII case
    pub fn find_ci_within(&self, needle: &str, from: usize, limit: usize) -> Option<usize> {
        let at = self.find_ci(needle, from)?;
        (at + needle.len() <= limit).then_some(at)
    }

    /// First offset at or after `at` that is not ASCII whitespace
    pub fn skip_ws(&self, mut at: usize) -> usize {
        while self.byte_at(at).is_some_and(|b| b.is_ascii_whitespace()) {
            at += 1;
        }
        at
    }

    /// Whether `at` starts a new word (previous byte is not an identifier character)
    pub fn is_word_start(&self, at: usize) -> bool {
        at == 0
            || self
                .byte_at(at - 1)
                .is_some_and(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
    }

    /// Whether a tag name ending at `at` is complete (`<td>` but not `<tdx>`)
    pub fn is_tag_name_end(&self, at: usize) -> bool {
        matches!(self.byte_at(at), Some(b) if b == b'>' || b == b'/' || b.is_ascii_whitespace())
    }

    /// Quoted value starting at `at`
    ///
    /// `at` must hold one of `quotes`; the value runs to the matching quote, which must
    /// appear within `max_len` bytes. Returns the value and the offset just past the
    /// closing quote.
    pub fn quoted_at(&self, at: usize, quotes: &[u8], max_len: usize) -> Option<(&'a str, usize)> {
        let quote = self.byte_at(at).filter(|q| quotes.contains(q))?;
        let start = at + 1;
        let window_end = (start + max_len + 1).min(self.len());
        let close = self.text.as_bytes()[start..window_end]
            .iter()
            .position(|&b| b == quote)?;
        Some((self.slice(start, start + close), start + close + 1))
    }
}
