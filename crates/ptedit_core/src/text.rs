//! Char-offset text helpers.
//!
//! Selection offsets are counted in Unicode scalar values, so every helper
//! here takes and returns char indices rather than byte indices.

use std::ops::Range;

/// Number of chars in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of char `char_index`, clamped to the end of `text`.
pub fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Slice `text` by a char range; out-of-range bounds are clamped.
pub fn slice_chars(text: &str, range: Range<usize>) -> &str {
    let start = char_to_byte(text, range.start);
    let end = char_to_byte(text, range.end.max(range.start));
    &text[start..end]
}

/// Split `text` at a char index.
pub fn split_at_char(text: &str, char_index: usize) -> (&str, &str) {
    text.split_at(char_to_byte(text, char_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_helpers_respect_multibyte_text() {
        let text = "héllo wörld";
        assert_eq!(char_len(text), 11);
        assert_eq!(slice_chars(text, 1..5), "éllo");
        assert_eq!(split_at_char(text, 6), ("héllo ", "wörld"));
    }

    #[test]
    fn out_of_range_indices_clamp_to_end() {
        assert_eq!(char_to_byte("abc", 10), 3);
        assert_eq!(slice_chars("abc", 2..10), "c");
        assert_eq!(slice_chars("abc", 5..1), "");
    }
}
