//! Diff-match-patch text patch builder.
//!
//! Produces the textual patch format consumed by diff-match-patch appliers
//! (`@@ -a,b +c,d @@` hunks with URI-encoded `+`/`-`/` ` lines). Coordinates
//! are UTF-16 code units because the common appliers count that way.

use similar::{ChangeTag, TextDiff};

/// Context chars kept around the changed region.
const PATCH_MARGIN: usize = 4;

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn keep_unencoded(c: char) -> bool {
    c.is_ascii_alphanumeric() || " ;,/?:@&=+$-_.!~*'()#".contains(c)
}

/// `encodeURI` with spaces left literal, as diff-match-patch writes them.
fn encode_uri(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        if keep_unencoded(c) {
            out.push(c);
        } else {
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}

fn coords(start: usize, length: usize) -> String {
    match length {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

fn collect_chunks(old: &str, new: &str) -> Vec<(ChangeTag, String)> {
    let diff = TextDiff::from_chars(old, new);
    let mut chunks: Vec<(ChangeTag, String)> = Vec::new();
    for change in diff.iter_all_changes() {
        match chunks.last_mut() {
            Some((tag, text)) if *tag == change.tag() => text.push_str(change.value()),
            _ => chunks.push((change.tag(), change.value().to_string())),
        }
    }
    chunks
}

/// Build a single-hunk patch turning `old` into `new`.
///
/// Returns `None` when the texts are equal.
pub fn diff_match_patch(old: &str, new: &str) -> Option<String> {
    if old == new {
        return None;
    }
    let mut chunks = collect_chunks(old, new);

    let mut start = 0;
    if let Some((ChangeTag::Equal, text)) = chunks.first_mut() {
        let keep_from = text.chars().count().saturating_sub(PATCH_MARGIN);
        let (dropped, kept) = crate::text::split_at_char(text, keep_from);
        start = utf16_len(dropped);
        *text = kept.to_string();
    }
    if chunks.len() > 1 {
        if let Some((ChangeTag::Equal, text)) = chunks.last_mut() {
            *text = crate::text::slice_chars(text, 0..PATCH_MARGIN).to_string();
        }
    }

    let mut old_len = 0;
    let mut new_len = 0;
    let mut body = String::new();
    for (tag, text) in &chunks {
        let len = utf16_len(text);
        let sign = match tag {
            ChangeTag::Equal => {
                old_len += len;
                new_len += len;
                ' '
            }
            ChangeTag::Delete => {
                old_len += len;
                '-'
            }
            ChangeTag::Insert => {
                new_len += len;
                '+'
            }
        };
        body.push(sign);
        body.push_str(&encode_uri(text));
        body.push('\n');
    }

    Some(format!(
        "@@ -{} +{} @@\n{}",
        coords(start, old_len),
        coords(start, new_len),
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_texts_produce_no_patch() {
        assert_eq!(diff_match_patch("same", "same"), None);
    }

    #[test]
    fn append_keeps_trailing_context_of_prefix() {
        let patch = diff_match_patch("hello", "hello world").expect("patch");
        assert_eq!(patch, "@@ -2,4 +2,10 @@\n ello\n+ world\n");
    }

    #[test]
    fn insert_into_empty_text_uses_zero_length_coordinates() {
        let patch = diff_match_patch("", "a").expect("patch");
        assert_eq!(patch, "@@ -0,0 +1 @@\n+a\n");
    }

    #[test]
    fn deletion_and_non_ascii_are_encoded() {
        let patch = diff_match_patch("abc\ndef", "abdef").expect("patch");
        assert!(patch.contains("-c%0A\n"), "patch: {}", patch);

        let unicode = diff_match_patch("", "é").expect("patch");
        assert!(unicode.ends_with("+%C3%A9\n"), "patch: {}", unicode);
    }
}
