//! Shared utility helpers.

/// Case-insensitive substring search without allocating an uppercase copy.
#[inline]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle_bytes = needle.as_bytes();
    let haystack_bytes = haystack.as_bytes();
    if needle_bytes.len() > haystack_bytes.len() {
        return false;
    }
    haystack_bytes
        .windows(needle_bytes.len())
        .any(|window| window.eq_ignore_ascii_case(needle_bytes))
}

/// Case-insensitive keyword search: returns the byte offset of the first
/// occurrence of `keyword` that stands alone as a word and sits outside
/// single-quoted literals.
pub fn find_keyword_ci(haystack: &str, keyword: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let kw = keyword.as_bytes();
    if kw.is_empty() || kw.len() > bytes.len() {
        return None;
    }

    let mut in_quote = false;
    let mut i = 0;
    while i + kw.len() <= bytes.len() {
        let b = bytes[i];
        if b == b'\'' {
            in_quote = !in_quote;
            i += 1;
            continue;
        }
        if !in_quote && bytes[i..i + kw.len()].eq_ignore_ascii_case(kw) {
            let before_ok = i == 0 || !is_word_byte(bytes[i - 1]);
            let after_ok = bytes.get(i + kw.len()).map_or(true, |&a| !is_word_byte(a));
            if before_ok && after_ok {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
