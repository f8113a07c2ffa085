/// Whitespace as understood by `String.prototype.trim`, including the byte order mark
#[inline]
#[must_use]
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'..='\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

#[inline]
#[must_use]
pub fn trim(input: &str) -> &str {
    input.trim_matches(is_js_whitespace)
}

/// The UTF-16 length of a string, which is what hostname limits are measured in
#[inline]
#[must_use]
pub fn utf16_len(input: &str) -> usize {
    input.chars().map(char::len_utf16).sum()
}

/// Finds the first occurrence of any byte that `is_match` accepts
#[inline]
pub fn find_byte<F: Fn(u8) -> bool>(input: &str, is_match: F) -> Option<usize> {
    input.bytes().position(is_match)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_unicode_whitespace() {
        assert_eq!(trim("\u{FEFF} \t http://a.com \n\u{3000}"), "http://a.com");
        assert_eq!(trim("\u{0085}a"), "\u{0085}a");
    }

    #[test]
    fn utf16_length() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("ü"), 1);
        assert_eq!(utf16_len("😀"), 2);
    }
}
