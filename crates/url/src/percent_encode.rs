use std::borrow::Cow;

use crate::set::{AsciiSet, AUTO_ESCAPE, URI_COMPONENT_UNRESERVED};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encodes every byte of the UTF-8 encoding of `input` that is not in `keep`
#[must_use]
pub fn percent_encode(input: &str, keep: &AsciiSet) -> String {
    let mut result = String::with_capacity(input.len());

    for c in input.chars() {
        percent_encode_char(c, keep, &mut result);
    }

    result
}

#[inline]
fn percent_encode_char(c: char, keep: &AsciiSet, output: &mut String) {
    if keep.contains_char(c) {
        output.push(c);
        return;
    }

    let mut buffer = [0; 4];
    for &b in c.encode_utf8(&mut buffer).as_bytes() {
        percent_encode_byte(b, output);
    }
}

#[inline]
fn percent_encode_byte(byte: u8, output: &mut String) {
    output.push('%');
    output.push(HEX_DIGITS[(byte / 16) as usize] as char);
    output.push(HEX_DIGITS[(byte % 16) as usize] as char);
}

/// Encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
#[must_use]
pub fn encode_uri_component(input: &str) -> String {
    percent_encode(input, &URI_COMPONENT_UNRESERVED)
}

/// Escapes the characters that are never left raw after the host
///
/// This includes `'`, which [encode_uri_component] would keep.
pub(crate) fn auto_escape(input: &str) -> Cow<'_, str> {
    if !input.bytes().any(|b| AUTO_ESCAPE.contains(b)) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        if AUTO_ESCAPE.contains_char(c) {
            // Auto-escaped characters are all ASCII
            percent_encode_byte(c as u8, &mut result);
        } else {
            result.push(c);
        }
    }
    Cow::Owned(result)
}

/// Decodes every valid `%XX` sequence
///
/// Malformed escapes are kept as they are and byte sequences that are not valid
/// UTF-8 are replaced with U+FFFD.
#[must_use]
pub fn percent_decode(encoded: &str) -> String {
    let decode = |first: u8, second: u8| {
        let value = (first as char).to_digit(16)? * 16 + (second as char).to_digit(16)?;
        u8::try_from(value).ok()
    };

    let bytes = encoded.as_bytes();
    if !bytes.contains(&b'%') {
        return encoded.to_owned();
    }

    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(b) = decode(bytes[i + 1], bytes[i + 2]) {
                result.push(b);
                i += 3;
                continue;
            }
        }

        result.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&result).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode_byte() {
        let mut buffer = String::new();
        percent_encode_byte(0x23, &mut buffer);
        assert_eq!(buffer, "%23");

        buffer.clear();
        percent_encode_byte(0x7F, &mut buffer);
        assert_eq!(buffer, "%7F");
    }

    #[test]
    fn component_encoding() {
        assert_eq!(encode_uri_component("a b&c=d/é"), "a%20b%26c%3Dd%2F%C3%A9");
        assert_eq!(encode_uri_component("-_.!~*'()"), "-_.!~*'()");
    }

    #[test]
    fn auto_escaping() {
        assert_eq!(auto_escape("/a b'c"), "/a%20b%27c");
        assert!(matches!(auto_escape("/plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("%25%s%1G"), "%%s%1G");
        assert_eq!(percent_decode("a%20b%C3%A9"), "a bé");
        assert_eq!(percent_decode("trailing%2"), "trailing%2");
        assert_eq!(percent_decode("%FF"), "\u{FFFD}");
    }
}
