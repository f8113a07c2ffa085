//! Punycode encoding as per <https://www.rfc-editor.org/rfc/rfc3492>
//!
//! Used to turn internationalized hostname labels into their ASCII form.

use error_derive::Error;

const BASE: u32 = 36;
const TMIN: u32 = 1;
const TMAX: u32 = 26;
const SKEW: u32 = 38;
const DAMP: u32 = 700;
const INITIAL_BIAS: u32 = 72;
const INITIAL_N: u32 = 128;

/// Prefix of an encoded label
const ACE_PREFIX: &str = "xn--";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PunycodeError {
    #[msg = "overflow while encoding punycode"]
    Overflow,
}

fn encode_digit(c: u32) -> char {
    debug_assert!(c < BASE);
    let byte = if c < 26 {
        // a..z
        c as u8 + b'a'
    } else {
        // 0..9
        (c - 26) as u8 + b'0'
    };
    byte as char
}

fn adapt(mut delta: u32, num_points: u32, is_first: bool) -> u32 {
    delta /= if is_first { DAMP } else { 2 };

    delta += delta / num_points;
    let mut k = 0;

    while delta > ((BASE - TMIN) * TMAX) / 2 {
        delta /= BASE - TMIN;
        k += BASE;
    }

    (BASE * k) + (((BASE - TMIN + 1) * delta) / (delta + SKEW))
}

fn threshold(k: u32, bias: u32) -> u32 {
    if k <= bias + TMIN {
        TMIN
    } else if k >= bias + TMAX {
        TMAX
    } else {
        k - bias
    }
}

pub fn encode(input: &str) -> Result<String, PunycodeError> {
    let code_points: Vec<u32> = input.chars().map(|c| c as u32).collect();

    let mut n = INITIAL_N;
    let mut delta: u32 = 0;
    let mut bias = INITIAL_BIAS;
    let num_basic = code_points.iter().filter(|&&c| c < 0x80).count() as u32;
    let mut h = num_basic;

    let mut output: String = input.chars().filter(char::is_ascii).collect();
    if num_basic > 0 {
        output.push('-');
    }

    while (h as usize) < code_points.len() {
        let m = code_points
            .iter()
            .copied()
            .filter(|&c| c >= n)
            .min()
            .ok_or(PunycodeError::Overflow)?;

        delta = (m - n)
            .checked_mul(h + 1)
            .and_then(|increment| delta.checked_add(increment))
            .ok_or(PunycodeError::Overflow)?;
        n = m;

        for &c in &code_points {
            if c < n {
                delta = delta.checked_add(1).ok_or(PunycodeError::Overflow)?;
            }

            if c == n {
                let mut q = delta;

                let mut k = BASE;
                loop {
                    let t = threshold(k, bias);
                    if q < t {
                        break;
                    }

                    output.push(encode_digit(t + ((q - t) % (BASE - t))));
                    q = (q - t) / (BASE - t);
                    k += BASE;
                }

                output.push(encode_digit(q));
                bias = adapt(delta, h + 1, h == num_basic);
                delta = 0;
                h += 1;
            }
        }

        delta = delta.checked_add(1).ok_or(PunycodeError::Overflow)?;
        n += 1;
    }

    Ok(output)
}

/// Converts a domain name to its ASCII form
///
/// Ideographic full stops are treated as label separators. Labels that contain
/// anything but printable ASCII are punycode-encoded, labels that fail to encode
/// are kept as they are.
#[must_use]
pub fn to_ascii(domain: &str) -> String {
    domain
        .split(['.', '\u{3002}', '\u{FF0E}', '\u{FF61}'])
        .map(|label| {
            if label.chars().all(|c| matches!(c, '\x20'..='\x7E')) {
                return label.to_owned();
            }

            match encode(label) {
                Ok(encoded) => format!("{ACE_PREFIX}{encoded}"),
                Err(error) => {
                    log::debug!("Keeping hostname label {label:?} as is: {error}");
                    label.to_owned()
                },
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode("académie-française").unwrap(), "acadmie-franaise-npb1a");
        assert_eq!(encode("münchen").unwrap(), "mnchen-3ya");
        assert_eq!(encode("ü").unwrap(), "tda");
    }

    #[test]
    fn domain_to_ascii() {
        assert_eq!(to_ascii("www.münchen.de"), "www.xn--mnchen-3ya.de");
        assert_eq!(to_ascii("example.com"), "example.com");
        assert_eq!(to_ascii("a\u{3002}b"), "a.b");
    }
}
