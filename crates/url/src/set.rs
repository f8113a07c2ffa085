//! Utilities for defining a subset of ASCII characters

use std::mem;

type Block = usize;

const ASCII_MAX: u8 = 0x80;
const BITS_PER_BLOCK: usize = mem::size_of::<usize>() * 8;
const NUM_BLOCKS: usize = ASCII_MAX as usize / BITS_PER_BLOCK;

#[derive(Clone, Copy, Default)]
pub struct AsciiSet {
    // Relies on the fact that ASCII_MAX is a multiple of the pointer width
    bits: [Block; NUM_BLOCKS],
}

impl AsciiSet {
    pub const EMPTY: Self = Self {
        bits: [0; NUM_BLOCKS],
    };

    /// Contains every byte in `start..=end`
    #[must_use]
    pub const fn from_range(start: u8, end: u8) -> Self {
        let mut set = Self::EMPTY;

        let mut i = start;
        while i <= end {
            set = set.add(i);
            i += 1;
        }

        set
    }

    #[must_use]
    pub const fn from_bytes(bytes: &[u8]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < bytes.len() {
            set = set.add(bytes[i]);
            i += 1;
        }

        set
    }

    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let mut result = Self::EMPTY;

        let mut i = 0;
        while i < NUM_BLOCKS {
            result.bits[i] = self.bits[i] | other.bits[i];
            i += 1;
        }

        result
    }

    /// Test whether or not the set contains the given byte
    ///
    /// Bytes outside of the ASCII range are never contained.
    #[inline]
    #[must_use]
    pub const fn contains(&self, b: u8) -> bool {
        if b >= ASCII_MAX {
            return false;
        }

        let index = (b as usize) / BITS_PER_BLOCK;
        let offset = (b as usize) % BITS_PER_BLOCK;
        self.bits[index] & (1 << offset) != 0
    }

    #[inline]
    #[must_use]
    pub fn contains_char(&self, c: char) -> bool {
        u8::try_from(c).is_ok_and(|b| self.contains(b))
    }

    /// Panics (at compile time, for constant sets) if `b` is not ASCII
    #[must_use]
    pub const fn add(mut self, b: u8) -> Self {
        assert!(b < ASCII_MAX);

        let index = (b as usize) / BITS_PER_BLOCK;
        let offset = (b as usize) % BITS_PER_BLOCK;
        self.bits[index] |= 1 << offset;
        self
    }
}

/// `A-Z`, `a-z` and `0-9`
pub const ALPHANUMERIC: AsciiSet = AsciiSet::from_range(b'a', b'z')
    .merge(AsciiSet::from_range(b'A', b'Z'))
    .merge(AsciiSet::from_range(b'0', b'9'));

/// Characters that may appear in a protocol, before the `:`
pub const PROTOCOL: AsciiSet = ALPHANUMERIC.merge(AsciiSet::from_bytes(b".+-"));

/// Characters that may appear in a single hostname label
pub const HOSTNAME_LABEL: AsciiSet = ALPHANUMERIC.merge(AsciiSet::from_bytes(b"+_-"));

/// Characters that are escaped in everything after the host
pub const AUTO_ESCAPE: AsciiSet = AsciiSet::from_bytes(b"'{}|\\^`<>\" \r\n\t");

/// Characters that end the host
pub const NON_HOST: AsciiSet = AUTO_ESCAPE.merge(AsciiSet::from_bytes(b"%/?;#"));

/// Characters that end the authority part of a URL
pub const HOST_ENDING: AsciiSet = AsciiSet::from_bytes(b"/?#");

/// Characters that component encoding leaves alone
pub const URI_COMPONENT_UNRESERVED: AsciiSet =
    ALPHANUMERIC.merge(AsciiSet::from_bytes(b"-_.!~*'()"));
