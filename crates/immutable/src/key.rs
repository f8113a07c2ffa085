use std::{borrow::Cow, fmt};

/// The largest index an ordered sequence can be addressed with
///
/// Larger numbers are property names, not indices.
pub const MAX_INDEX: usize = u32::MAX as usize - 1;

/// Addresses a single step into a frozen container
///
/// Records are addressed by property name, ordered sequences by index.
/// A name that spells out a canonical index (`"0"`, `"17"`, but not `"007"`)
/// can address a sequence element as well.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(usize),
}

impl Key {
    /// The key as an index into an ordered sequence, if it is one
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        let index = match self {
            Self::Index(index) => Some(*index),
            Self::Name(name) => parse_index(name),
        };

        index.filter(|&index| index <= MAX_INDEX)
    }

    /// The key as a record property name
    ///
    /// Indices are converted to their decimal representation.
    #[must_use]
    pub fn to_property_name(&self) -> Cow<'_, str> {
        match self {
            Self::Name(name) => Cow::Borrowed(name),
            Self::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

fn parse_index(name: &str) -> Option<usize> {
    let is_canonical = !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_digit())
        && (name == "0" || !name.starts_with('0'));

    if !is_canonical {
        return None;
    }

    name.parse().ok()
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => name.fmt(f),
            Self::Index(index) => index.fmt(f),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::Name(value.to_owned())
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Self::Name(value.clone())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

/// Builds a path of [Keys](Key) for `get_in`, `set_in` and `update_in`
///
/// ```
/// # use immutable::{path, Key};
/// let path = path!["users", 0, "name"];
/// assert_eq!(path[1], Key::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    ($($key:expr),* $(,)?) => {
        [$($crate::Key::from($key)),*]
    };
}
