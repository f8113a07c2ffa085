//! Knobs for constructing and deriving immutable values

use std::fmt;

use crate::{Object, Value};

/// Construction depth limit used when [Options::max_depth] is not overridden
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Controls how [from_with_options](crate::from_with_options) freezes a value
#[derive(Clone, Debug)]
pub struct Options {
    /// Prototype given to the top-level record
    ///
    /// Missing properties are looked up on the prototype. Nested records and
    /// values that were already immutable are left alone.
    pub prototype: Option<Object>,

    /// The maximum number of nested containers that may be frozen
    ///
    /// Construction fails with an [ImmutableError](crate::ImmutableError) once
    /// the input nests deeper than this.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prototype: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Deep-merge a record into an existing record instead of replacing it
    pub deep: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeMode {
    /// Keys that only exist on the receiver are kept
    #[default]
    Merge,

    /// Keys that only exist on the receiver are dropped
    Replace,
}

/// Computes the merged value for a single key from `(current, incoming)`
///
/// `current` is [Value::Undefined] if the receiver does not have the key.
/// Returning [None] falls back to the default merge behaviour.
pub type Merger<'a> = &'a dyn Fn(&Value, &Value) -> Option<Value>;

#[derive(Clone, Copy, Default)]
pub struct MergeOptions<'a> {
    /// Merge nested records recursively
    pub deep: bool,
    pub mode: MergeMode,
    pub merger: Option<Merger<'a>>,
}

impl<'a> MergeOptions<'a> {
    #[must_use]
    pub fn deep() -> Self {
        Self {
            deep: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_merger(mut self, merger: Merger<'a>) -> Self {
        self.merger = Some(merger);
        self
    }
}

impl fmt::Debug for MergeOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeOptions")
            .field("deep", &self.deep)
            .field("mode", &self.mode)
            .field("merger", &self.merger.map(|_| "<fn>"))
            .finish()
    }
}
