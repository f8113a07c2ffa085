//! Deeply immutable, structurally shared values.
//!
//! [from] freezes a plain value (a [serde_json::Value], Rust collections or scalars)
//! into a [Value]. Frozen values are never modified in place: every operation that
//! looks like a mutation returns a new [Value] which shares all unchanged records and
//! sequences with the original.
//! ```
//! # use immutable::{from, path, Value};
//! let user = from(serde_json::json!({"name": "Ada", "langs": ["en"]})).unwrap();
//! let renamed = user.set("name", "Grace").unwrap();
//!
//! assert_eq!(user.get("name").as_str(), Some("Ada"));
//! assert_eq!(renamed.get("name").as_str(), Some("Grace"));
//! assert!(Value::ptr_eq(user.get("langs"), renamed.get("langs")));
//! ```

mod array;
mod error;
mod freeze;
mod key;
mod object;
mod options;
mod value;

pub use array::Array;
pub use error::{Error, ImmutableError, TypeError};
pub use freeze::Freeze;
pub use key::{Key, MAX_INDEX};
pub use object::Object;
pub use options::{MergeMode, MergeOptions, Merger, Options, SetOptions, DEFAULT_MAX_DEPTH};
pub use value::{Mutation, TypeTag, Value};

/// Deeply freezes `value` using the default [Options]
///
/// Values that are immutable already are returned as they are.
pub fn from<T: Freeze>(value: T) -> Result<Value, Error> {
    from_with_options(value, &Options::default())
}

pub fn from_with_options<T: Freeze>(value: T, options: &Options) -> Result<Value, Error> {
    if value.is_immutable() {
        return value.freeze(options.max_depth);
    }

    let frozen = value.freeze(options.max_depth)?;
    match (frozen, &options.prototype) {
        (Value::Object(object), Some(prototype)) => {
            Ok(Value::Object(object.with_prototype(prototype.clone())))
        },
        (frozen, _) => Ok(frozen),
    }
}

/// Freezes anything that can be serialized
///
/// Fails with a [TypeError] if serialization fails, for example because a map has
/// keys that are not strings.
pub fn from_serialize<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(value).map_err(|error| TypeError::new(error.to_string()))?;
    from(json)
}

#[inline]
#[must_use]
pub fn is_immutable<T: Freeze>(value: &T) -> bool {
    value.is_immutable()
}
