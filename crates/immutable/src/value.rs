use std::{fmt, sync::Arc};

use serde::{Serialize, Serializer};

use crate::{Array, Error, ImmutableError, Key, MergeOptions, Object, SetOptions, TypeError};

/// Returned by reads of missing keys
pub(crate) static UNDEFINED: Value = Value::Undefined;

/// A deeply frozen value
///
/// Records and ordered sequences are reference counted, so cloning a [Value]
/// never copies the underlying data. None of the operations below modify their
/// receiver, they return a new value that shares every unchanged subtree with
/// the original.
///
/// Dropping a value never recurses, no matter how deeply it is nested.
/// Comparing, formatting and plain copies descend once per nesting level.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Arc<str>),
    Array(Array),
    Object(Object),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeTag {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl TypeTag {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// An in-place modification, which immutable values always refuse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation<'a> {
    /// `value[key] = ...`
    Assign(&'a str),

    /// `delete value[key]`
    Delete(&'a str),
    SetPrototypeOf,
    Push,
    Pop,
    Shift,
    Unshift,
    Splice,
    Sort,
    Reverse,
}

impl Mutation<'_> {
    #[must_use]
    pub const fn method_name(&self) -> &'static str {
        match self {
            Self::Assign(_) => "assign",
            Self::Delete(_) => "delete",
            Self::SetPrototypeOf => "setPrototypeOf",
            Self::Push => "push",
            Self::Pop => "pop",
            Self::Shift => "shift",
            Self::Unshift => "unshift",
            Self::Splice => "splice",
            Self::Sort => "sort",
            Self::Reverse => "reverse",
        }
    }

    const fn is_array_method(&self) -> bool {
        matches!(
            self,
            Self::Push | Self::Pop | Self::Shift | Self::Unshift | Self::Splice | Self::Sort | Self::Reverse
        )
    }
}

impl Value {
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Undefined => TypeTag::Undefined,
            Self::Null => TypeTag::Null,
            Self::Boolean(_) => TypeTag::Boolean,
            Self::Number(_) => TypeTag::Number,
            Self::String(_) => TypeTag::String,
            Self::Array(_) => TypeTag::Array,
            Self::Object(_) => TypeTag::Object,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Identity comparison
    ///
    /// Records and sequences are equal if they are the same node, scalars if they
    /// hold the same value. Unlike `==`, `NaN` is identical to itself.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        match (a, b) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Array::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Object::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Reads a property or element, yielding [Value::Undefined] when it is missing
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> &Self {
        self.get_key(&key.into())
    }

    pub(crate) fn get_key(&self, key: &Key) -> &Self {
        match self {
            Self::Object(object) => object.get(&key.to_property_name()),
            Self::Array(array) => key.as_index().map_or(&UNDEFINED, |index| array.get(index)),
            _ => &UNDEFINED,
        }
    }

    /// Follows `path` through nested containers
    ///
    /// Yields [Value::Undefined] if any step is missing, and for an empty path.
    #[must_use]
    pub fn get_in(&self, path: &[Key]) -> &Self {
        if path.is_empty() {
            return &UNDEFINED;
        }

        let mut current = self;
        for key in path {
            if matches!(current, Self::Undefined | Self::Null) {
                return &UNDEFINED;
            }
            current = current.get_key(key);
        }
        current
    }

    /// Like [get_in](Self::get_in), but returns `default` instead of [Value::Undefined]
    #[must_use]
    pub fn get_in_or<'a>(&'a self, path: &[Key], default: &'a Self) -> &'a Self {
        match self.get_in(path) {
            Self::Undefined => default,
            found => found,
        }
    }

    pub fn set(&self, key: impl Into<Key>, value: impl Into<Self>) -> Result<Self, Error> {
        self.set_with(key, value, SetOptions::default())
    }

    pub fn set_with(
        &self,
        key: impl Into<Key>,
        value: impl Into<Self>,
        options: SetOptions,
    ) -> Result<Self, Error> {
        let key = key.into();
        match self {
            Self::Object(object) => Ok(Self::Object(object.set_with(
                key.to_property_name(),
                value,
                options,
            ))),
            Self::Array(array) => {
                let index = array_index(&key)?;
                array.set_with(index, value, options).map(Self::Array)
            },
            other => Err(unsupported_receiver("set", other)),
        }
    }

    pub fn set_in(&self, path: &[Key], value: impl Into<Self>) -> Result<Self, Error> {
        self.set_in_with(path, value, SetOptions::default())
    }

    pub fn set_in_with(
        &self,
        path: &[Key],
        value: impl Into<Self>,
        options: SetOptions,
    ) -> Result<Self, Error> {
        match self {
            Self::Object(object) => object.set_in_with(path, value, options).map(Self::Object),
            Self::Array(array) => array.set_in_with(path, value, options).map(Self::Array),
            other => Err(unsupported_receiver("setIn", other)),
        }
    }

    /// Replaces the value at `key` with `updater(current)`
    pub fn update<F, V>(&self, key: impl Into<Key>, updater: F) -> Result<Self, Error>
    where
        F: FnOnce(&Self) -> V,
        V: Into<Self>,
    {
        let key = key.into();
        let updated = updater(self.get_key(&key)).into();
        self.set(key, updated)
    }

    /// Replaces the value at the end of `path` with `updater(current)`
    pub fn update_in<F, V>(&self, path: &[Key], updater: F) -> Result<Self, Error>
    where
        F: FnOnce(&Self) -> V,
        V: Into<Self>,
    {
        let updated = updater(self.get_in(path)).into();
        self.set_in(path, updated)
    }

    pub fn merge(&self, source: &Self, options: &MergeOptions<'_>) -> Result<Self, Error> {
        match self {
            Self::Object(object) => object.merge(source, options).map(Self::Object),
            other => Err(unsupported_receiver("merge", other)),
        }
    }

    pub fn replace(&self, source: &Self, deep: bool) -> Result<Self, Error> {
        match self {
            Self::Object(object) => object.replace(source, deep).map(Self::Object),
            other => Err(unsupported_receiver("replace", other)),
        }
    }

    pub fn without<K: AsRef<str>>(&self, keys: &[K]) -> Result<Self, Error> {
        match self {
            Self::Object(object) => Ok(Self::Object(object.without(keys))),
            other => Err(unsupported_receiver("without", other)),
        }
    }

    /// Removes every property for which `predicate(value, key)` returns `true`
    pub fn without_where<F>(&self, predicate: F) -> Result<Self, Error>
    where
        F: FnMut(&Self, &str) -> bool,
    {
        match self {
            Self::Object(object) => Ok(Self::Object(object.without_where(predicate))),
            other => Err(unsupported_receiver("without", other)),
        }
    }

    pub fn flat_map<F>(&self, iterator: F) -> Result<Self, Error>
    where
        F: FnMut(&Self, usize) -> Self,
    {
        match self {
            Self::Array(array) => Ok(Self::Array(array.flat_map(iterator))),
            other => Err(unsupported_receiver("flatMap", other)),
        }
    }

    /// Always fails: immutable values cannot be changed in place
    ///
    /// Mutations that exist for the receiver's kind fail with an
    /// [ImmutableError], everything else with a [TypeError].
    pub fn mutate(&self, mutation: Mutation<'_>) -> Result<(), Error> {
        let error: Error = match (self, mutation) {
            (Self::Object(_) | Self::Array(_), Mutation::Assign(key)) => ImmutableError::new(format!(
                "Cannot assign to property `{key}` of an Immutable data structure."
            ))
            .into(),
            (Self::Object(_) | Self::Array(_), Mutation::Delete(key)) => ImmutableError::new(format!(
                "Cannot delete property `{key}` of an Immutable data structure."
            ))
            .into(),
            (Self::Object(_) | Self::Array(_), Mutation::SetPrototypeOf) => {
                ImmutableError::banned_method(mutation.method_name()).into()
            },
            (Self::Array(_), m) if m.is_array_method() => {
                ImmutableError::banned_method(m.method_name()).into()
            },
            (Self::Object(_), m) => TypeError::new(format!("{} is not a function", m.method_name())).into(),
            (Self::Undefined | Self::Null, m) => TypeError::new(format!(
                "Cannot {} on {}",
                m.method_name(),
                self.type_tag().name()
            ))
            .into(),
            (primitive, Mutation::Assign(key)) => TypeError::new(format!(
                "Cannot create property `{key}` on {} primitive",
                primitive.type_tag().name()
            ))
            .into(),
            (_, m) => TypeError::new(format!("{} is not a function", m.method_name())).into(),
        };

        Err(error)
    }

    /// Deep plain copy of this value
    ///
    /// `undefined` record properties are omitted and `undefined` sequence elements
    /// become `null`, as are non-finite numbers.
    #[must_use]
    pub fn to_plain(&self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => plain_number(*n),
            Self::String(s) => serde_json::Value::String(s.to_string()),
            Self::Array(array) => array.as_mutable_deep(),
            Self::Object(object) => object.as_mutable_deep(),
        }
    }

    /// The property name this value turns into when used as a record key
    #[must_use]
    pub fn to_property_name(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_owned(),
            Self::Null => "null".to_owned(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => number_to_string(*n),
            Self::String(s) => s.to_string(),
            Self::Array(array) => array
                .iter()
                .map(|element| match element {
                    Self::Undefined | Self::Null => String::new(),
                    other => other.to_property_name(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Object(_) => "[object Object]".to_owned(),
        }
    }
}

/// Drops `pending` and everything below it one node at a time
///
/// Containers that are not shared hand their children over before they are dropped,
/// so no drop ever has to descend into a child.
pub(crate) fn drop_iteratively(mut pending: Vec<Value>) {
    while let Some(mut value) = pending.pop() {
        match &mut value {
            Value::Array(array) => array.detach_children(&mut pending),
            Value::Object(object) => object.detach_children(&mut pending),
            _ => {},
        }
    }
}

#[inline]
pub(crate) fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

pub(crate) fn array_index(key: &Key) -> Result<usize, Error> {
    key.as_index().ok_or_else(|| {
        TypeError::new(format!(
            "`{key}` cannot be used as an index into an Immutable array"
        ))
        .into()
    })
}

/// Continues a `set_in` below the current container
///
/// `tail` is never empty. If `current` is not a container, a new one is created:
/// a sequence if the next key is an index, a record otherwise.
pub(crate) fn set_in_child(
    current: Option<&Value>,
    tail: &[Key],
    value: Value,
    options: SetOptions,
) -> Result<Value, Error> {
    match current {
        Some(Value::Object(object)) => object.set_in_with(tail, value, options).map(Value::Object),
        Some(Value::Array(array)) => array.set_in_with(tail, value, options).map(Value::Array),
        _ => {
            if tail.first().and_then(Key::as_index).is_some() {
                Array::new().set_in_with(tail, value, options).map(Value::Array)
            } else {
                Object::new().set_in_with(tail, value, options).map(Value::Object)
            }
        },
    }
}

fn unsupported_receiver(method: &str, receiver: &Value) -> Error {
    TypeError::new(format!(
        "Immutable#{method} cannot be invoked on {}",
        receiver.type_tag().name()
    ))
    .into()
}

fn plain_number(n: f64) -> serde_json::Value {
    // Integral values are kept integral so they print without a trailing ".0"
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number((n as i64).into());
    }

    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => s.fmt(f),
            Self::Array(_) | Self::Object(_) => self.to_plain().fmt(f),
            other => other.to_property_name().fmt(f),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined | Self::Null => serializer.serialize_unit(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Number(n) => plain_number(*n).serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(array) => serializer.collect_seq(array.iter()),
            Self::Object(object) => {
                serializer.collect_map(object.iter().filter(|(_, value)| !value.is_undefined()))
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

macro_rules! number_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Number(value as f64)
                }
            }
        )*
    };
}

number_conversions!(f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(Arc::from(value))
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Self::String(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
