//! Frozen records

use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::{
    value::{drop_iteratively, is_container, set_in_child, UNDEFINED},
    Error, Key, MergeMode, MergeOptions, SetOptions, TypeError, Value,
};

/// A frozen record with insertion-ordered properties
///
/// Cloning an [Object] only clones a pointer. Two objects are [ptr_eq](Object::ptr_eq)
/// if they share the same node, which is what derived values do for everything
/// that did not change.
#[derive(Clone, Default)]
pub struct Object {
    inner: Arc<ObjectData>,
}

#[derive(Clone, Default)]
struct ObjectData {
    properties: IndexMap<String, Value>,

    /// Consulted for properties that the object does not have itself
    prototype: Option<Object>,
}

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(properties: IndexMap<String, Value>, prototype: Option<Self>) -> Self {
        Self {
            inner: Arc::new(ObjectData {
                properties,
                prototype,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.properties.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.properties.is_empty()
    }

    /// Own properties in insertion order
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.inner.properties.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.properties.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.inner.properties.values()
    }

    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.properties.contains_key(key)
    }

    #[inline]
    #[must_use]
    pub fn prototype(&self) -> Option<&Self> {
        self.inner.prototype.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn get_own(&self, key: &str) -> Option<&Value> {
        self.inner.properties.get(key)
    }

    /// Looks up `key` on the object and then along its prototype chain
    #[must_use]
    pub fn get(&self, key: &str) -> &Value {
        let mut object = self;
        loop {
            if let Some(value) = object.get_own(key) {
                return value;
            }

            match object.prototype() {
                Some(prototype) => object = prototype,
                None => return &UNDEFINED,
            }
        }
    }

    #[must_use]
    pub fn get_in(&self, path: &[Key]) -> &Value {
        let Some((head, tail)) = path.split_first() else {
            return &UNDEFINED;
        };

        let value = self.get(&head.to_property_name());
        if tail.is_empty() {
            value
        } else {
            value.get_in(tail)
        }
    }

    pub(crate) fn with_prototype(mut self, prototype: Self) -> Self {
        Arc::make_mut(&mut self.inner).prototype = Some(prototype);
        self
    }

    /// Copy of this object with a single property changed
    ///
    /// Only this node is copied, every property value is shared.
    fn with_property(&self, key: String, value: Value) -> Self {
        let mut copy = self.clone();
        Arc::make_mut(&mut copy.inner).properties.insert(key, value);
        copy
    }

    #[must_use]
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_with(key, value, SetOptions::default())
    }

    /// Returns `self` unchanged if the property already holds an identical value
    #[must_use]
    pub fn set_with(&self, key: impl Into<String>, value: impl Into<Value>, options: SetOptions) -> Self {
        let key = key.into();
        let mut value = value.into();

        if let Some(current) = self.get_own(&key) {
            let merged = match (current, &value) {
                (Value::Object(current), Value::Object(incoming))
                    if options.deep && !Self::ptr_eq(current, incoming) =>
                {
                    let options = MergeOptions::deep().with_mode(MergeMode::Replace);
                    Some(Value::Object(current.merge_object(incoming, &options)))
                },
                _ => None,
            };

            if let Some(merged) = merged {
                value = merged;
            }

            if Value::ptr_eq(current, &value) {
                return self.clone();
            }
        }

        self.with_property(key, value)
    }

    pub fn set_in(&self, path: &[Key], value: impl Into<Value>) -> Result<Self, Error> {
        self.set_in_with(path, value, SetOptions::default())
    }

    /// Sets the value at the end of `path`
    ///
    /// Missing intermediate containers are created: a sequence if the next key is an
    /// index, a record otherwise.
    pub fn set_in_with(
        &self,
        path: &[Key],
        value: impl Into<Value>,
        options: SetOptions,
    ) -> Result<Self, Error> {
        let Some((head, tail)) = path.split_first() else {
            return Err(empty_path());
        };

        let name = head.to_property_name();
        if tail.is_empty() {
            return Ok(self.set_with(name, value, options));
        }

        let current = self.get_own(&name);
        let updated = set_in_child(current, tail, value.into(), options)?;

        if current.is_some_and(|current| Value::ptr_eq(current, &updated)) {
            return Ok(self.clone());
        }

        Ok(self.with_property(name.into_owned(), updated))
    }

    #[must_use]
    pub fn update<F, V>(&self, key: &str, updater: F) -> Self
    where
        F: FnOnce(&Value) -> V,
        V: Into<Value>,
    {
        let updated = updater(self.get(key));
        self.set(key, updated)
    }

    pub fn update_in<F, V>(&self, path: &[Key], updater: F) -> Result<Self, Error>
    where
        F: FnOnce(&Value) -> V,
        V: Into<Value>,
    {
        let updated = updater(self.get_in(path));
        self.set_in(path, updated)
    }

    /// Merges a record, or a sequence of records, into this object
    ///
    /// Properties of `source` win. Returns `self` unchanged if no property changed.
    pub fn merge(&self, source: &Value, options: &MergeOptions<'_>) -> Result<Self, Error> {
        match source {
            Value::Object(other) => Ok(self.merge_object(other, options)),
            Value::Array(others) => {
                let mut merge = Merge::new(self, options);
                for other in others.iter().filter_map(Value::as_object) {
                    for (key, incoming) in other.iter() {
                        merge.add(key, incoming);
                    }
                }
                Ok(merge.finish())
            },
            other => Err(TypeError::new(format!(
                "Immutable#merge can only be invoked with objects or arrays, not {}.",
                other.to_plain()
            ))
            .into()),
        }
    }

    pub(crate) fn merge_object(&self, other: &Self, options: &MergeOptions<'_>) -> Self {
        let mut merge = Merge::new(self, options);
        for (key, incoming) in other.iter() {
            merge.add(key, incoming);
        }

        if options.mode == MergeMode::Replace {
            merge.drop_keys_missing_from(other);
        }

        merge.finish()
    }

    /// Merges `source` and drops every property that `source` does not have
    pub fn replace(&self, source: &Value, deep: bool) -> Result<Self, Error> {
        let options = MergeOptions {
            deep,
            mode: MergeMode::Replace,
            merger: None,
        };

        self.merge(source, &options)
    }

    #[must_use]
    pub fn without<K: AsRef<str>>(&self, keys: &[K]) -> Self {
        self.without_where(|_, key| keys.iter().any(|k| k.as_ref() == key))
    }

    /// Drops every property for which `predicate(value, key)` returns `true`
    #[must_use]
    pub fn without_where<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Value, &str) -> bool,
    {
        let kept: IndexMap<String, Value> = self
            .iter()
            .filter(|&(key, value)| !predicate(value, key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if kept.len() == self.len() {
            return self.clone();
        }

        Self::from_parts(kept, self.inner.prototype.clone())
    }

    /// Shallow mutable copy, nested values stay frozen
    #[must_use]
    pub fn as_mutable(&self) -> IndexMap<String, Value> {
        self.inner.properties.clone()
    }

    /// Deep mutable copy
    #[must_use]
    pub fn as_mutable_deep(&self) -> serde_json::Value {
        let map = self
            .iter()
            .filter(|(_, value)| !value.is_undefined())
            .map(|(key, value)| (key.clone(), value.to_plain()))
            .collect();

        serde_json::Value::Object(map)
    }
}

fn empty_path() -> Error {
    TypeError::new(
        "The first argument to Immutable#setIn must be an array containing at least one \"key\" string.",
    )
    .into()
}

/// Accumulates the result of a merge, copying the receiver only once something changes
struct Merge<'a, 'o> {
    base: &'a Object,
    options: &'a MergeOptions<'o>,
    result: Option<IndexMap<String, Value>>,
}

impl<'a, 'o> Merge<'a, 'o> {
    fn new(base: &'a Object, options: &'a MergeOptions<'o>) -> Self {
        Self {
            base,
            options,
            result: None,
        }
    }

    fn current(&self, key: &str) -> Option<&Value> {
        match &self.result {
            Some(result) => result.get(key),
            None => self.base.get_own(key),
        }
    }

    fn result_mut(&mut self) -> &mut IndexMap<String, Value> {
        let base = self.base;
        self.result.get_or_insert_with(|| base.as_mutable())
    }

    fn add(&mut self, key: &str, incoming: &Value) {
        let current = self.current(key).cloned();

        let merged = self
            .options
            .merger
            .and_then(|merger| merger(current.as_ref().unwrap_or(&UNDEFINED), incoming));

        let new_value = match (merged, &current, incoming) {
            (Some(merged), _, _) => merged,
            (None, Some(Value::Object(current)), Value::Object(incoming)) if self.options.deep => {
                Value::Object(current.merge_object(incoming, self.options))
            },
            (None, _, incoming) => incoming.clone(),
        };

        let changed = current
            .as_ref()
            .map_or(true, |current| !Value::ptr_eq(current, &new_value));

        if changed {
            self.result_mut().insert(key.to_owned(), new_value);
        }
    }

    fn drop_keys_missing_from(&mut self, other: &Object) {
        let dropped: Vec<String> = self
            .base
            .keys()
            .filter(|key| !other.contains_key(key))
            .map(str::to_owned)
            .collect();

        if dropped.is_empty() {
            return;
        }

        let result = self.result_mut();
        for key in dropped {
            result.shift_remove(&key);
        }
    }

    fn finish(self) -> Object {
        match self.result {
            Some(properties) => Object::from_parts(properties, self.base.inner.prototype.clone()),
            None => {
                log::trace!("merge did not change any property, reusing the receiver");
                self.base.clone()
            },
        }
    }
}

impl Object {
    /// Moves the property values and the prototype into `out` if this is the last
    /// handle to them
    pub(crate) fn detach_children(&mut self, out: &mut Vec<Value>) {
        if let Some(data) = Arc::get_mut(&mut self.inner) {
            out.extend(data.properties.drain(..).map(|(_, value)| value));
            out.extend(data.prototype.take().map(Value::Object));
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        let has_nested = Arc::get_mut(&mut self.inner).is_some_and(|data| {
            data.prototype.is_some() || data.properties.values().any(is_container)
        });

        if has_nested {
            let mut pending = Vec::new();
            self.detach_children(&mut pending);
            drop_iteratively(pending);
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
            || (self.inner.properties == other.inner.properties
                && self.inner.prototype == other.inner.prototype)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self::from_parts(iter.into_iter().collect(), None)
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
