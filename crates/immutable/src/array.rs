//! Frozen ordered sequences

use std::{
    fmt,
    ops::{Bound, RangeBounds},
    sync::Arc,
};

use indexmap::IndexMap;

use crate::{
    value::{array_index, drop_iteratively, is_container, set_in_child, UNDEFINED},
    Error, Key, MAX_INDEX, MergeMode, MergeOptions, Object, SetOptions, TypeError, Value,
};

/// A frozen ordered sequence of [Values](Value)
#[derive(Clone, Default)]
pub struct Array {
    elements: Arc<Vec<Value>>,
}

impl Array {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_elements(elements: Vec<Value>) -> Self {
        Self {
            elements: Arc::new(elements),
        }
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.elements, &b.elements)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    /// The element at `index`, or [Value::Undefined] if it is out of bounds
    #[must_use]
    pub fn get(&self, index: usize) -> &Value {
        self.elements.get(index).unwrap_or(&UNDEFINED)
    }

    #[must_use]
    pub fn get_in(&self, path: &[Key]) -> &Value {
        let Some((head, tail)) = path.split_first() else {
            return &UNDEFINED;
        };

        let Some(index) = head.as_index() else {
            return &UNDEFINED;
        };

        let value = self.get(index);
        if tail.is_empty() {
            value
        } else {
            value.get_in(tail)
        }
    }

    /// Writing past the end pads the gap with [Value::Undefined]
    fn with_element(&self, index: usize, value: Value) -> Result<Self, Error> {
        if index > MAX_INDEX {
            return Err(TypeError::new(format!(
                "`{index}` cannot be used as an index into an Immutable array"
            ))
            .into());
        }

        let mut copy = self.clone();
        let elements = Arc::make_mut(&mut copy.elements);

        if index < elements.len() {
            elements[index] = value;
        } else {
            elements.try_reserve(index + 1 - elements.len()).map_err(|_| {
                TypeError::new(format!("Immutable array cannot grow to {} elements", index + 1))
            })?;
            elements.resize(index, Value::Undefined);
            elements.push(value);
        }

        Ok(copy)
    }

    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<Self, Error> {
        self.set_with(index, value, SetOptions::default())
    }

    /// Fails for indices above [MAX_INDEX]
    pub fn set_with(
        &self,
        index: usize,
        value: impl Into<Value>,
        options: SetOptions,
    ) -> Result<Self, Error> {
        let mut value = value.into();

        if let Some(current) = self.elements.get(index) {
            let merged = match (current, &value) {
                (Value::Object(current), Value::Object(incoming))
                    if options.deep && !Object::ptr_eq(current, incoming) =>
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
                return Ok(self.clone());
            }
        }

        self.with_element(index, value)
    }

    pub fn set_in(&self, path: &[Key], value: impl Into<Value>) -> Result<Self, Error> {
        self.set_in_with(path, value, SetOptions::default())
    }

    pub fn set_in_with(
        &self,
        path: &[Key],
        value: impl Into<Value>,
        options: SetOptions,
    ) -> Result<Self, Error> {
        let Some((head, tail)) = path.split_first() else {
            return Err(TypeError::new(
                "The first argument to Immutable#setIn must be an array containing at least one \"key\" string.",
            )
            .into());
        };

        let index = array_index(head)?;
        if tail.is_empty() {
            return self.set_with(index, value, options);
        }

        let current = self.elements.get(index);
        let updated = set_in_child(current, tail, value.into(), options)?;

        if current.is_some_and(|current| Value::ptr_eq(current, &updated)) {
            return Ok(self.clone());
        }

        self.with_element(index, updated)
    }

    pub fn update<F, V>(&self, index: usize, updater: F) -> Result<Self, Error>
    where
        F: FnOnce(&Value) -> V,
        V: Into<Value>,
    {
        let updated = updater(self.get(index));
        self.set(index, updated)
    }

    pub fn update_in<F, V>(&self, path: &[Key], updater: F) -> Result<Self, Error>
    where
        F: FnOnce(&Value) -> V,
        V: Into<Value>,
    {
        let updated = updater(self.get_in(path));
        self.set_in(path, updated)
    }

    #[must_use]
    pub fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Value, usize) -> Value,
    {
        self.iter()
            .enumerate()
            .map(|(index, element)| f(element, index))
            .collect()
    }

    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Value, usize) -> bool,
    {
        let kept: Vec<Value> = self
            .iter()
            .enumerate()
            .filter(|&(index, element)| predicate(element, index))
            .map(|(_, element)| element.clone())
            .collect();

        if kept.len() == self.len() {
            return self.clone();
        }

        Self::from_elements(kept)
    }

    /// Maps every element and flattens sequences returned by `f` by one level
    #[must_use]
    pub fn flat_map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Value, usize) -> Value,
    {
        let mut result = Vec::with_capacity(self.len());

        for (index, element) in self.iter().enumerate() {
            match f(element, index) {
                Value::Array(nested) => result.extend(nested.iter().cloned()),
                other => result.push(other),
            }
        }

        Self::from_elements(result)
    }

    /// Builds a record from the `(key, value)` pairs returned by `f`
    ///
    /// Later pairs overwrite earlier ones with the same key.
    #[must_use]
    pub fn as_object<F>(&self, mut f: F) -> Object
    where
        F: FnMut(&Value, usize) -> (String, Value),
    {
        let properties: IndexMap<String, Value> = self
            .iter()
            .enumerate()
            .map(|(index, element)| f(element, index))
            .collect();

        Object::from_parts(properties, None)
    }

    /// Builds a record from a sequence of `[key, value]` pairs
    pub fn as_object_from_pairs(&self) -> Result<Object, Error> {
        let mut properties = IndexMap::with_capacity(self.len());

        for element in self.iter() {
            let Value::Array(pair) = element else {
                return Err(TypeError::new(format!(
                    "Immutable#asObject expects [key, value] pairs, found {}",
                    element.type_tag().name()
                ))
                .into());
            };

            properties.insert(pair.get(0).to_property_name(), pair.get(1).clone());
        }

        Ok(Object::from_parts(properties, None))
    }

    #[must_use]
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        }
        .min(len);

        if start == 0 && end == len {
            return self.clone();
        }

        if start >= end {
            return Self::new();
        }

        Self::from_elements(self.elements[start..end].to_vec())
    }

    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }

        self.iter().chain(other.iter()).cloned().collect()
    }

    /// Shallow mutable copy, nested values stay frozen
    #[must_use]
    pub fn as_mutable(&self) -> Vec<Value> {
        self.elements.to_vec()
    }

    /// Deep mutable copy
    #[must_use]
    pub fn as_mutable_deep(&self) -> serde_json::Value {
        serde_json::Value::Array(self.iter().map(Value::to_plain).collect())
    }
}

impl Array {
    /// Moves the elements into `out` if this is the last handle to them
    pub(crate) fn detach_children(&mut self, out: &mut Vec<Value>) {
        if let Some(elements) = Arc::get_mut(&mut self.elements) {
            out.append(elements);
        }
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        let has_nested = Arc::get_mut(&mut self.elements)
            .is_some_and(|elements| elements.iter().any(is_container));

        if has_nested {
            let mut pending = Vec::new();
            self.detach_children(&mut pending);
            drop_iteratively(pending);
        }
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.elements == other.elements
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self::from_elements(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
