//! Conversion of plain values into frozen [Values](Value)

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
    sync::Arc,
};

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::{Array, Error, ImmutableError, Object, Value};

/// Types that can be deeply frozen into a [Value]
///
/// `remaining_depth` is the number of nested containers that may still be
/// entered. Implementations for containers fail once it reaches zero.
pub trait Freeze {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error>;

    /// Whether the value is immutable already
    ///
    /// Scalars are trivially immutable, plain containers are not.
    fn is_immutable(&self) -> bool {
        false
    }
}

fn too_deep() -> Error {
    log::warn!("Refusing to freeze a value that nests deeper than the configured limit");

    ImmutableError::new(
        "Attempt to construct Immutable from a deeply nested object was detected. \
         Have you tried to wrap an object with circular references?",
    )
    .into()
}

macro_rules! scalar {
    ($($ty:ty),*) => {
        $(
            impl Freeze for $ty {
                fn freeze(self, _remaining_depth: usize) -> Result<Value, Error> {
                    Ok(Value::from(self))
                }

                fn is_immutable(&self) -> bool {
                    true
                }
            }
        )*
    };
}

scalar!(bool, f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, &str, String, Arc<str>, ());

impl Freeze for Value {
    fn freeze(self, _remaining_depth: usize) -> Result<Value, Error> {
        Ok(self)
    }

    fn is_immutable(&self) -> bool {
        true
    }
}

impl Freeze for &Value {
    fn freeze(self, _remaining_depth: usize) -> Result<Value, Error> {
        Ok(self.clone())
    }

    fn is_immutable(&self) -> bool {
        true
    }
}

impl Freeze for Object {
    fn freeze(self, _remaining_depth: usize) -> Result<Value, Error> {
        Ok(Value::Object(self))
    }

    fn is_immutable(&self) -> bool {
        true
    }
}

impl Freeze for Array {
    fn freeze(self, _remaining_depth: usize) -> Result<Value, Error> {
        Ok(Value::Array(self))
    }

    fn is_immutable(&self) -> bool {
        true
    }
}

impl<T: Freeze> Freeze for Option<T> {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error> {
        match self {
            Some(value) => value.freeze(remaining_depth),
            None => Ok(Value::Null),
        }
    }

    fn is_immutable(&self) -> bool {
        self.as_ref().map_or(true, Freeze::is_immutable)
    }
}

impl<T: Freeze> Freeze for Vec<T> {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error> {
        let Some(remaining_depth) = remaining_depth.checked_sub(1) else {
            return Err(too_deep());
        };

        let elements = self
            .into_iter()
            .map(|element| element.freeze(remaining_depth))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Value::Array(Array::from_elements(elements)))
    }
}

impl<T: Freeze + Clone> Freeze for &[T] {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error> {
        self.to_vec().freeze(remaining_depth)
    }
}

fn freeze_entries<K, V, I>(entries: I, remaining_depth: usize) -> Result<Value, Error>
where
    K: Into<String>,
    V: Freeze,
    I: IntoIterator<Item = (K, V)>,
{
    let Some(remaining_depth) = remaining_depth.checked_sub(1) else {
        return Err(too_deep());
    };

    let properties = entries
        .into_iter()
        .map(|(key, value)| Ok((key.into(), value.freeze(remaining_depth)?)))
        .collect::<Result<IndexMap<_, _>, Error>>()?;

    Ok(Value::Object(Object::from_parts(properties, None)))
}

impl<K: Into<String>, V: Freeze, S: BuildHasher> Freeze for IndexMap<K, V, S> {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error> {
        freeze_entries(self, remaining_depth)
    }
}

impl<K: Into<String>, V: Freeze> Freeze for BTreeMap<K, V> {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error> {
        freeze_entries(self, remaining_depth)
    }
}

impl<K: Into<String>, V: Freeze, S: BuildHasher> Freeze for HashMap<K, V, S> {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error> {
        freeze_entries(self, remaining_depth)
    }
}

impl Freeze for Json {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error> {
        freeze_json(self, remaining_depth)
    }

    fn is_immutable(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object(_))
    }
}

impl Freeze for serde_json::Map<String, Json> {
    fn freeze(self, remaining_depth: usize) -> Result<Value, Error> {
        freeze_json(Json::Object(self), remaining_depth)
    }
}

/// A container whose children are still being frozen
struct Frame {
    /// The key under which the finished container is stored in its parent record
    key: Option<String>,
    node: Node,
}

enum Node {
    Array {
        elements: Vec<Value>,
        rest: std::vec::IntoIter<Json>,
    },
    Object {
        properties: IndexMap<String, Value>,
        rest: serde_json::map::IntoIter,
    },
}

impl Frame {
    fn insert(&mut self, key: Option<String>, value: Value) {
        match &mut self.node {
            Node::Array { elements, .. } => {
                elements.push(value);
            },
            Node::Object { properties, .. } => {
                properties.insert(key.unwrap_or_default(), value);
            },
        }
    }

    fn next_child(&mut self) -> Option<(Option<String>, Json)> {
        match &mut self.node {
            Node::Array { rest, .. } => rest.next().map(|child| (None, child)),
            Node::Object { rest, .. } => rest.next().map(|(key, child)| (Some(key), child)),
        }
    }

    fn finish(self) -> (Option<String>, Value) {
        let value = match self.node {
            Node::Array { elements, .. } => Value::Array(Array::from_elements(elements)),
            Node::Object { properties, .. } => Value::Object(Object::from_parts(properties, None)),
        };
        (self.key, value)
    }
}

fn freeze_scalar(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::from(s),
        Json::Array(_) | Json::Object(_) => Value::Undefined,
    }
}

/// Freezes a dynamic tree with an explicit stack instead of recursion
fn freeze_json(root: Json, max_depth: usize) -> Result<Value, Error> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut key = None;
    let mut next = root;

    loop {
        let mut completed = match next {
            Json::Array(elements) => {
                if stack.len() >= max_depth {
                    return Err(too_deep());
                }
                stack.push(Frame {
                    key,
                    node: Node::Array {
                        elements: Vec::with_capacity(elements.len()),
                        rest: elements.into_iter(),
                    },
                });
                None
            },
            Json::Object(map) => {
                if stack.len() >= max_depth {
                    return Err(too_deep());
                }
                stack.push(Frame {
                    key,
                    node: Node::Object {
                        properties: IndexMap::with_capacity(map.len()),
                        rest: map.into_iter(),
                    },
                });
                None
            },
            scalar => Some((key, freeze_scalar(scalar))),
        };

        // Hand finished values to their parents until some container has children left
        loop {
            let Some(frame) = stack.last_mut() else {
                return Ok(completed.map_or(Value::Undefined, |(_, value)| value));
            };

            if let Some((child_key, value)) = completed.take() {
                frame.insert(child_key, value);
            }

            if let Some((child_key, child)) = frame.next_child() {
                key = child_key;
                next = child;
                break;
            }

            completed = stack.pop().map(Frame::finish);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn nested_arrays(depth: usize) -> Json {
        let mut value = json!(0);
        for _ in 0..depth {
            value = Json::Array(vec![value]);
        }
        value
    }

    #[test]
    fn scalars_are_immutable() {
        assert!(5_i32.is_immutable());
        assert!("text".is_immutable());
        assert!(None::<Vec<u8>>.is_immutable());
        assert!(json!(null).is_immutable());
        assert!(!json!([]).is_immutable());
        assert!(!vec![1].is_immutable());
    }

    #[test]
    fn freezes_nested_json() {
        let value = freeze_json(json!({"a": [1, {"b": "c"}], "d": null}), 64).unwrap();

        assert_eq!(value.to_plain(), json!({"a": [1, {"b": "c"}], "d": null}));
    }

    #[test]
    fn json_key_order_is_preserved() {
        let value = freeze_json(json!({"z": 1, "a": 2, "m": 3}), 64).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().collect();

        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn depth_limit() {
        assert!(freeze_json(nested_arrays(64), 64).is_ok());

        let error = freeze_json(nested_arrays(65), 64).unwrap_err();
        assert!(error.is_immutable_error());
    }

    #[test]
    fn very_deep_input_does_not_overflow_the_stack() {
        let depth = 100_000;
        let frozen = freeze_json(nested_arrays(depth), usize::MAX).unwrap();

        let mut current = &frozen;
        let mut levels = 0;
        while let Value::Array(array) = current {
            current = array.get(0);
            levels += 1;
        }
        assert_eq!(levels, depth);

        drop(frozen);
    }

    #[test]
    fn rust_containers() {
        let mut map = BTreeMap::new();
        map.insert("list", vec![1, 2]);

        let value = map.freeze(64).unwrap();
        assert_eq!(value.to_plain(), json!({"list": [1, 2]}));

        assert!(vec![vec![1]].freeze(1).unwrap_err().is_immutable_error());
    }
}
