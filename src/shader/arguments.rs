use std::fmt;

use crate::foundation::{
    core::Vec2,
    error::{ChainError, ChainResult},
};

/// A shader parameter: always four `f32` components.
///
/// Narrower values widen with zero fill: `2.0` becomes `[2, 0, 0, 0]`, `[1, 2]` becomes
/// `[1, 2, 0, 0]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArgValue(pub [f32; 4]);

impl ArgValue {
    /// Widen a scalar.
    pub fn scalar(x: f32) -> Self {
        Self([x, 0.0, 0.0, 0.0])
    }

    /// Widen a 2-component vector.
    pub fn vec2(x: f32, y: f32) -> Self {
        Self([x, y, 0.0, 0.0])
    }

    /// Widen a 3-component vector.
    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Self([x, y, z, 0.0])
    }

    /// A full 4-component vector.
    pub fn vec4(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self([x, y, z, w])
    }

    /// Raw components.
    pub fn components(self) -> [f32; 4] {
        self.0
    }
}

impl From<f32> for ArgValue {
    fn from(x: f32) -> Self {
        Self::scalar(x)
    }
}

impl From<f64> for ArgValue {
    fn from(x: f64) -> Self {
        Self::scalar(x as f32)
    }
}

impl From<[f32; 2]> for ArgValue {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::vec2(x, y)
    }
}

impl From<[f32; 3]> for ArgValue {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::vec3(x, y, z)
    }
}

impl From<[f32; 4]> for ArgValue {
    fn from(v: [f32; 4]) -> Self {
        Self(v)
    }
}

impl From<Vec2> for ArgValue {
    fn from(v: Vec2) -> Self {
        Self::vec2(v.x as f32, v.y as f32)
    }
}

/// Ordered mapping from parameter name to [`ArgValue`].
///
/// Keys are unique. Values pushed without a key get synthesized names `args0`, `args1`, ...
#[derive(Clone, Default)]
pub struct ArgumentList {
    entries: Vec<(String, ArgValue)>,
    next_key: usize,
}

impl ArgumentList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack a flat float slice four at a time, zero filling the last entry.
    pub fn from_floats(values: &[f32]) -> Self {
        let mut list = Self::new();
        for chunk in values.chunks(4) {
            let mut v = [0.0; 4];
            v[..chunk.len()].copy_from_slice(chunk);
            list.push(ArgValue(v));
        }
        list
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn next_free_key(&mut self) -> String {
        loop {
            let key = format!("args{}", self.next_key);
            self.next_key += 1;
            if self.position(&key).is_none() {
                return key;
            }
        }
    }

    /// Append an unkeyed value.
    pub fn push(&mut self, value: impl Into<ArgValue>) -> &mut Self {
        let key = self.next_free_key();
        self.entries.push((key, value.into()));
        self
    }

    /// Add a keyed value. Adding a key twice is a configuration error.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> ChainResult<()> {
        let key = key.into();
        if self.position(&key).is_some() {
            return Err(ChainError::configuration(format!(
                "duplicate shader argument '{key}'"
            )));
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// Insert or overwrite a keyed value, keeping its original position when it exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<ArgValue> {
        self.position(key).map(|i| self.entries[i].1)
    }

    /// New list with `other` layered on top: on key collisions `other` wins.
    pub fn merge(&self, other: &ArgumentList) -> ArgumentList {
        let mut out = self.clone();
        for (k, v) in other.iter() {
            out.set(k, v);
        }
        out.next_key = out.next_key.max(other.next_key);
        out
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ArgValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for ArgumentList {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.0)))
            .finish()
    }
}

impl From<&[f32]> for ArgumentList {
    fn from(values: &[f32]) -> Self {
        Self::from_floats(values)
    }
}

impl<const N: usize> From<[f32; N]> for ArgumentList {
    fn from(values: [f32; N]) -> Self {
        Self::from_floats(&values)
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (k, v) in iter {
            list.set(k, v);
        }
        list
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/arguments.rs"]
mod tests;
