//! The shared context that pages contribute to as the build progresses.
//!
//! A page declared with a `name` feeds its rendered text into the context
//! under that name. Every page rendered afterwards sees the accumulated
//! values as template variables; pages rendered before never do.
//!
//! A name holds a single string after its first contribution and becomes a
//! list on the second:
//!
//! ```text
//! put("posts", "a")  →  posts = "a"
//! put("posts", "b")  →  posts = ["a", "b"]
//! put("posts", "c")  →  posts = ["a", "b", "c"]
//! ```

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Accumulated contributions under one name.
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Single(String),
    Many(Vec<String>),
}

impl Entry {
    fn push(&mut self, value: String) {
        match self {
            Entry::Single(first) => {
                let first = std::mem::take(first);
                *self = Entry::Many(vec![first, value]);
            }
            Entry::Many(values) => values.push(value),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Entry::Single(text) => Value::String(text.clone()),
            Entry::Many(texts) => Value::Array(texts.iter().cloned().map(Value::String).collect()),
        }
    }
}

/// Build-lifetime accumulator of named page output. Only grows.
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    entries: BTreeMap<String, Entry>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contribution under `name`.
    pub fn put(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.get_mut(name) {
            Some(entry) => entry.push(value),
            None => {
                self.entries.insert(name.to_string(), Entry::Single(value));
            }
        }
    }

    /// Independent copy of the current state, used as a page's base variables.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.to_value()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).map(Entry::to_value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
