use crate::common::{HashFields, KeyType};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::sync::Arc;

/// A value as held by the in-memory backend.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StoredValue {
    Scalar(String),
    Hash(HashFields),
    Set(IndexSet<String>),
    OrderedSet(IndexMap<String, f64>),
    List(Vec<String>),
}

impl StoredValue {
    pub(crate) fn key_type(&self) -> KeyType {
        match self {
            StoredValue::Scalar(_) => KeyType::Scalar,
            StoredValue::Hash(_) => KeyType::Hash,
            StoredValue::Set(_) => KeyType::Set,
            StoredValue::OrderedSet(_) => KeyType::OrderedSet,
            StoredValue::List(_) => KeyType::List,
        }
    }
}

/// Key space of the in-memory backend.
///
/// Keys are kept in insertion order, so enumeration is deterministic. The dataset
/// is shared: every adapter built over a clone sees the same keys, which lets a
/// caller seed a source before a transfer and inspect a destination after it.
#[derive(Clone, Default)]
pub struct InMemoryDataset {
    inner: Arc<RwLock<IndexMap<String, StoredValue>>>,
}

impl InMemoryDataset {
    pub fn new() -> Self {
        InMemoryDataset {
            inner: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Snapshot of the keys, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.inner.write().clear()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&IndexMap<String, StoredValue>) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut IndexMap<String, StoredValue>) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }
}
