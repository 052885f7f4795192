use crate::common::{resolve_range, HashFields, KeyType};
use crate::errors::{ErrorKind, KvPortError, KvPortResult};
use crate::store::memory::dataset::StoredValue;
use crate::store::memory::InMemoryDataset;
use crate::store::{check_ordered_set_input, AdapterContext, BackendKind, StoreAdapterProvider};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory key-value adapter.
///
/// # Purpose
/// `InMemoryAdapter` exposes an [`InMemoryDataset`] through the adapter contract.
/// It behaves like a Redis-style engine: typed values per key, merging writers,
/// and `WrongType` errors when a typed write hits a key of another type.
///
/// # Characteristics
/// - **Deterministic**: keys enumerate in insertion order
/// - **Shared**: adapters over clones of one dataset see the same keys
/// - **Typed**: hash fields are stored exactly as written, no stringification
/// - **No Persistence**: all data is lost with the last dataset handle
///
/// # Usage
/// ```text
/// let dataset = InMemoryDataset::new();
/// let adapter = InMemoryAdapter::new(dataset.clone(), AdapterContext::standalone(BackendKind::Memory));
/// adapter.connect()?;
/// adapter.write_scalar("cfg:title", "Site")?;
/// ```
#[derive(Clone)]
pub struct InMemoryAdapter {
    inner: Arc<InMemoryAdapterInner>,
}

impl InMemoryAdapter {
    pub fn new(dataset: InMemoryDataset, context: AdapterContext) -> InMemoryAdapter {
        InMemoryAdapter {
            inner: Arc::new(InMemoryAdapterInner::new(dataset, context)),
        }
    }
}

impl StoreAdapterProvider for InMemoryAdapter {
    fn backend_kind(&self) -> BackendKind {
        self.inner.context.backend()
    }

    fn session_store(&self) -> BackendKind {
        self.inner.context.session_store()
    }

    fn connect(&self) -> KvPortResult<()> {
        self.inner.connect()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn close(&self) -> KvPortResult<()> {
        self.inner.close()
    }

    fn list_keys(&self) -> KvPortResult<Vec<String>> {
        self.inner.check_connected()?;
        Ok(self.inner.dataset.keys())
    }

    fn type_of(&self, key: &str) -> KvPortResult<KeyType> {
        self.inner.check_connected()?;
        Ok(self.inner.dataset.read(|map| {
            map.get(key)
                .map(StoredValue::key_type)
                .unwrap_or(KeyType::None)
        }))
    }

    fn read_scalar(&self, key: &str) -> KvPortResult<Option<String>> {
        self.inner.check_connected()?;
        self.inner.dataset.read(|map| match map.get(key) {
            None => Ok(None),
            Some(StoredValue::Scalar(value)) => Ok(Some(value.clone())),
            Some(other) => Err(wrong_type(key, KeyType::Scalar, other.key_type())),
        })
    }

    fn read_hash(&self, key: &str) -> KvPortResult<HashFields> {
        self.inner.check_connected()?;
        self.inner.dataset.read(|map| match map.get(key) {
            None => Ok(HashFields::new()),
            Some(StoredValue::Hash(fields)) => Ok(fields.clone()),
            Some(other) => Err(wrong_type(key, KeyType::Hash, other.key_type())),
        })
    }

    fn read_set_members(&self, key: &str) -> KvPortResult<Vec<String>> {
        self.inner.check_connected()?;
        self.inner.dataset.read(|map| match map.get(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(other) => Err(wrong_type(key, KeyType::Set, other.key_type())),
        })
    }

    fn read_list_range(&self, key: &str, start: i64, stop: i64) -> KvPortResult<Vec<String>> {
        self.inner.check_connected()?;
        self.inner.dataset.read(|map| match map.get(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::List(items)) => Ok(resolve_range(items.len(), start, stop)
                .map(|range| items[range].to_vec())
                .unwrap_or_default()),
            Some(other) => Err(wrong_type(key, KeyType::List, other.key_type())),
        })
    }

    fn read_ordered_set_range(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> KvPortResult<Vec<String>> {
        let sorted = self.read_ordered_set_scores(key)?;
        Ok(resolve_range(sorted.len(), start, stop)
            .map(|range| {
                sorted[range]
                    .iter()
                    .map(|(member, _)| member.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn read_ordered_set_scores(&self, key: &str) -> KvPortResult<Vec<(String, f64)>> {
        self.inner.check_connected()?;
        self.inner.dataset.read(|map| match map.get(key) {
            None => Ok(Vec::new()),
            Some(StoredValue::OrderedSet(members)) => Ok(sort_by_score(members)),
            Some(other) => Err(wrong_type(key, KeyType::OrderedSet, other.key_type())),
        })
    }

    fn write_scalar(&self, key: &str, value: &str) -> KvPortResult<()> {
        self.inner.check_connected()?;
        self.inner.dataset.write(|map| {
            map.insert(key.to_string(), StoredValue::Scalar(value.to_string()));
        });
        Ok(())
    }

    fn write_hash(&self, key: &str, fields: &HashFields) -> KvPortResult<()> {
        self.inner.check_connected()?;
        self.inner.dataset.write(|map| match map.entry(key.to_string()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                StoredValue::Hash(existing) => {
                    existing.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                    Ok(())
                }
                other => Err(wrong_type(key, KeyType::Hash, other.key_type())),
            },
            Entry::Vacant(entry) => {
                if !fields.is_empty() {
                    entry.insert(StoredValue::Hash(fields.clone()));
                }
                Ok(())
            }
        })
    }

    fn add_set_members(&self, key: &str, members: &[String]) -> KvPortResult<()> {
        self.inner.check_connected()?;
        self.inner.dataset.write(|map| match map.entry(key.to_string()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                StoredValue::Set(existing) => {
                    existing.extend(members.iter().cloned());
                    Ok(())
                }
                other => Err(wrong_type(key, KeyType::Set, other.key_type())),
            },
            Entry::Vacant(entry) => {
                if !members.is_empty() {
                    entry.insert(StoredValue::Set(members.iter().cloned().collect()));
                }
                Ok(())
            }
        })
    }

    fn append_list_item(&self, key: &str, item: &str) -> KvPortResult<()> {
        self.inner.check_connected()?;
        self.inner.dataset.write(|map| match map.entry(key.to_string()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                StoredValue::List(items) => {
                    items.push(item.to_string());
                    Ok(())
                }
                other => Err(wrong_type(key, KeyType::List, other.key_type())),
            },
            Entry::Vacant(entry) => {
                entry.insert(StoredValue::List(vec![item.to_string()]));
                Ok(())
            }
        })
    }

    fn add_ordered_set_members(
        &self,
        key: &str,
        scores: &[f64],
        members: &[String],
    ) -> KvPortResult<()> {
        self.inner.check_connected()?;
        check_ordered_set_input(key, scores, members)?;

        self.inner.dataset.write(|map| match map.entry(key.to_string()) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                StoredValue::OrderedSet(existing) => {
                    for (member, score) in members.iter().zip(scores) {
                        existing.insert(member.clone(), *score);
                    }
                    Ok(())
                }
                other => Err(wrong_type(key, KeyType::OrderedSet, other.key_type())),
            },
            Entry::Vacant(entry) => {
                if !members.is_empty() {
                    let set: IndexMap<String, f64> = members
                        .iter()
                        .cloned()
                        .zip(scores.iter().copied())
                        .collect();
                    entry.insert(StoredValue::OrderedSet(set));
                }
                Ok(())
            }
        })
    }

    fn delete_keys(&self, keys: &[String]) -> KvPortResult<()> {
        self.inner.check_connected()?;
        if keys.is_empty() {
            return Ok(());
        }

        let doomed: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let removed = self.inner.dataset.write(|map| {
            let before = map.len();
            map.retain(|key, _| !doomed.contains(key.as_str()));
            before - map.len()
        });
        log::debug!("Deleted {} of {} requested keys from memory store", removed, keys.len());
        Ok(())
    }
}

struct InMemoryAdapterInner {
    dataset: InMemoryDataset,
    context: AdapterContext,
    connected: AtomicBool,
}

impl InMemoryAdapterInner {
    fn new(dataset: InMemoryDataset, context: AdapterContext) -> InMemoryAdapterInner {
        InMemoryAdapterInner {
            dataset,
            context,
            connected: AtomicBool::new(false),
        }
    }

    fn connect(&self) -> KvPortResult<()> {
        if !self.connected.swap(true, Ordering::AcqRel) {
            log::debug!(
                "Memory store connected ({} keys, sessions in '{}')",
                self.dataset.len(),
                self.context.session_store()
            );
        }
        Ok(())
    }

    #[inline]
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn close(&self) -> KvPortResult<()> {
        if self.connected.swap(false, Ordering::AcqRel) {
            log::debug!("Memory store closed");
        }
        Ok(())
    }

    #[inline]
    fn check_connected(&self) -> KvPortResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(KvPortError::new(
                "Memory store is not connected",
                ErrorKind::NotConnected,
            ))
        }
    }
}

fn wrong_type(key: &str, expected: KeyType, actual: KeyType) -> KvPortError {
    KvPortError::new(
        &format!(
            "Key '{}' holds a {} value, expected {}",
            key, actual, expected
        ),
        ErrorKind::WrongType,
    )
}

/// Orders members by score, ties broken by member.
fn sort_by_score(members: &IndexMap<String, f64>) -> Vec<(String, f64)> {
    let mut sorted: Vec<(String, f64)> = members
        .iter()
        .map(|(member, score)| (member.clone(), *score))
        .collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fields, val};

    fn connected_adapter() -> (InMemoryAdapter, InMemoryDataset) {
        let dataset = InMemoryDataset::new();
        let adapter = InMemoryAdapter::new(
            dataset.clone(),
            AdapterContext::standalone(BackendKind::Memory),
        );
        adapter.connect().unwrap();
        (adapter, dataset)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_operations_require_connection() {
        let adapter = InMemoryAdapter::new(
            InMemoryDataset::new(),
            AdapterContext::standalone(BackendKind::Memory),
        );
        let err = adapter.list_keys().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotConnected);
        assert!(adapter.write_scalar("a", "b").is_err());
    }

    #[test]
    fn test_close_disconnects() {
        let (adapter, _) = connected_adapter();
        assert!(adapter.is_connected());
        adapter.close().unwrap();
        assert!(!adapter.is_connected());
        assert_eq!(adapter.type_of("a").unwrap_err().kind(), &ErrorKind::NotConnected);
    }

    #[test]
    fn test_connect_twice_is_noop() {
        let (adapter, _) = connected_adapter();
        adapter.connect().unwrap();
        assert!(adapter.is_connected());
    }

    #[test]
    fn test_scalar_round_trip_and_type() {
        let (adapter, _) = connected_adapter();
        adapter.write_scalar("cfg:title", "Site").unwrap();
        assert_eq!(adapter.type_of("cfg:title").unwrap(), KeyType::Scalar);
        assert_eq!(adapter.read_scalar("cfg:title").unwrap(), Some("Site".to_string()));
        assert_eq!(adapter.read_scalar("missing").unwrap(), None);
    }

    #[test]
    fn test_write_scalar_replaces_any_type() {
        let (adapter, _) = connected_adapter();
        adapter.append_list_item("k", "x").unwrap();
        adapter.write_scalar("k", "v").unwrap();
        assert_eq!(adapter.type_of("k").unwrap(), KeyType::Scalar);
    }

    #[test]
    fn test_type_of_missing_key_is_none() {
        let (adapter, _) = connected_adapter();
        assert_eq!(adapter.type_of("nope").unwrap(), KeyType::None);
    }

    #[test]
    fn test_write_hash_merges_fields() {
        let (adapter, _) = connected_adapter();
        adapter.write_hash("user:1", &fields! { "age": 30, "name": "ann" }).unwrap();
        adapter.write_hash("user:1", &fields! { "age": 31, "admin": true }).unwrap();

        let hash = adapter.read_hash("user:1").unwrap();
        assert_eq!(hash.get("age"), Some(&val!(31)));
        assert_eq!(hash.get("name"), Some(&val!("ann")));
        assert_eq!(hash.get("admin"), Some(&val!(true)));
        assert_eq!(adapter.type_of("user:1").unwrap(), KeyType::Hash);
    }

    #[test]
    fn test_empty_writes_do_not_create_keys() {
        let (adapter, dataset) = connected_adapter();
        adapter.write_hash("h", &HashFields::new()).unwrap();
        adapter.add_set_members("s", &[]).unwrap();
        adapter.add_ordered_set_members("z", &[], &[]).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_set_members_union() {
        let (adapter, _) = connected_adapter();
        adapter.add_set_members("tags", &strings(&["a", "b"])).unwrap();
        adapter.add_set_members("tags", &strings(&["b", "c"])).unwrap();
        assert_eq!(adapter.read_set_members("tags").unwrap(), strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_list_append_and_ranges() {
        let (adapter, _) = connected_adapter();
        for item in ["one", "two", "three", "four"] {
            adapter.append_list_item("queue", item).unwrap();
        }
        assert_eq!(
            adapter.read_list_range("queue", 0, -1).unwrap(),
            strings(&["one", "two", "three", "four"])
        );
        assert_eq!(adapter.read_list_range("queue", 1, 2).unwrap(), strings(&["two", "three"]));
        assert_eq!(adapter.read_list_range("queue", -1, -1).unwrap(), strings(&["four"]));
        assert!(adapter.read_list_range("queue", 10, 20).unwrap().is_empty());
        assert!(adapter.read_list_range("missing", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn test_ordered_set_sorted_by_score() {
        let (adapter, _) = connected_adapter();
        adapter
            .add_ordered_set_members("rank", &[3.0, 1.0, 2.0], &strings(&["c", "a", "b"]))
            .unwrap();
        assert_eq!(adapter.read_ordered_set_range("rank", 0, -1).unwrap(), strings(&["a", "b", "c"]));
        assert_eq!(adapter.read_ordered_set_range("rank", 0, 0).unwrap(), strings(&["a"]));
        assert_eq!(
            adapter.read_ordered_set_scores("rank").unwrap(),
            vec![("a".to_string(), 1.0), ("b".to_string(), 2.0), ("c".to_string(), 3.0)]
        );
    }

    #[test]
    fn test_ordered_set_ties_break_by_member() {
        let (adapter, _) = connected_adapter();
        adapter
            .add_ordered_set_members("rank", &[1.0, 1.0], &strings(&["y", "x"]))
            .unwrap();
        assert_eq!(adapter.read_ordered_set_range("rank", 0, -1).unwrap(), strings(&["x", "y"]));
    }

    #[test]
    fn test_ordered_set_upserts_scores() {
        let (adapter, _) = connected_adapter();
        adapter
            .add_ordered_set_members("rank", &[1.0, 2.0], &strings(&["a", "b"]))
            .unwrap();
        adapter.add_ordered_set_members("rank", &[5.0], &strings(&["a"])).unwrap();
        assert_eq!(adapter.read_ordered_set_range("rank", 0, -1).unwrap(), strings(&["b", "a"]));
    }

    #[test]
    fn test_ordered_set_rejects_mismatched_scores() {
        let (adapter, _) = connected_adapter();
        let err = adapter
            .add_ordered_set_members("rank", &[1.0], &strings(&["a", "b"]))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::WriteError);
    }

    #[test]
    fn test_ordered_set_rejects_nan() {
        let (adapter, _) = connected_adapter();
        let err = adapter
            .add_ordered_set_members("rank", &[f64::NAN], &strings(&["a"]))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::WriteError);
    }

    #[test]
    fn test_typed_write_to_other_type_is_wrong_type() {
        let (adapter, _) = connected_adapter();
        adapter.write_scalar("k", "v").unwrap();

        assert_eq!(
            adapter.write_hash("k", &fields! { "a": 1 }).unwrap_err().kind(),
            &ErrorKind::WrongType
        );
        assert_eq!(
            adapter.add_set_members("k", &strings(&["a"])).unwrap_err().kind(),
            &ErrorKind::WrongType
        );
        assert_eq!(adapter.append_list_item("k", "a").unwrap_err().kind(), &ErrorKind::WrongType);
        assert_eq!(
            adapter
                .add_ordered_set_members("k", &[1.0], &strings(&["a"]))
                .unwrap_err()
                .kind(),
            &ErrorKind::WrongType
        );
    }

    #[test]
    fn test_typed_read_of_other_type_is_wrong_type() {
        let (adapter, _) = connected_adapter();
        adapter.add_set_members("s", &strings(&["a"])).unwrap();
        assert_eq!(adapter.read_hash("s").unwrap_err().kind(), &ErrorKind::WrongType);
        assert_eq!(adapter.read_scalar("s").unwrap_err().kind(), &ErrorKind::WrongType);
        assert_eq!(
            adapter.read_list_range("s", 0, -1).unwrap_err().kind(),
            &ErrorKind::WrongType
        );
    }

    #[test]
    fn test_delete_keys() {
        let (adapter, dataset) = connected_adapter();
        adapter.write_scalar("a", "1").unwrap();
        adapter.write_scalar("b", "2").unwrap();
        adapter.write_scalar("c", "3").unwrap();

        adapter
            .delete_keys(&strings(&["a", "c", "missing"]))
            .unwrap();
        assert_eq!(dataset.keys(), vec!["b"]);
    }

    #[test]
    fn test_delete_many_keys_keeps_remaining_order() {
        let (adapter, dataset) = connected_adapter();
        for i in 0..1000 {
            adapter.write_scalar(&format!("k{}", i), "v").unwrap();
        }
        let doomed: Vec<String> = (0..1000)
            .filter(|i| i % 3 != 0)
            .map(|i| format!("k{}", i))
            .collect();

        adapter.delete_keys(&doomed).unwrap();
        let expected: Vec<String> = (0..1000)
            .filter(|i| i % 3 == 0)
            .map(|i| format!("k{}", i))
            .collect();
        assert_eq!(dataset.keys(), expected);
    }

    #[test]
    fn test_delete_empty_is_noop() {
        let (adapter, dataset) = connected_adapter();
        adapter.write_scalar("a", "1").unwrap();
        adapter.delete_keys(&[]).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_list_keys_in_insertion_order() {
        let (adapter, _) = connected_adapter();
        adapter.write_scalar("z", "1").unwrap();
        adapter.append_list_item("a", "x").unwrap();
        adapter.add_set_members("m", &strings(&["x"])).unwrap();
        assert_eq!(adapter.list_keys().unwrap(), strings(&["z", "a", "m"]));
    }

    #[test]
    fn test_adapters_over_one_dataset_share_keys() {
        let (writer, dataset) = connected_adapter();
        let reader = InMemoryAdapter::new(dataset, AdapterContext::standalone(BackendKind::Memory));
        reader.connect().unwrap();
        writer.write_scalar("shared", "yes").unwrap();
        assert_eq!(reader.read_scalar("shared").unwrap(), Some("yes".to_string()));
    }
}
