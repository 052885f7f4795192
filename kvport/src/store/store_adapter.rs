use crate::common::{HashFields, KeyType};
use crate::errors::{ErrorKind, KvPortError, KvPortResult};
use crate::store::BackendKind;
use std::ops::Deref;
use std::sync::Arc;

/// Uniform capability set every storage backend exposes to the transfer engine.
///
/// # Purpose
/// Defines the contract a backend must follow to take part in a transfer as
/// source or destination. The engine never talks to a backend driver directly;
/// it only enumerates, inspects, reads, writes and deletes through this trait.
///
/// # Key Responsibilities
/// - **Lifecycle**: connect before use, close when the run is over
/// - **Enumeration**: list every key currently stored, materialized eagerly
/// - **Introspection**: report the [`KeyType`] of a key, `KeyType::None` when absent
/// - **Typed access**: full-value readers and merging writers per key type
/// - **Bulk delete**: remove many keys in one call
///
/// # Enumeration of document backends
/// A backend that physically splits one logical key over several records must
/// reduce them to distinct keys before returning from [`list_keys`], keeping the
/// first-seen order.
///
/// # Ranges
/// Range readers take inclusive `start`/`stop` indices; negative values count from
/// the end, so `(0, -1)` is the full range. See [`crate::common::resolve_range`].
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; an adapter is still owned by exactly one
/// transfer job at a time.
///
/// [`list_keys`]: StoreAdapterProvider::list_keys
pub trait StoreAdapterProvider: Send + Sync {
    /// Identity of the backend behind this adapter.
    fn backend_kind(&self) -> BackendKind;

    /// Backend that holds this store's session records.
    fn session_store(&self) -> BackendKind;

    /// Establishes the backend connection.
    ///
    /// Must be called before any other operation. Connecting an already
    /// connected adapter is a no-op.
    fn connect(&self) -> KvPortResult<()>;

    /// Checks whether the adapter is connected.
    fn is_connected(&self) -> bool;

    /// Releases the backend connection. Further operations fail.
    fn close(&self) -> KvPortResult<()>;

    /// Returns every key currently stored.
    fn list_keys(&self) -> KvPortResult<Vec<String>>;

    /// Reports the type of `key`, `KeyType::None` if it does not exist.
    fn type_of(&self, key: &str) -> KvPortResult<KeyType>;

    /// Reads a scalar value, `None` if the key does not exist.
    fn read_scalar(&self, key: &str) -> KvPortResult<Option<String>>;

    /// Reads every field of a hash, empty if the key does not exist.
    fn read_hash(&self, key: &str) -> KvPortResult<HashFields>;

    /// Reads every member of a set.
    fn read_set_members(&self, key: &str) -> KvPortResult<Vec<String>>;

    /// Reads list items between `start` and `stop`, inclusive.
    fn read_list_range(&self, key: &str, start: i64, stop: i64) -> KvPortResult<Vec<String>>;

    /// Reads ordered-set members between ranks `start` and `stop`, inclusive,
    /// lowest score first.
    fn read_ordered_set_range(&self, key: &str, start: i64, stop: i64)
        -> KvPortResult<Vec<String>>;

    /// Reads every ordered-set member together with its score, lowest score first.
    fn read_ordered_set_scores(&self, key: &str) -> KvPortResult<Vec<(String, f64)>>;

    /// Stores a scalar value, replacing any previous scalar.
    fn write_scalar(&self, key: &str, value: &str) -> KvPortResult<()>;

    /// Upserts the given fields into a hash.
    fn write_hash(&self, key: &str, fields: &HashFields) -> KvPortResult<()>;

    /// Adds members to a set.
    fn add_set_members(&self, key: &str, members: &[String]) -> KvPortResult<()>;

    /// Appends one item to the tail of a list.
    fn append_list_item(&self, key: &str, item: &str) -> KvPortResult<()>;

    /// Upserts members into an ordered set; `scores[i]` belongs to `members[i]`.
    fn add_ordered_set_members(
        &self,
        key: &str,
        scores: &[f64],
        members: &[String],
    ) -> KvPortResult<()>;

    /// Deletes the given keys. An empty slice is a successful no-op and absent
    /// keys are ignored.
    fn delete_keys(&self, keys: &[String]) -> KvPortResult<()>;
}

/// Cheap-to-clone handle over a [`StoreAdapterProvider`] implementation.
///
/// # Characteristics
/// - **Provider-Agnostic**: works with any adapter implementation
/// - **Ergonomic**: implements `Deref` for direct access to provider methods
/// - **Lightweight**: cloning only increments the reference count
///
/// # Usage
/// ```text
/// let adapter = StoreAdapter::new(InMemoryAdapter::new(dataset, context));
/// adapter.connect()?;
/// adapter.write_scalar("cfg:title", "Site")?;
/// ```
#[derive(Clone)]
pub struct StoreAdapter {
    inner: Arc<dyn StoreAdapterProvider>,
}

impl StoreAdapter {
    pub fn new<T: StoreAdapterProvider + 'static>(inner: T) -> Self {
        StoreAdapter {
            inner: Arc::new(inner),
        }
    }

    /// Checks whether both handles point at the same adapter instance.
    pub fn same_instance(&self, other: &StoreAdapter) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl Deref for StoreAdapter {
    type Target = Arc<dyn StoreAdapterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Validates the arguments of
/// [`add_ordered_set_members`](StoreAdapterProvider::add_ordered_set_members):
/// one score per member, none of them NaN.
pub fn check_ordered_set_input(key: &str, scores: &[f64], members: &[String]) -> KvPortResult<()> {
    if scores.len() != members.len() {
        return Err(KvPortError::new(
            &format!(
                "Ordered set '{}' got {} scores for {} members",
                key,
                scores.len(),
                members.len()
            ),
            ErrorKind::WriteError,
        ));
    }
    if scores.iter().any(|score| score.is_nan()) {
        return Err(KvPortError::new(
            &format!("Ordered set '{}' got a NaN score", key),
            ErrorKind::WriteError,
        ));
    }
    Ok(())
}
