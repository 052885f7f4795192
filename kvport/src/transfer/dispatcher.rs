use crate::common::{KeyType, FULL_RANGE};
use crate::errors::{ErrorKind, KvPortError, KvPortResult};
use crate::store::StoreAdapter;
use crate::transfer::{coerce_fields, reconstruct_scores};

/// Copies one key from the source adapter to the destination adapter,
/// choosing the read/transform/write path by the key's type.
///
/// | type       | read                          | transform       | write                      |
/// |------------|-------------------------------|-----------------|----------------------------|
/// | string     | `read_scalar`                 | none            | `write_scalar`             |
/// | hash       | `read_hash`                   | field coercion  | `write_hash`               |
/// | set        | `read_set_members`            | none            | `add_set_members`          |
/// | zset       | `read_ordered_set_range(0,-1)`| score rebuild   | `add_ordered_set_members`  |
/// | list       | `read_list_range(0,-1)`       | none            | `append_list_item` per item|
///
/// A key that no longer exists when it is copied is skipped with a warning.
/// Errors are wrapped so the outer kind names the failing step: `LookupError`
/// for the type lookup, `ReadError` for the source read, `WriteError` for the
/// destination write.
pub struct TypeDispatcher<'a> {
    source: &'a StoreAdapter,
    destination: &'a StoreAdapter,
    timestamp: i64,
}

impl<'a> TypeDispatcher<'a> {
    pub fn new(
        source: &'a StoreAdapter,
        destination: &'a StoreAdapter,
        timestamp: i64,
    ) -> TypeDispatcher<'a> {
        TypeDispatcher {
            source,
            destination,
            timestamp,
        }
    }

    /// Copies `key` and returns the type it was copied as, `KeyType::None`
    /// if the key vanished from the source.
    pub fn copy_key(&self, key: &str) -> KvPortResult<KeyType> {
        let key_type = self
            .source
            .type_of(key)
            .map_err(|err| wrap(err, ErrorKind::LookupError, "look up the type of", key))?;

        let copied = match key_type {
            KeyType::Scalar => self.copy_scalar(key)?,
            KeyType::Hash => self.copy_hash(key)?,
            KeyType::Set => self.copy_set(key)?,
            KeyType::OrderedSet => self.copy_ordered_set(key)?,
            KeyType::List => self.copy_list(key)?,
            KeyType::None => false,
        };

        if copied {
            log::info!("Transferred: {}", key);
            Ok(key_type)
        } else {
            log::warn!("Key '{}' vanished from the source before it was copied", key);
            Ok(KeyType::None)
        }
    }

    fn copy_scalar(&self, key: &str) -> KvPortResult<bool> {
        let value = self
            .source
            .read_scalar(key)
            .map_err(|err| wrap(err, ErrorKind::ReadError, "read scalar", key))?;

        match value {
            Some(value) => {
                self.destination
                    .write_scalar(key, &value)
                    .map_err(|err| wrap(err, ErrorKind::WriteError, "write scalar", key))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn copy_hash(&self, key: &str) -> KvPortResult<bool> {
        let fields = self
            .source
            .read_hash(key)
            .map_err(|err| wrap(err, ErrorKind::ReadError, "read hash", key))?;
        if fields.is_empty() {
            return Ok(false);
        }

        let fields = coerce_fields(fields);
        self.destination
            .write_hash(key, &fields)
            .map_err(|err| wrap(err, ErrorKind::WriteError, "write hash", key))?;
        Ok(true)
    }

    fn copy_set(&self, key: &str) -> KvPortResult<bool> {
        let members = self
            .source
            .read_set_members(key)
            .map_err(|err| wrap(err, ErrorKind::ReadError, "read set", key))?;
        if members.is_empty() {
            return Ok(false);
        }

        self.destination
            .add_set_members(key, &members)
            .map_err(|err| wrap(err, ErrorKind::WriteError, "write set", key))?;
        Ok(true)
    }

    fn copy_ordered_set(&self, key: &str) -> KvPortResult<bool> {
        let (start, stop) = FULL_RANGE;
        let members = self
            .source
            .read_ordered_set_range(key, start, stop)
            .map_err(|err| wrap(err, ErrorKind::ReadError, "read ordered set", key))?;
        if members.is_empty() {
            return Ok(false);
        }

        let scores = reconstruct_scores(self.timestamp, members.len());
        self.destination
            .add_ordered_set_members(key, &scores, &members)
            .map_err(|err| wrap(err, ErrorKind::WriteError, "write ordered set", key))?;
        Ok(true)
    }

    fn copy_list(&self, key: &str) -> KvPortResult<bool> {
        let (start, stop) = FULL_RANGE;
        let items = self
            .source
            .read_list_range(key, start, stop)
            .map_err(|err| wrap(err, ErrorKind::ReadError, "read list", key))?;
        if items.is_empty() {
            return Ok(false);
        }

        // one append at a time, in source order
        for item in &items {
            self.destination
                .append_list_item(key, item)
                .map_err(|err| wrap(err, ErrorKind::WriteError, "append to list", key))?;
        }
        Ok(true)
    }
}

fn wrap(cause: KvPortError, kind: ErrorKind, action: &str, key: &str) -> KvPortError {
    log::error!("Failed to {} '{}': {}", action, key, cause);
    KvPortError::new_with_cause(&format!("Failed to {} '{}'", action, key), kind, cause)
}
