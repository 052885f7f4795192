use crate::database::{to_kvport_error, FjallDatabase, FjallHandle};
use crate::record::{
    key_prefix, list_row_key, list_sequence, logical_key, row_key, Record, MAX_ROW_KEY_LEN,
};
use fjall::PartitionHandle;
use kvport::common::{resolve_range, HashFields, KeyType};
use kvport::errors::{ErrorKind, KvPortError, KvPortResult};
use kvport::store::{check_ordered_set_input, AdapterContext, BackendKind, StoreAdapterProvider};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

type Row = (Vec<u8>, Record);

/// Fjall document-store adapter.
///
/// # Storage layout
/// Every logical key is spread over one or more rows of a single partition.
/// A row key is `<logical key> 0x00 <suffix>` and a row value is a
/// bincode-encoded record tagged with the key's type:
///
/// | type   | rows                      | suffix                   |
/// |--------|---------------------------|--------------------------|
/// | string | one                       | empty                    |
/// | hash   | one per field             | field name               |
/// | set    | one per member            | member                   |
/// | zset   | one per member            | member                   |
/// | list   | one per item              | big-endian sequence      |
///
/// Enumeration walks all rows and reduces them to distinct logical keys.
/// Keys containing a NUL byte cannot be stored.
///
/// # Characteristics
/// - **Persistent**: data survives the process; the journal is synced on close
/// - **Atomic writes**: each write call is one fjall batch
/// - **Typed hash fields**: field values keep the type they were written with
#[derive(Clone)]
pub struct FjallAdapter {
    inner: Arc<FjallAdapterInner>,
}

impl FjallAdapter {
    pub(crate) fn new(database: FjallDatabase, context: AdapterContext) -> FjallAdapter {
        FjallAdapter {
            inner: Arc::new(FjallAdapterInner {
                database,
                context,
                handle: RwLock::new(None),
                write_lock: Mutex::new(()),
            }),
        }
    }
}

impl StoreAdapterProvider for FjallAdapter {
    fn backend_kind(&self) -> BackendKind {
        self.inner.context.backend()
    }

    fn session_store(&self) -> BackendKind {
        self.inner.context.session_store()
    }

    fn connect(&self) -> KvPortResult<()> {
        let mut guard = self.inner.handle.write();
        if guard.is_none() {
            *guard = Some(self.inner.database.open()?);
            log::debug!(
                "Fjall store connected at '{}' (sessions in '{}')",
                self.inner.database.config().db_path(),
                self.inner.context.session_store()
            );
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.handle.read().is_some()
    }

    fn close(&self) -> KvPortResult<()> {
        let handle = self.inner.handle.write().take();
        match handle {
            Some(handle) => {
                handle.persist()?;
                log::debug!("Fjall store closed");
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn list_keys(&self) -> KvPortResult<Vec<String>> {
        let handle = self.inner.handle()?;
        let mut keys: Vec<String> = Vec::new();
        for row in handle.partition.iter() {
            let (row_key, _) = row.map_err(to_kvport_error)?;
            match logical_key(&row_key) {
                // rows of one key are contiguous
                Some(key) if keys.last().map(String::as_str) != Some(key) => {
                    keys.push(key.to_string())
                }
                Some(_) => {}
                None => log::warn!("Skipping malformed row {:?}", row_key),
            }
        }
        Ok(keys)
    }

    fn type_of(&self, key: &str) -> KvPortResult<KeyType> {
        let handle = self.inner.handle()?;
        Ok(first_record(&handle.partition, key)?
            .map(|record| record.key_type())
            .unwrap_or(KeyType::None))
    }

    fn read_scalar(&self, key: &str) -> KvPortResult<Option<String>> {
        let handle = self.inner.handle()?;
        match first_record(&handle.partition, key)? {
            None => Ok(None),
            Some(Record::Scalar(value)) => Ok(Some(value)),
            Some(other) => Err(wrong_type(key, KeyType::Scalar, other.key_type())),
        }
    }

    fn read_hash(&self, key: &str) -> KvPortResult<HashFields> {
        let handle = self.inner.handle()?;
        let mut fields = HashFields::new();
        for (_, record) in typed_rows(&handle.partition, key, KeyType::Hash)? {
            if let Record::HashField { field, value } = record {
                fields.insert(field, value);
            }
        }
        Ok(fields)
    }

    fn read_set_members(&self, key: &str) -> KvPortResult<Vec<String>> {
        let handle = self.inner.handle()?;
        Ok(typed_rows(&handle.partition, key, KeyType::Set)?
            .into_iter()
            .filter_map(|(_, record)| match record {
                Record::SetMember(member) => Some(member),
                _ => None,
            })
            .collect())
    }

    fn read_list_range(&self, key: &str, start: i64, stop: i64) -> KvPortResult<Vec<String>> {
        let handle = self.inner.handle()?;
        let items: Vec<String> = typed_rows(&handle.partition, key, KeyType::List)?
            .into_iter()
            .filter_map(|(_, record)| match record {
                Record::ListItem(item) => Some(item),
                _ => None,
            })
            .collect();
        Ok(resolve_range(items.len(), start, stop)
            .map(|range| items[range].to_vec())
            .unwrap_or_default())
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
        let handle = self.inner.handle()?;
        let mut members: Vec<(String, f64)> =
            typed_rows(&handle.partition, key, KeyType::OrderedSet)?
                .into_iter()
                .filter_map(|(_, record)| match record {
                    Record::OrderedSetMember { member, score } => Some((member, score)),
                    _ => None,
                })
                .collect();
        members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(members)
    }

    fn write_scalar(&self, key: &str, value: &str) -> KvPortResult<()> {
        check_key(key)?;
        let handle = self.inner.handle()?;
        let _guard = self.inner.write_lock.lock();

        let scalar_row = bounded(key, row_key(key, &[]))?;
        let mut batch = handle.keyspace.batch();
        // drop whatever the key held before, except the row about to be overwritten
        for (row, _) in rows(&handle.partition, key)? {
            if row != scalar_row {
                batch.remove(&handle.partition, row);
            }
        }
        batch.insert(
            &handle.partition,
            scalar_row,
            Record::Scalar(value.to_string()).encode()?,
        );
        commit(batch)
    }

    fn write_hash(&self, key: &str, fields: &HashFields) -> KvPortResult<()> {
        check_key(key)?;
        let handle = self.inner.handle()?;
        let _guard = self.inner.write_lock.lock();
        check_type(&handle.partition, key, KeyType::Hash)?;
        if fields.is_empty() {
            return Ok(());
        }

        let mut batch = handle.keyspace.batch();
        for (field, value) in fields {
            let record = Record::HashField {
                field: field.clone(),
                value: value.clone(),
            };
            batch.insert(
                &handle.partition,
                bounded(key, row_key(key, field.as_bytes()))?,
                record.encode()?,
            );
        }
        commit(batch)
    }

    fn add_set_members(&self, key: &str, members: &[String]) -> KvPortResult<()> {
        check_key(key)?;
        let handle = self.inner.handle()?;
        let _guard = self.inner.write_lock.lock();
        check_type(&handle.partition, key, KeyType::Set)?;
        if members.is_empty() {
            return Ok(());
        }

        let unique: BTreeSet<&String> = members.iter().collect();
        let mut batch = handle.keyspace.batch();
        for member in unique {
            batch.insert(
                &handle.partition,
                bounded(key, row_key(key, member.as_bytes()))?,
                Record::SetMember(member.clone()).encode()?,
            );
        }
        commit(batch)
    }

    fn append_list_item(&self, key: &str, item: &str) -> KvPortResult<()> {
        check_key(key)?;
        let handle = self.inner.handle()?;
        let _guard = self.inner.write_lock.lock();
        check_type(&handle.partition, key, KeyType::List)?;

        let next = match handle.partition.prefix(key_prefix(key)).next_back() {
            Some(row) => {
                let (row_key, _) = row.map_err(to_kvport_error)?;
                list_sequence(&row_key).map(|seq| seq + 1).ok_or_else(|| {
                    KvPortError::new(
                        &format!("List '{}' has a malformed row", key),
                        ErrorKind::EncodingError,
                    )
                })?
            }
            None => 0,
        };

        handle
            .partition
            .insert(
                bounded(key, list_row_key(key, next))?,
                Record::ListItem(item.to_string()).encode()?,
            )
            .map_err(to_kvport_error)
    }

    fn add_ordered_set_members(
        &self,
        key: &str,
        scores: &[f64],
        members: &[String],
    ) -> KvPortResult<()> {
        check_key(key)?;
        check_ordered_set_input(key, scores, members)?;
        let handle = self.inner.handle()?;
        let _guard = self.inner.write_lock.lock();
        check_type(&handle.partition, key, KeyType::OrderedSet)?;
        if members.is_empty() {
            return Ok(());
        }

        // last score wins for repeated members
        let unique: BTreeMap<&String, f64> = members.iter().zip(scores.iter().copied()).collect();
        let mut batch = handle.keyspace.batch();
        for (member, score) in unique {
            let record = Record::OrderedSetMember {
                member: member.clone(),
                score,
            };
            batch.insert(
                &handle.partition,
                bounded(key, row_key(key, member.as_bytes()))?,
                record.encode()?,
            );
        }
        commit(batch)
    }

    fn delete_keys(&self, keys: &[String]) -> KvPortResult<()> {
        let handle = self.inner.handle()?;
        if keys.is_empty() {
            return Ok(());
        }
        let _guard = self.inner.write_lock.lock();

        let mut batch = handle.keyspace.batch();
        let mut removed = 0usize;
        for key in keys {
            for row in handle.partition.prefix(key_prefix(key)) {
                let (row_key, _) = row.map_err(to_kvport_error)?;
                batch.remove(&handle.partition, row_key);
                removed += 1;
            }
        }
        commit(batch)?;
        log::debug!("Deleted {} rows for {} keys from fjall store", removed, keys.len());
        Ok(())
    }
}

struct FjallAdapterInner {
    database: FjallDatabase,
    context: AdapterContext,
    handle: RwLock<Option<FjallHandle>>,
    write_lock: Mutex<()>,
}

impl FjallAdapterInner {
    fn handle(&self) -> KvPortResult<FjallHandle> {
        self.handle.read().clone().ok_or_else(|| {
            KvPortError::new("Fjall store is not connected", ErrorKind::NotConnected)
        })
    }
}

fn check_key(key: &str) -> KvPortResult<()> {
    if key.as_bytes().contains(&0) {
        log::error!("Rejected key containing NUL: {:?}", key);
        return Err(KvPortError::new(
            &format!("Key {:?} contains a NUL byte", key),
            ErrorKind::WriteError,
        ));
    }
    Ok(())
}

/// Rejects a row key fjall cannot store.
fn bounded(key: &str, row: Vec<u8>) -> KvPortResult<Vec<u8>> {
    if row.len() > MAX_ROW_KEY_LEN {
        log::error!(
            "Row key of {} bytes for '{:.64}' exceeds {} bytes",
            row.len(),
            key,
            MAX_ROW_KEY_LEN
        );
        return Err(KvPortError::new(
            &format!(
                "Row key of {} bytes for '{:.64}' exceeds the fjall limit of {} bytes",
                row.len(),
                key,
                MAX_ROW_KEY_LEN
            ),
            ErrorKind::WriteError,
        ));
    }
    Ok(row)
}

fn rows(partition: &PartitionHandle, key: &str) -> KvPortResult<Vec<Row>> {
    partition
        .prefix(key_prefix(key))
        .map(|row| -> KvPortResult<Row> {
            let (row_key, value) = row.map_err(to_kvport_error)?;
            Ok((row_key.to_vec(), Record::decode(&value)?))
        })
        .collect()
}

fn first_record(partition: &PartitionHandle, key: &str) -> KvPortResult<Option<Record>> {
    match partition.prefix(key_prefix(key)).next() {
        Some(row) => {
            let (_, value) = row.map_err(to_kvport_error)?;
            Ok(Some(Record::decode(&value)?))
        }
        None => Ok(None),
    }
}

/// Rows of `key`, failing if the key holds another type.
fn typed_rows(partition: &PartitionHandle, key: &str, expected: KeyType) -> KvPortResult<Vec<Row>> {
    let rows = rows(partition, key)?;
    if let Some((_, record)) = rows.first() {
        if record.key_type() != expected {
            return Err(wrong_type(key, expected, record.key_type()));
        }
    }
    Ok(rows)
}

fn check_type(partition: &PartitionHandle, key: &str, expected: KeyType) -> KvPortResult<()> {
    match first_record(partition, key)? {
        Some(record) if record.key_type() != expected => {
            Err(wrong_type(key, expected, record.key_type()))
        }
        _ => Ok(()),
    }
}

fn commit(batch: fjall::Batch) -> KvPortResult<()> {
    batch.commit().map_err(|err| {
        log::error!("Failed to commit batch: {}", err);
        to_kvport_error(err)
    })
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
