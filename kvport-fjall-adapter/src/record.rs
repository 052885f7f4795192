use kvport::common::{KeyType, Value};
use kvport::errors::{ErrorKind, KvPortError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separates the logical key from the row suffix.
pub(crate) const KEY_SEPARATOR: u8 = 0x00;

/// Longest row key fjall accepts.
pub(crate) const MAX_ROW_KEY_LEN: usize = u16::MAX as usize;

/// Error type for row encoding and decoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Record encoding failed: {0}")]
    Encode(String),
    #[error("Record decoding failed: {0}")]
    Decode(String),
}

impl From<RecordError> for KvPortError {
    fn from(err: RecordError) -> Self {
        KvPortError::new(&err.to_string(), ErrorKind::EncodingError)
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// One stored row. A logical key owns one or more rows, all of the same variant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub(crate) enum Record {
    Scalar(String),
    HashField { field: String, value: Value },
    SetMember(String),
    OrderedSetMember { member: String, score: f64 },
    ListItem(String),
}

impl Record {
    pub(crate) fn key_type(&self) -> KeyType {
        match self {
            Record::Scalar(_) => KeyType::Scalar,
            Record::HashField { .. } => KeyType::Hash,
            Record::SetMember(_) => KeyType::Set,
            Record::OrderedSetMember { .. } => KeyType::OrderedSet,
            Record::ListItem(_) => KeyType::List,
        }
    }

    pub(crate) fn encode(&self) -> RecordResult<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::legacy())
            .map_err(|e| RecordError::Encode(e.to_string()))
    }

    pub(crate) fn decode(bytes: &[u8]) -> RecordResult<Record> {
        bincode::serde::decode_from_slice(bytes, bincode::config::legacy())
            .map(|(record, _)| record)
            .map_err(|e| RecordError::Decode(e.to_string()))
    }
}

/// `<key> 0x00`: the prefix shared by every row of `key`.
pub(crate) fn key_prefix(key: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(key.len() + 1);
    prefix.extend_from_slice(key.as_bytes());
    prefix.push(KEY_SEPARATOR);
    prefix
}

/// `<key> 0x00 <suffix>`
pub(crate) fn row_key(key: &str, suffix: &[u8]) -> Vec<u8> {
    let mut row = key_prefix(key);
    row.extend_from_slice(suffix);
    row
}

/// Row key of the list item at `sequence`; big-endian keeps rows in append order.
pub(crate) fn list_row_key(key: &str, sequence: u64) -> Vec<u8> {
    row_key(key, &sequence.to_be_bytes())
}

/// Reads the sequence back from a list row key.
pub(crate) fn list_sequence(row: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = row.get(row.len().checked_sub(8)?..)?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

/// Logical key of a row, `None` if the row is malformed.
pub(crate) fn logical_key(row: &[u8]) -> Option<&str> {
    let end = row.iter().position(|b| *b == KEY_SEPARATOR)?;
    std::str::from_utf8(&row[..end]).ok()
}
