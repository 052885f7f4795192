use crate::errors::{ErrorKind, KvPortError, KvPortResult};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Logical type of a stored key.
///
/// Every key in a store holds exactly one of these. `None` is what a store
/// reports for a key that does not exist.
///
/// The textual names follow the Redis `TYPE` command (`string`, `hash`, `set`,
/// `zset`, `list`, `none`) so adapters over Redis-like engines can parse replies
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Scalar,
    Hash,
    Set,
    OrderedSet,
    List,
    None,
}

impl KeyType {
    pub const ALL: [KeyType; 6] = [
        KeyType::Scalar,
        KeyType::Hash,
        KeyType::Set,
        KeyType::OrderedSet,
        KeyType::List,
        KeyType::None,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KeyType::Scalar => "string",
            KeyType::Hash => "hash",
            KeyType::Set => "set",
            KeyType::OrderedSet => "zset",
            KeyType::List => "list",
            KeyType::None => "none",
        }
    }

    #[inline]
    pub fn exists(&self) -> bool {
        *self != KeyType::None
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for KeyType {
    type Err = KvPortError;

    fn from_str(s: &str) -> KvPortResult<Self> {
        match s {
            "string" => Ok(KeyType::Scalar),
            "hash" => Ok(KeyType::Hash),
            "set" => Ok(KeyType::Set),
            "zset" => Ok(KeyType::OrderedSet),
            "list" => Ok(KeyType::List),
            "none" => Ok(KeyType::None),
            other => Err(KvPortError::new(
                &format!("Unknown key type '{}'", other),
                ErrorKind::LookupError,
            )),
        }
    }
}
