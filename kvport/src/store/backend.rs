use crate::errors::{ErrorKind, KvPortError, KvPortResult};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identity of a storage backend.
///
/// Backends are a closed set known at compile time. Configuration names a backend
/// by its string form; anything that does not parse is rejected before a transfer
/// starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    /// In-process key-value store, see [`crate::store::memory`].
    Memory,
    /// Persistent document store on the fjall LSM engine.
    Fjall,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Memory, BackendKind::Fjall];

    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Fjall => "fjall",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BackendKind {
    type Err = KvPortError;

    fn from_str(s: &str) -> KvPortResult<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| {
                log::error!("Unknown backend '{}'", s);
                KvPortError::new(
                    &format!(
                        "Unknown backend '{}', expected one of: {}",
                        s,
                        BackendKind::ALL.map(|k| k.name()).join(", ")
                    ),
                    ErrorKind::ConfigurationError,
                )
            })
    }
}
