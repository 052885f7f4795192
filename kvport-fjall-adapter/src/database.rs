use crate::config::FjallConfig;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use kvport::errors::{ErrorKind, KvPortError, KvPortResult};
use parking_lot::Mutex;
use std::error::Error;
use std::sync::Arc;

/// Open keyspace together with the data partition.
#[derive(Clone)]
pub(crate) struct FjallHandle {
    pub(crate) keyspace: Keyspace,
    pub(crate) partition: PartitionHandle,
}

/// Keyspace shared by every adapter of one module.
///
/// Opened lazily by the first adapter that connects and kept open for the
/// lifetime of the module, so adapters can connect and close repeatedly.
#[derive(Clone)]
pub(crate) struct FjallDatabase {
    config: FjallConfig,
    handle: Arc<Mutex<Option<FjallHandle>>>,
}

impl FjallDatabase {
    pub(crate) fn new(config: FjallConfig) -> FjallDatabase {
        FjallDatabase {
            config,
            handle: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn config(&self) -> &FjallConfig {
        &self.config
    }

    /// Returns the open handle, opening the keyspace on first use.
    pub(crate) fn open(&self) -> KvPortResult<FjallHandle> {
        let mut guard = self.handle.lock();
        if let Some(handle) = guard.as_ref() {
            return Ok(handle.clone());
        }

        if self.config.db_path().is_empty() {
            log::error!("Fjall database path is not set");
            return Err(KvPortError::new(
                "Fjall database path is not set",
                ErrorKind::ConfigurationError,
            ));
        }

        let keyspace = Keyspace::open(self.config.keyspace_config()).map_err(|err| {
            log::error!("Failed to open keyspace at '{}': {}", self.config.db_path(), err);
            to_kvport_error(err)
        })?;
        let partition = keyspace
            .open_partition(self.config.partition_name(), self.config.partition_config())
            .map_err(|err| {
                log::error!(
                    "Failed to open partition '{}': {}",
                    self.config.partition_name(),
                    err
                );
                to_kvport_error(err)
            })?;

        log::debug!(
            "Opened fjall keyspace at '{}', partition '{}'",
            self.config.db_path(),
            self.config.partition_name()
        );
        let handle = FjallHandle {
            keyspace,
            partition,
        };
        *guard = Some(handle.clone());
        Ok(handle)
    }
}

impl FjallHandle {
    /// Flushes the journal to disk.
    pub(crate) fn persist(&self) -> KvPortResult<()> {
        self.keyspace.persist(PersistMode::SyncAll).map_err(|err| {
            log::error!("Failed to persist keyspace: {}", err);
            to_kvport_error(err)
        })
    }
}

/// Converts a fjall error, classifying it by its message.
pub(crate) fn to_kvport_error(error: impl Error) -> KvPortError {
    let message = error.to_string();
    let kind = if message.contains("closed") || message.contains("deleted") {
        ErrorKind::NotConnected
    } else if message.contains("Io") || message.contains("permission") {
        ErrorKind::IOError
    } else {
        ErrorKind::BackendError
    };
    KvPortError::new(&format!("Fjall error: {}", message), kind)
}
