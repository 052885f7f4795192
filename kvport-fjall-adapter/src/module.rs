use crate::adapter::FjallAdapter;
use crate::config::{FjallConfig, FjallConfigInner};
use crate::database::FjallDatabase;
use fjall::CompressionType;
use kvport::errors::KvPortResult;
use kvport::store::{AdapterContext, AdapterModule, BackendKind, StoreAdapter};

/// Adapter module for the fjall document store.
///
/// All adapters created by one module share a single keyspace, opened by the
/// first adapter that connects.
///
/// # Examples
///
/// ```rust,ignore
/// use kvport::store::AdapterRegistry;
/// use kvport_fjall_adapter::FjallAdapterModule;
///
/// let mut registry = AdapterRegistry::new();
/// registry.register(
///     FjallAdapterModule::with_config()
///         .db_path("/path/to/db")
///         .build(),
/// );
/// ```
pub struct FjallAdapterModule {
    database: FjallDatabase,
}

impl FjallAdapterModule {
    /// Creates a new builder for configuring a fjall module.
    #[inline]
    pub fn with_config() -> FjallAdapterModuleBuilder {
        FjallAdapterModuleBuilder::new()
    }

    pub fn config(&self) -> &FjallConfig {
        self.database.config()
    }
}

impl AdapterModule for FjallAdapterModule {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Fjall
    }

    fn create_adapter(&self, context: &AdapterContext) -> KvPortResult<StoreAdapter> {
        let adapter = FjallAdapter::new(self.database.clone(), *context);
        Ok(StoreAdapter::new(adapter))
    }
}

/// Builder for [`FjallAdapterModule`].
pub struct FjallAdapterModuleBuilder {
    config: FjallConfigInner,
}

impl Default for FjallAdapterModuleBuilder {
    fn default() -> Self {
        FjallAdapterModuleBuilder::new()
    }
}

impl FjallAdapterModuleBuilder {
    #[inline]
    pub fn new() -> FjallAdapterModuleBuilder {
        FjallAdapterModuleBuilder {
            config: FjallConfigInner::default(),
        }
    }

    /// Directory of the keyspace. Required.
    #[inline]
    pub fn db_path(mut self, db_path: &str) -> Self {
        self.config.db_path = db_path.to_string();
        self
    }

    /// Partition holding all rows, `kvport` by default.
    #[inline]
    pub fn partition_name(mut self, partition_name: &str) -> Self {
        self.config.partition_name = partition_name.to_string();
        self
    }

    #[inline]
    pub fn cache_size(mut self, bytes: u64) -> Self {
        self.config.cache_size = bytes;
        self
    }

    #[inline]
    pub fn max_write_buffer_size(mut self, bytes: u64) -> Self {
        self.config.max_write_buffer_size = bytes;
        self
    }

    /// Background fsync interval; `0` syncs only on close.
    #[inline]
    pub fn fsync_ms(mut self, millis: u16) -> Self {
        self.config.fsync_ms = millis;
        self
    }

    #[inline]
    pub fn compression_type(mut self, compression_type: CompressionType) -> Self {
        self.config.compression_type = compression_type;
        self
    }

    pub fn build(self) -> FjallAdapterModule {
        FjallAdapterModule {
            database: FjallDatabase::new(FjallConfig::new(self.config)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvport::errors::ErrorKind;
    use kvport::store::AdapterRegistry;
    use std::fs;

    fn random_path() -> String {
        std::env::temp_dir()
            .join(format!("kvport-module-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_builder() {
        let module = FjallAdapterModule::with_config()
            .db_path("/tmp/kv")
            .partition_name("data")
            .cache_size(1024)
            .max_write_buffer_size(2048)
            .fsync_ms(100)
            .compression_type(CompressionType::None)
            .build();

        let config = module.config();
        assert_eq!(config.db_path(), "/tmp/kv");
        assert_eq!(config.partition_name(), "data");
        assert_eq!(config.cache_size(), 1024);
        assert_eq!(config.max_write_buffer_size(), 2048);
        assert_eq!(config.fsync_ms(), 100);
        assert_eq!(config.compression_type(), CompressionType::None);
        assert_eq!(module.backend_kind(), BackendKind::Fjall);
    }

    #[test]
    fn test_adapters_share_keyspace() {
        let path = random_path();
        let module = FjallAdapterModule::with_config().db_path(&path).build();
        let context = AdapterContext::standalone(BackendKind::Fjall);

        let writer = module.create_adapter(&context).unwrap();
        let reader = module.create_adapter(&context).unwrap();
        assert!(!writer.same_instance(&reader));
        writer.connect().unwrap();
        reader.connect().unwrap();

        writer.write_scalar("k", "v").unwrap();
        assert_eq!(reader.read_scalar("k").unwrap(), Some("v".to_string()));

        writer.close().unwrap();
        reader.close().unwrap();
        drop(module);
        let _ = fs::remove_dir_all(&path);
    }

    #[test]
    fn test_registry_connect_without_path_fails() {
        let mut registry = AdapterRegistry::new();
        registry.register(FjallAdapterModule::with_config().build());

        let err = registry
            .connect(&AdapterContext::standalone(BackendKind::Fjall))
            .err()
            .unwrap();
        assert_eq!(err.kind(), &ErrorKind::ConnectionError);
        assert_eq!(err.cause().unwrap().kind(), &ErrorKind::ConfigurationError);
    }
}
