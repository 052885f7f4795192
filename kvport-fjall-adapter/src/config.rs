use fjall::{CompressionType, Config, PartitionCreateOptions};
use std::sync::Arc;

/// Fjall backend configuration.
///
/// Cheap to clone: all clones share one `Arc<FjallConfigInner>`. Values are
/// fixed once the module is built.
///
/// Defaults:
/// - partition: `kvport`
/// - block cache: 64 MB
/// - write buffer: 128 MB
/// - compression: LZ4
/// - fsync: on close only
#[derive(Clone, Debug)]
pub struct FjallConfig {
    inner: Arc<FjallConfigInner>,
}

impl FjallConfig {
    pub const DEFAULT_PARTITION: &'static str = "kvport";

    pub(crate) fn new(inner: FjallConfigInner) -> FjallConfig {
        FjallConfig {
            inner: Arc::new(inner),
        }
    }

    /// Builds the keyspace settings.
    pub(crate) fn keyspace_config(&self) -> Config {
        let mut config = Config::new(&self.inner.db_path)
            .cache_size(self.inner.cache_size)
            .max_write_buffer_size(self.inner.max_write_buffer_size);

        if self.inner.fsync_ms > 0 {
            config = config.fsync_ms(Some(self.inner.fsync_ms));
        }
        config
    }

    /// Builds the settings of the single data partition.
    pub(crate) fn partition_config(&self) -> PartitionCreateOptions {
        PartitionCreateOptions::default().compression(self.inner.compression_type)
    }

    pub fn db_path(&self) -> &str {
        &self.inner.db_path
    }

    pub fn partition_name(&self) -> &str {
        &self.inner.partition_name
    }

    pub fn cache_size(&self) -> u64 {
        self.inner.cache_size
    }

    pub fn max_write_buffer_size(&self) -> u64 {
        self.inner.max_write_buffer_size
    }

    /// Background fsync interval in milliseconds, `0` when disabled.
    pub fn fsync_ms(&self) -> u16 {
        self.inner.fsync_ms
    }

    pub fn compression_type(&self) -> CompressionType {
        self.inner.compression_type
    }
}

#[derive(Debug)]
pub(crate) struct FjallConfigInner {
    pub(crate) db_path: String,
    pub(crate) partition_name: String,
    pub(crate) cache_size: u64,
    pub(crate) max_write_buffer_size: u64,
    pub(crate) fsync_ms: u16,
    pub(crate) compression_type: CompressionType,
}

impl FjallConfigInner {
    pub(crate) const DEFAULT_CACHE_MB: u64 = 64;
    pub(crate) const DEFAULT_WRITE_BUFFER_MB: u64 = 128;
}

impl Default for FjallConfigInner {
    fn default() -> Self {
        FjallConfigInner {
            db_path: String::new(),
            partition_name: FjallConfig::DEFAULT_PARTITION.to_string(),
            cache_size: Self::DEFAULT_CACHE_MB * 1_024 * 1_024,
            max_write_buffer_size: Self::DEFAULT_WRITE_BUFFER_MB * 1_024 * 1_024,
            fsync_ms: 0,
            compression_type: CompressionType::Lz4,
        }
    }
}
