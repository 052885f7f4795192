use crate::errors::KvPortResult;
use crate::store::{AdapterContext, BackendKind, StoreAdapter};

/// Constructor for the adapters of one backend.
///
/// A module carries the backend-specific settings (a database path, a shared
/// dataset, ...) and turns an [`AdapterContext`] into a fresh, not yet connected
/// [`StoreAdapter`]. Modules are registered in an
/// [`AdapterRegistry`](crate::store::AdapterRegistry) under their
/// [`backend_kind`](AdapterModule::backend_kind).
pub trait AdapterModule: Send + Sync {
    fn backend_kind(&self) -> BackendKind;

    fn create_adapter(&self, context: &AdapterContext) -> KvPortResult<StoreAdapter>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorKind, KvPortError};
    use crate::store::memory::InMemoryAdapterModule;

    struct BrokenModule;

    impl AdapterModule for BrokenModule {
        fn backend_kind(&self) -> BackendKind {
            BackendKind::Fjall
        }

        fn create_adapter(&self, _context: &AdapterContext) -> KvPortResult<StoreAdapter> {
            Err(KvPortError::new("no driver", ErrorKind::ConfigurationError))
        }
    }

    #[test]
    fn test_create_adapter_positive() {
        let module = InMemoryAdapterModule::new();
        let adapter = module
            .create_adapter(&AdapterContext::standalone(BackendKind::Memory))
            .unwrap();
        assert_eq!(adapter.backend_kind(), BackendKind::Memory);
        assert!(!adapter.is_connected());
    }

    #[test]
    fn test_create_adapter_negative() {
        let module = BrokenModule;
        let result = module.create_adapter(&AdapterContext::standalone(BackendKind::Fjall));
        assert!(result.is_err());
    }
}
