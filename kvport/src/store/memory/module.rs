use crate::errors::KvPortResult;
use crate::store::memory::{InMemoryAdapter, InMemoryDataset};
use crate::store::{AdapterContext, AdapterModule, BackendKind, StoreAdapter};

/// Adapter module for the in-memory backend.
///
/// Every adapter it creates works on the module's dataset, so all of them see
/// the same keys.
#[derive(Default)]
pub struct InMemoryAdapterModule {
    dataset: InMemoryDataset,
}

impl InMemoryAdapterModule {
    /// Creates a module over a fresh, empty dataset.
    pub fn new() -> InMemoryAdapterModule {
        InMemoryAdapterModule {
            dataset: InMemoryDataset::new(),
        }
    }

    /// Creates a module over an existing dataset.
    pub fn with_dataset(dataset: InMemoryDataset) -> InMemoryAdapterModule {
        InMemoryAdapterModule { dataset }
    }

    pub fn dataset(&self) -> InMemoryDataset {
        self.dataset.clone()
    }
}

impl AdapterModule for InMemoryAdapterModule {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn create_adapter(&self, context: &AdapterContext) -> KvPortResult<StoreAdapter> {
        let adapter = InMemoryAdapter::new(self.dataset.clone(), *context);
        Ok(StoreAdapter::new(adapter))
    }
}
