use crate::errors::{ErrorKind, KvPortError, KvPortResult};
use crate::store::{AdapterContext, AdapterModule, BackendKind, StoreAdapter};
use std::collections::HashMap;

/// Maps each [`BackendKind`] to the module that builds its adapters.
///
/// The set of backends is fixed at compile time; the registry only decides
/// which of them this process can actually reach, and with which settings.
///
/// # Usage
/// ```text
/// let mut registry = AdapterRegistry::new();
/// registry.register(InMemoryAdapterModule::new());
/// registry.register(FjallAdapterModule::with_config().db_path("/data/kv").build());
/// let adapter = registry.connect(&AdapterContext::standalone(BackendKind::Fjall))?;
/// ```
#[derive(Default)]
pub struct AdapterRegistry {
    modules: HashMap<BackendKind, Box<dyn AdapterModule>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        AdapterRegistry {
            modules: HashMap::new(),
        }
    }

    /// Registers a module under its backend kind, replacing any previous one.
    pub fn register<M: AdapterModule + 'static>(&mut self, module: M) -> &mut Self {
        let kind = module.backend_kind();
        if self.modules.insert(kind, Box::new(module)).is_some() {
            log::warn!("Replacing previously registered module for backend '{}'", kind);
        }
        self
    }

    pub fn contains(&self, kind: BackendKind) -> bool {
        self.modules.contains_key(&kind)
    }

    /// Backends with a registered module, in a stable order.
    pub fn backends(&self) -> Vec<BackendKind> {
        let mut kinds: Vec<BackendKind> = self.modules.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Builds an unconnected adapter for the context's backend.
    pub fn create(&self, context: &AdapterContext) -> KvPortResult<StoreAdapter> {
        let kind = context.backend();
        match self.modules.get(&kind) {
            Some(module) => module.create_adapter(context),
            None => {
                log::error!("No module registered for backend '{}'", kind);
                Err(KvPortError::new(
                    &format!("No module registered for backend '{}'", kind),
                    ErrorKind::ConfigurationError,
                ))
            }
        }
    }

    /// Builds an adapter for the context's backend and connects it.
    ///
    /// Construction errors keep their kind; a failing connect is reported as
    /// `ConnectionError`.
    pub fn connect(&self, context: &AdapterContext) -> KvPortResult<StoreAdapter> {
        let adapter = self.create(context)?;
        adapter.connect().map_err(|err| {
            log::error!("Failed to connect to backend '{}': {}", context.backend(), err);
            KvPortError::new_with_cause(
                &format!("Failed to connect to backend '{}'", context.backend()),
                ErrorKind::ConnectionError,
                err,
            )
        })?;
        log::debug!(
            "Connected to backend '{}' (sessions in '{}')",
            context.backend(),
            context.session_store()
        );
        Ok(adapter)
    }
}
