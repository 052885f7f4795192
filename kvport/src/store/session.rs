use crate::store::BackendKind;

/// Picks the backend that holds session records for a store.
///
/// Precedence:
/// 1. an explicitly configured session store,
/// 2. otherwise the configured cache store,
/// 3. otherwise the primary backend itself.
pub fn resolve_session_store(
    primary: BackendKind,
    session_store: Option<BackendKind>,
    cache_store: Option<BackendKind>,
) -> BackendKind {
    session_store.or(cache_store).unwrap_or(primary)
}

/// Everything an adapter constructor needs, resolved once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterContext {
    backend: BackendKind,
    session_store: BackendKind,
}

impl AdapterContext {
    pub fn new(backend: BackendKind, session_store: BackendKind) -> Self {
        AdapterContext {
            backend,
            session_store,
        }
    }

    /// Context for a backend that keeps its own sessions.
    pub fn standalone(backend: BackendKind) -> Self {
        AdapterContext::new(backend, backend)
    }

    /// Resolves the session store for `backend` from the optional overrides.
    pub fn resolve(
        backend: BackendKind,
        session_store: Option<BackendKind>,
        cache_store: Option<BackendKind>,
    ) -> Self {
        AdapterContext::new(
            backend,
            resolve_session_store(backend, session_store, cache_store),
        )
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn session_store(&self) -> BackendKind {
        self.session_store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_session_store_wins() {
        let resolved = resolve_session_store(
            BackendKind::Fjall,
            Some(BackendKind::Memory),
            Some(BackendKind::Fjall),
        );
        assert_eq!(resolved, BackendKind::Memory);
    }

    #[test]
    fn test_cache_store_used_without_session_store() {
        let resolved = resolve_session_store(BackendKind::Fjall, None, Some(BackendKind::Memory));
        assert_eq!(resolved, BackendKind::Memory);
    }

    #[test]
    fn test_falls_back_to_primary() {
        let resolved = resolve_session_store(BackendKind::Fjall, None, None);
        assert_eq!(resolved, BackendKind::Fjall);
    }

    #[test]
    fn test_context_resolve_applies_precedence() {
        let context = AdapterContext::resolve(BackendKind::Memory, None, Some(BackendKind::Fjall));
        assert_eq!(context.backend(), BackendKind::Memory);
        assert_eq!(context.session_store(), BackendKind::Fjall);
    }

    #[test]
    fn test_standalone_context() {
        let context = AdapterContext::standalone(BackendKind::Fjall);
        assert_eq!(context.backend(), BackendKind::Fjall);
        assert_eq!(context.session_store(), BackendKind::Fjall);
    }
}
