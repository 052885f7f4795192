use crate::errors::{ErrorKind, KvPortError, KvPortResult};
use crate::store::{AdapterContext, BackendKind};
use crate::transfer::{KeyFilter, DEFAULT_EXCLUSION_PATTERNS};
use std::str::FromStr;

/// Settings of one transfer run.
///
/// Built through [`TransferConfig::builder`]. A valid configuration always has
/// two different backends and a compiled key filter.
#[derive(Clone, Debug)]
pub struct TransferConfig {
    source: BackendKind,
    destination: BackendKind,
    session_store: Option<BackendKind>,
    cache_store: Option<BackendKind>,
    key_filter: KeyFilter,
}

impl TransferConfig {
    pub fn builder() -> TransferConfigBuilder {
        TransferConfigBuilder::new()
    }

    pub fn source(&self) -> BackendKind {
        self.source
    }

    pub fn destination(&self) -> BackendKind {
        self.destination
    }

    pub fn session_store(&self) -> Option<BackendKind> {
        self.session_store
    }

    pub fn cache_store(&self) -> Option<BackendKind> {
        self.cache_store
    }

    pub fn key_filter(&self) -> &KeyFilter {
        &self.key_filter
    }

    /// Construction context for the source adapter.
    pub fn source_context(&self) -> AdapterContext {
        AdapterContext::resolve(self.source, self.session_store, self.cache_store)
    }

    /// Construction context for the destination adapter.
    pub fn destination_context(&self) -> AdapterContext {
        AdapterContext::resolve(self.destination, self.session_store, self.cache_store)
    }
}

/// Fluent builder for [`TransferConfig`].
///
/// # Usage
/// ```text
/// let config = TransferConfig::builder()
///     .source_name("memory")
///     .destination(BackendKind::Fjall)
///     .cache_store(BackendKind::Memory)
///     .build()?;
/// ```
///
/// Backend names that fail to parse are reported by [`build`](Self::build).
pub struct TransferConfigBuilder {
    source: Option<BackendKind>,
    destination: Option<BackendKind>,
    session_store: Option<BackendKind>,
    cache_store: Option<BackendKind>,
    exclusion_patterns: Vec<String>,
    error: Option<KvPortError>,
}

impl Default for TransferConfigBuilder {
    fn default() -> Self {
        TransferConfigBuilder::new()
    }
}

impl TransferConfigBuilder {
    /// Starts from the reference exclusion patterns and no backends.
    pub fn new() -> Self {
        TransferConfigBuilder {
            source: None,
            destination: None,
            session_store: None,
            cache_store: None,
            exclusion_patterns: DEFAULT_EXCLUSION_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            error: None,
        }
    }

    pub fn source(mut self, kind: BackendKind) -> Self {
        self.source = Some(kind);
        self
    }

    pub fn destination(mut self, kind: BackendKind) -> Self {
        self.destination = Some(kind);
        self
    }

    /// Backend for session records, overriding the cache store.
    pub fn session_store(mut self, kind: BackendKind) -> Self {
        self.session_store = Some(kind);
        self
    }

    /// Backend used for sessions when no session store is given.
    pub fn cache_store(mut self, kind: BackendKind) -> Self {
        self.cache_store = Some(kind);
        self
    }

    pub fn source_name(mut self, name: &str) -> Self {
        self.source = self.parse_name(name);
        self
    }

    pub fn destination_name(mut self, name: &str) -> Self {
        self.destination = self.parse_name(name);
        self
    }

    pub fn session_store_name(mut self, name: &str) -> Self {
        self.session_store = self.parse_name(name);
        self
    }

    pub fn cache_store_name(mut self, name: &str) -> Self {
        self.cache_store = self.parse_name(name);
        self
    }

    /// Replaces the exclusion patterns.
    pub fn exclusion_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusion_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_exclusion_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclusion_patterns.push(pattern.into());
        self
    }

    /// Ports every key, sessions and search indices included.
    pub fn no_exclusions(mut self) -> Self {
        self.exclusion_patterns.clear();
        self
    }

    pub fn build(self) -> KvPortResult<TransferConfig> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let source = self.source.ok_or_else(|| missing("source"))?;
        let destination = self.destination.ok_or_else(|| missing("destination"))?;
        if source == destination {
            log::error!("Source and destination are both '{}'", source);
            return Err(KvPortError::new(
                &format!(
                    "Source and destination must be different backends, both are '{}'",
                    source
                ),
                ErrorKind::ConfigurationError,
            ));
        }

        let key_filter = KeyFilter::new(&self.exclusion_patterns).map_err(|err| {
            log::error!("Invalid exclusion pattern: {}", err);
            err
        })?;

        Ok(TransferConfig {
            source,
            destination,
            session_store: self.session_store,
            cache_store: self.cache_store,
            key_filter,
        })
    }

    fn parse_name(&mut self, name: &str) -> Option<BackendKind> {
        match BackendKind::from_str(name) {
            Ok(kind) => Some(kind),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
                None
            }
        }
    }
}

fn missing(role: &str) -> KvPortError {
    KvPortError::new(
        &format!("No {} backend configured", role),
        ErrorKind::ConfigurationError,
    )
}
