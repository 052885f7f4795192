use crate::errors::{ErrorKind, KvPortError, KvPortResult};
use crate::store::{AdapterContext, AdapterRegistry, StoreAdapter};
use crate::transfer::{
    KeyFilter, TaskRunner, TransferFailure, TransferOutcome, TransferPhase, TransferReport,
    TypeDispatcher,
};
use crate::transfer_config::TransferConfig;
use std::fmt::Display;
use std::thread;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum JobState {
    Init,
    ClearDestination,
    Copy,
    Done,
    Failed,
}

impl Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Init => write!(f, "INIT"),
            JobState::ClearDestination => write!(f, "CLEAR_DESTINATION"),
            JobState::Copy => write!(f, "COPY"),
            JobState::Done => write!(f, "DONE"),
            JobState::Failed => write!(f, "FAILED"),
        }
    }
}

struct CopyError {
    key: Option<String>,
    error: KvPortError,
}

/// One transfer from a source store into a destination store.
///
/// # Purpose
/// A job owns both connected adapters and the timestamp used to rebuild
/// ordered-set scores. It runs two phases in strict order:
///
/// 1. **Clear destination**: delete every portable key already on the destination
/// 2. **Copy**: copy every portable source key, one key at a time
///
/// The first error ends the run; nothing after it is attempted. Keys rejected
/// by the [`KeyFilter`] are neither deleted nor copied.
///
/// # Lifecycle
/// A job is created per invocation and consumed by [`run`](Self::run), which
/// closes both adapters and always returns a [`TransferOutcome`].
///
/// # Usage
/// ```text
/// let job = TransferJob::connect(&config, &registry)?;
/// match job.run() {
///     TransferOutcome::Completed(report) => println!("{}", report),
///     TransferOutcome::Failed(failure) => eprintln!("{}", failure),
/// }
/// ```
pub struct TransferJob {
    source: StoreAdapter,
    destination: StoreAdapter,
    key_filter: KeyFilter,
    timestamp: i64,
    state: JobState,
}

impl TransferJob {
    /// Builds and connects both adapters concurrently.
    ///
    /// Fails if either side cannot be built or connected; an adapter that did
    /// connect is closed again.
    pub fn connect(config: &TransferConfig, registry: &AdapterRegistry) -> KvPortResult<TransferJob> {
        let source_context = config.source_context();
        let destination_context = config.destination_context();
        log::info!(
            "Connecting source '{}' and destination '{}'",
            source_context.backend(),
            destination_context.backend()
        );

        let (source, destination) = thread::scope(|scope| {
            let source = scope.spawn(|| registry.connect(&source_context));
            let destination = scope.spawn(|| registry.connect(&destination_context));
            (
                joined(source.join(), &source_context),
                joined(destination.join(), &destination_context),
            )
        });

        let (source, destination) = match (source, destination) {
            (Ok(source), Ok(destination)) => (source, destination),
            (Err(err), other) | (other, Err(err)) => {
                if let Ok(adapter) = other {
                    close_adapter(&adapter);
                }
                return Err(err);
            }
        };

        TransferJob::from_adapters(source, destination, config.key_filter().clone())
    }

    /// Wraps two already connected adapters.
    ///
    /// Both handles must point at different adapter instances.
    pub fn from_adapters(
        source: StoreAdapter,
        destination: StoreAdapter,
        key_filter: KeyFilter,
    ) -> KvPortResult<TransferJob> {
        if source.same_instance(&destination) {
            log::error!("Source and destination are the same adapter instance");
            return Err(KvPortError::new(
                "Source and destination must be different adapter instances",
                ErrorKind::ConfigurationError,
            ));
        }

        Ok(TransferJob {
            source,
            destination,
            key_filter,
            timestamp: chrono::Utc::now().timestamp_millis(),
            state: JobState::Init,
        })
    }

    /// Overrides the captured timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Milliseconds since the epoch, captured once when the job was created.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn source(&self) -> &StoreAdapter {
        &self.source
    }

    pub fn destination(&self) -> &StoreAdapter {
        &self.destination
    }

    /// Runs both phases, closes the adapters and reports the outcome.
    pub fn run(mut self) -> TransferOutcome {
        let mut report = TransferReport::new();

        self.enter(JobState::ClearDestination);
        let outcome = match self.clear_destination(&mut report) {
            Err(error) => TransferOutcome::Failed(TransferFailure::new(
                TransferPhase::ClearDestination,
                None,
                error,
                report,
            )),
            Ok(()) => {
                self.enter(JobState::Copy);
                match self.copy_source(&mut report) {
                    Ok(()) => TransferOutcome::Completed(report),
                    Err(CopyError { key, error }) => TransferOutcome::Failed(
                        TransferFailure::new(TransferPhase::Copy, key, error, report),
                    ),
                }
            }
        };

        self.finish(outcome)
    }

    fn clear_destination(&self, report: &mut TransferReport) -> KvPortResult<()> {
        let keys = self.destination.list_keys().map_err(|err| {
            log::error!("Failed to list destination keys: {}", err);
            KvPortError::new_with_cause(
                "Failed to list destination keys",
                ErrorKind::EnumerationError,
                err,
            )
        })?;

        let portable = self.key_filter.filter_portable(keys);
        log::debug!("Deleting {} portable destination key(s)", portable.len());
        self.destination.delete_keys(&portable).map_err(|err| {
            log::error!("Failed to clear destination: {}", err);
            KvPortError::new_with_cause(
                "Failed to clear destination",
                ErrorKind::DeleteError,
                err,
            )
        })?;

        report.record_cleared(portable.len());
        Ok(())
    }

    fn copy_source(&self, report: &mut TransferReport) -> Result<(), CopyError> {
        let keys = self.source.list_keys().map_err(|err| {
            log::error!("Failed to list source keys: {}", err);
            CopyError {
                key: None,
                error: KvPortError::new_with_cause(
                    "Failed to list source keys",
                    ErrorKind::EnumerationError,
                    err,
                ),
            }
        })?;

        let total = keys.len();
        let portable = self.key_filter.filter_portable(keys);
        report.record_excluded(total - portable.len());
        log::info!(
            "Copying {} key(s), {} excluded",
            portable.len(),
            total - portable.len()
        );

        let dispatcher = TypeDispatcher::new(&self.source, &self.destination, self.timestamp);
        let mut runner = TaskRunner::new();
        for key in &portable {
            let dispatcher = &dispatcher;
            runner.push(key.as_str(), move || dispatcher.copy_key(key));
        }

        let (completed, failure) = runner.run().into_parts();
        for (_, key_type) in completed {
            report.record_copied(key_type);
        }

        match failure {
            None => Ok(()),
            Some(failure) => Err(CopyError {
                key: Some(failure.label),
                error: failure.error,
            }),
        }
    }

    fn finish(mut self, outcome: TransferOutcome) -> TransferOutcome {
        close_adapter(&self.source);
        close_adapter(&self.destination);

        match &outcome {
            TransferOutcome::Completed(report) => {
                self.enter(JobState::Done);
                log::info!("Transfer completed: {}", report);
            }
            TransferOutcome::Failed(failure) => {
                self.enter(JobState::Failed);
                log::error!("Transfer failed: {}", failure);
            }
        }
        outcome
    }

    fn enter(&mut self, next: JobState) {
        log::debug!("Transfer job {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Connects both stores, runs the transfer and reports the outcome.
///
/// Connection failures are reported as a failed outcome in the `Init` phase.
pub fn transfer(config: &TransferConfig, registry: &AdapterRegistry) -> TransferOutcome {
    match TransferJob::connect(config, registry) {
        Ok(job) => job.run(),
        Err(error) => {
            log::error!("Transfer failed before copying: {}", error);
            TransferOutcome::Failed(TransferFailure::new(
                TransferPhase::Init,
                None,
                error,
                TransferReport::new(),
            ))
        }
    }
}

fn joined(
    result: thread::Result<KvPortResult<StoreAdapter>>,
    context: &AdapterContext,
) -> KvPortResult<StoreAdapter> {
    result.unwrap_or_else(|_| {
        log::error!("Connecting backend '{}' panicked", context.backend());
        Err(KvPortError::new(
            &format!("Connecting backend '{}' panicked", context.backend()),
            ErrorKind::ConnectionError,
        ))
    })
}

fn close_adapter(adapter: &StoreAdapter) {
    if let Err(err) = adapter.close() {
        log::warn!(
            "Failed to close backend '{}': {}",
            adapter.backend_kind(),
            err
        );
    }
}
