use crate::common::KeyType;
use crate::errors::{KvPortError, KvPortResult};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Stage of a transfer job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransferPhase {
    /// Acquiring and connecting both adapters.
    Init,
    /// Deleting the destination's portable keys.
    ClearDestination,
    /// Copying each portable source key.
    Copy,
}

impl Display for TransferPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferPhase::Init => write!(f, "init"),
            TransferPhase::ClearDestination => write!(f, "clear destination"),
            TransferPhase::Copy => write!(f, "copy"),
        }
    }
}

/// Counters gathered during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    cleared: usize,
    excluded: usize,
    vanished: usize,
    copied: BTreeMap<&'static str, usize>,
}

impl TransferReport {
    pub fn new() -> TransferReport {
        TransferReport::default()
    }

    /// Portable destination keys deleted before copying.
    pub fn keys_cleared(&self) -> usize {
        self.cleared
    }

    /// Source keys skipped by the exclusion filter.
    pub fn keys_excluded(&self) -> usize {
        self.excluded
    }

    /// Source keys that disappeared between enumeration and copy.
    pub fn keys_vanished(&self) -> usize {
        self.vanished
    }

    /// Keys copied with the given type.
    pub fn keys_copied(&self, key_type: KeyType) -> usize {
        self.copied.get(key_type.name()).copied().unwrap_or(0)
    }

    pub fn total_copied(&self) -> usize {
        self.copied.values().sum()
    }

    pub(crate) fn record_cleared(&mut self, count: usize) {
        self.cleared += count;
    }

    pub(crate) fn record_excluded(&mut self, count: usize) {
        self.excluded += count;
    }

    /// Records one copied key; `KeyType::None` counts as vanished.
    pub(crate) fn record_copied(&mut self, key_type: KeyType) {
        if key_type.exists() {
            *self.copied.entry(key_type.name()).or_insert(0) += 1;
        } else {
            self.vanished += 1;
        }
    }
}

impl Display for TransferReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cleared {}, copied {} (",
            self.cleared,
            self.total_copied()
        )?;
        let mut first = true;
        for (name, count) in &self.copied {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, count)?;
            first = false;
        }
        write!(
            f,
            "), excluded {}, vanished {}",
            self.excluded, self.vanished
        )
    }
}

/// Why a transfer stopped.
#[derive(Debug, Clone)]
pub struct TransferFailure {
    phase: TransferPhase,
    key: Option<String>,
    error: KvPortError,
    report: TransferReport,
}

impl TransferFailure {
    pub(crate) fn new(
        phase: TransferPhase,
        key: Option<String>,
        error: KvPortError,
        report: TransferReport,
    ) -> TransferFailure {
        TransferFailure {
            phase,
            key,
            error,
            report,
        }
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    /// The key being copied when the failure happened, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn error(&self) -> &KvPortError {
        &self.error
    }

    /// Work done before the failure.
    pub fn report(&self) -> &TransferReport {
        &self.report
    }
}

impl Display for TransferFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} phase failed at key '{}': {}", self.phase, key, self.error),
            None => write!(f, "{} phase failed: {}", self.phase, self.error),
        }
    }
}

/// Final result of a transfer. Every run ends with exactly one outcome.
#[derive(Debug, Clone)]
pub enum TransferOutcome {
    Completed(TransferReport),
    Failed(TransferFailure),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Completed(_))
    }

    /// The full report, or the partial one of a failed run.
    pub fn report(&self) -> &TransferReport {
        match self {
            TransferOutcome::Completed(report) => report,
            TransferOutcome::Failed(failure) => failure.report(),
        }
    }

    pub fn failure(&self) -> Option<&TransferFailure> {
        match self {
            TransferOutcome::Completed(_) => None,
            TransferOutcome::Failed(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> KvPortResult<TransferReport> {
        match self {
            TransferOutcome::Completed(report) => Ok(report),
            TransferOutcome::Failed(failure) => Err(failure.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_record_copied_counts_per_type() {
        let mut report = TransferReport::new();
        report.record_copied(KeyType::Hash);
        report.record_copied(KeyType::Hash);
        report.record_copied(KeyType::List);
        report.record_copied(KeyType::None);

        assert_eq!(report.keys_copied(KeyType::Hash), 2);
        assert_eq!(report.keys_copied(KeyType::List), 1);
        assert_eq!(report.keys_copied(KeyType::Set), 0);
        assert_eq!(report.total_copied(), 3);
        assert_eq!(report.keys_vanished(), 1);
    }

    #[test]
    fn test_report_display() {
        let mut report = TransferReport::new();
        report.record_cleared(4);
        report.record_excluded(1);
        report.record_copied(KeyType::Scalar);
        report.record_copied(KeyType::Hash);
        assert_eq!(
            report.to_string(),
            "cleared 4, copied 2 (hash: 1, string: 1), excluded 1, vanished 0"
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let completed = TransferOutcome::Completed(TransferReport::new());
        assert!(completed.is_success());
        assert!(completed.failure().is_none());
        assert!(completed.into_result().is_ok());

        let mut partial = TransferReport::new();
        partial.record_copied(KeyType::Set);
        let failed = TransferOutcome::Failed(TransferFailure::new(
            TransferPhase::Copy,
            Some("k".to_string()),
            KvPortError::new("write failed", ErrorKind::WriteError),
            partial,
        ));
        assert!(!failed.is_success());
        assert_eq!(failed.report().keys_copied(KeyType::Set), 1);
        let failure = failed.failure().unwrap();
        assert_eq!(failure.phase(), TransferPhase::Copy);
        assert_eq!(failure.key(), Some("k"));
        assert_eq!(failure.to_string(), "copy phase failed at key 'k': write failed");

        let err = failed.into_result().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::WriteError);
    }
}
