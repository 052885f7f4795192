use backtrace::Backtrace;
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for kvport operations.
///
/// The first six variants form the transfer taxonomy: every failure surfaced by a
/// transfer run carries one of them, naming the operation that broke. The remaining
/// variants classify causes raised inside adapters, configuration and codecs.
///
/// # Examples
///
/// ```rust,ignore
/// use kvport::errors::{KvPortError, ErrorKind, KvPortResult};
///
/// fn example() -> KvPortResult<()> {
///     Err(KvPortError::new("backend refused connection", ErrorKind::ConnectionError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum ErrorKind {
    // Transfer taxonomy
    /// An adapter failed to establish its backend connection
    ConnectionError,
    /// Listing the keys of a store failed
    EnumerationError,
    /// Type introspection of a single key failed
    LookupError,
    /// A type-specific read failed
    ReadError,
    /// A type-specific write failed
    WriteError,
    /// Bulk delete of destination keys failed
    DeleteError,

    // Configuration
    /// Invalid or inconsistent configuration (unknown backend, bad pattern, ...)
    ConfigurationError,

    // Adapter-level causes
    /// A typed operation hit a key holding a different type
    WrongType,
    /// The adapter was used before `connect` or after `close`
    NotConnected,
    /// Error reported by the storage backend itself
    BackendError,
    /// Error encoding or decoding stored data
    EncodingError,
    /// Generic IO error
    IOError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConnectionError => write!(f, "Connection error"),
            ErrorKind::EnumerationError => write!(f, "Enumeration error"),
            ErrorKind::LookupError => write!(f, "Lookup error"),
            ErrorKind::ReadError => write!(f, "Read error"),
            ErrorKind::WriteError => write!(f, "Write error"),
            ErrorKind::DeleteError => write!(f, "Delete error"),
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::WrongType => write!(f, "Wrong type"),
            ErrorKind::NotConnected => write!(f, "Not connected"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom kvport error type.
///
/// `KvPortError` carries a message, a kind and an optional cause. Adapters raise
/// errors classified by what went wrong in the backend; the transfer engine wraps
/// them with [`KvPortError::new_with_cause`] so the outer kind names the operation
/// that failed while the cause keeps the backend detail.
///
/// # Examples
///
/// ```rust,ignore
/// use kvport::errors::{KvPortError, ErrorKind};
///
/// let cause = KvPortError::new("partition is closed", ErrorKind::BackendError);
/// let err = KvPortError::new_with_cause("Failed to read hash user:1", ErrorKind::ReadError, cause);
/// assert_eq!(err.kind(), &ErrorKind::ReadError);
/// ```
#[derive(Clone)]
pub struct KvPortError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<KvPortError>>,
    backtrace: Arc<Mutex<Backtrace>>,
}

impl KvPortError {
    /// Creates a new `KvPortError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        KvPortError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    /// Creates a new `KvPortError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: KvPortError) -> Self {
        KvPortError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&KvPortError> {
        self.cause.as_deref()
    }

    /// Returns the innermost error of the cause chain.
    pub fn root_cause(&self) -> &KvPortError {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }
}

impl Display for KvPortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for KvPortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.lock();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, backtrace)
            }
        }
    }
}

impl Error for KvPortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for kvport operations.
pub type KvPortResult<T> = Result<T, KvPortError>;

impl From<std::io::Error> for KvPortError {
    fn from(err: std::io::Error) -> Self {
        KvPortError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<regex::Error> for KvPortError {
    fn from(err: regex::Error) -> Self {
        KvPortError::new(
            &format!("Invalid pattern: {}", err),
            ErrorKind::ConfigurationError,
        )
    }
}

impl From<String> for KvPortError {
    fn from(msg: String) -> Self {
        KvPortError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for KvPortError {
    fn from(msg: &str) -> Self {
        KvPortError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_error() {
        let error = KvPortError::new("An error occurred", ErrorKind::ReadError);
        assert_eq!(error.message(), "An error occurred");
        assert_eq!(error.kind(), &ErrorKind::ReadError);
        assert!(error.cause().is_none());
    }

    #[test]
    fn test_new_with_cause_keeps_chain() {
        let cause = KvPortError::new("partition closed", ErrorKind::BackendError);
        let error = KvPortError::new_with_cause("Failed to read", ErrorKind::ReadError, cause);

        assert_eq!(error.kind(), &ErrorKind::ReadError);
        let cause = error.cause().expect("cause should be present");
        assert_eq!(cause.kind(), &ErrorKind::BackendError);
        assert_eq!(cause.message(), "partition closed");
    }

    #[test]
    fn test_root_cause_walks_to_innermost() {
        let inner = KvPortError::new("disk gone", ErrorKind::IOError);
        let middle = KvPortError::new_with_cause("backend failed", ErrorKind::BackendError, inner);
        let outer = KvPortError::new_with_cause("write failed", ErrorKind::WriteError, middle);

        assert_eq!(outer.root_cause().kind(), &ErrorKind::IOError);
        assert_eq!(outer.root_cause().message(), "disk gone");
    }

    #[test]
    fn test_root_cause_of_leaf_is_itself() {
        let error = KvPortError::new("leaf", ErrorKind::LookupError);
        assert_eq!(error.root_cause().message(), "leaf");
    }

    #[test]
    fn test_display_prints_message_only() {
        let cause = KvPortError::new("inner", ErrorKind::BackendError);
        let error = KvPortError::new_with_cause("outer", ErrorKind::DeleteError, cause);
        assert_eq!(format!("{}", error), "outer");
    }

    #[test]
    fn test_debug_includes_cause() {
        let cause = KvPortError::new("inner", ErrorKind::BackendError);
        let error = KvPortError::new_with_cause("outer", ErrorKind::DeleteError, cause);
        let debug = format!("{:?}", error);
        assert!(debug.contains("outer"));
        assert!(debug.contains("Caused by: inner"));
    }

    #[test]
    fn test_source_exposes_cause() {
        let cause = KvPortError::new("inner", ErrorKind::BackendError);
        let error = KvPortError::new_with_cause("outer", ErrorKind::WriteError, cause);
        let source = error.source().expect("source should be present");
        assert_eq!(source.to_string(), "inner");

        let leaf = KvPortError::new("leaf", ErrorKind::WriteError);
        assert!(leaf.source().is_none());
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::ConnectionError.to_string(), "Connection error");
        assert_eq!(ErrorKind::EnumerationError.to_string(), "Enumeration error");
        assert_eq!(ErrorKind::LookupError.to_string(), "Lookup error");
        assert_eq!(ErrorKind::ReadError.to_string(), "Read error");
        assert_eq!(ErrorKind::WriteError.to_string(), "Write error");
        assert_eq!(ErrorKind::DeleteError.to_string(), "Delete error");
        assert_eq!(ErrorKind::ConfigurationError.to_string(), "Configuration error");
        assert_eq!(ErrorKind::WrongType.to_string(), "Wrong type");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::other("boom");
        let error: KvPortError = io.into();
        assert_eq!(error.kind(), &ErrorKind::IOError);
        assert!(error.message().contains("boom"));
    }

    #[test]
    fn test_from_regex_error_is_configuration_error() {
        let err = regex::Regex::new("(unclosed").unwrap_err();
        let error: KvPortError = err.into();
        assert_eq!(error.kind(), &ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_from_str_and_string() {
        let a: KvPortError = "plain".into();
        let b: KvPortError = String::from("owned").into();
        assert_eq!(a.kind(), &ErrorKind::InternalError);
        assert_eq!(b.message(), "owned");
    }

    #[test]
    fn test_clone_preserves_kind_and_cause() {
        let cause = KvPortError::new("inner", ErrorKind::BackendError);
        let error = KvPortError::new_with_cause("outer", ErrorKind::ReadError, cause);
        let cloned = error.clone();
        assert_eq!(cloned.kind(), error.kind());
        assert_eq!(cloned.cause().map(|c| c.message()), Some("inner"));
    }
}
