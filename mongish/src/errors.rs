use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::store::IndexConflict;

/// Error kinds for mongish operations.
///
/// The kinds follow the failure taxonomy of the layer: missing references are never
/// errors (they are recorded in the `missing` marker of a document), unique index
/// violations surface as [ErrorKind::WriteConflict], anything the store itself fails
/// on is a [ErrorKind::StoreFailure] and programming mistakes such as an unknown
/// collection name are configuration errors.
///
/// # Examples
///
/// ```rust,ignore
/// use mongish::errors::{MongishError, ErrorKind, MongishResult};
///
/// fn example() -> MongishResult<()> {
///     Err(MongishError::new("Source collection not found", ErrorKind::CollectionNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The requested document does not exist
    NotFound,
    /// A unique index was violated by an insert or update
    WriteConflict,
    /// The underlying store failed to serve a lookup, list, count or write
    StoreFailure,
    /// A collection name could not be resolved through the registry
    CollectionNotFound,
    /// The caller supplied options that cannot be honoured
    ConfigurationError,
    /// A conflict-resolving write gave up after the configured number of attempts
    RetryLimitExceeded,
    /// A document id is missing or malformed
    InvalidId,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Invalid field name
    InvalidFieldName,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::WriteConflict => write!(f, "Write conflict"),
            ErrorKind::StoreFailure => write!(f, "Store failure"),
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::RetryLimitExceeded => write!(f, "Retry limit exceeded"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InvalidFieldName => write!(f, "Invalid field name"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom mongish error type.
///
/// `MongishError` carries a message, a kind, an optional cause and, for
/// [ErrorKind::WriteConflict], the [IndexConflict] reported by the store. The
/// conflict keeps the store's native detail string so callers can still inspect it
/// verbatim.
///
/// # Examples
///
/// ```rust,ignore
/// use mongish::errors::{MongishError, ErrorKind};
///
/// let cause = MongishError::new("connection reset", ErrorKind::StoreFailure);
/// let err = MongishError::new_with_cause("Failed to list documents", ErrorKind::StoreFailure, cause);
/// ```
#[derive(Clone)]
pub struct MongishError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<MongishError>>,
    conflict: Option<IndexConflict>,
    backtrace: Backtrace,
}

impl MongishError {
    /// Creates a new `MongishError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        MongishError {
            message: message.to_string(),
            error_kind,
            cause: None,
            conflict: None,
            backtrace: Backtrace::new_unresolved(),
        }
    }

    /// Creates a new `MongishError` with a cause error.
    ///
    /// The cause is preserved and reported through [Error::source].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: MongishError) -> Self {
        MongishError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            conflict: None,
            backtrace: Backtrace::new_unresolved(),
        }
    }

    /// Creates a [ErrorKind::WriteConflict] error from the conflict reported by a store.
    ///
    /// The message is the store's native conflict detail.
    pub fn write_conflict(conflict: IndexConflict) -> Self {
        MongishError {
            message: conflict.detail().to_string(),
            error_kind: ErrorKind::WriteConflict,
            cause: None,
            conflict: Some(conflict),
            backtrace: Backtrace::new_unresolved(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&MongishError> {
        self.cause.as_deref()
    }

    /// The violated index, present only on write conflicts.
    pub fn conflict(&self) -> Option<&IndexConflict> {
        self.conflict.as_ref()
    }

    pub fn is_write_conflict(&self) -> bool {
        self.error_kind == ErrorKind::WriteConflict
    }
}

impl Display for MongishError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for MongishError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.clone();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, backtrace)
            }
        }
    }
}

impl Error for MongishError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for mongish operations.
pub type MongishResult<T> = Result<T, MongishError>;

impl From<std::fmt::Error> for MongishError {
    fn from(err: std::fmt::Error) -> Self {
        MongishError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<regex::Error> for MongishError {
    fn from(err: regex::Error) -> Self {
        MongishError::new(
            &format!("Invalid pattern: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<String> for MongishError {
    fn from(msg: String) -> Self {
        MongishError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for MongishError {
    fn from(msg: &str) -> Self {
        MongishError::new(msg, ErrorKind::InternalError)
    }
}
