//! Error taxonomy for the crate, plus the `err_at!` macro used at every
//! fallible call site to stamp the error with its origin.
//!
//! The pattern mirrors the call convention seen throughout the teacher
//! codebase this crate is grounded on (`err_at!(Variant, ...)`), even
//! though that macro's own definition lived outside the files this crate
//! started from — we reconstruct it here since every module needs it.

use std::{fmt, io, result};

/// The distinct, signalable error kinds this crate can raise.
#[derive(Debug)]
pub enum Error {
    /// Malformed filter/update document, unknown operator, non-string
    /// collection name, bad sort direction.
    InvalidArgument(String),
    /// Insert with an `_id` already present in the collection.
    DuplicateKey(String),
    /// Cursor reused after close, `drop_index` on a missing index,
    /// `next()` past exhaustion.
    InvalidOperation(String),
    /// `$inc` on a non-numeric value, `$push` on a non-sequence, `$set`
    /// through a non-container intermediate path segment.
    InvalidUpdate(String),
    /// Underlying storage backend I/O failure.
    StorageIo(String),
    /// Operator or keyword parameter recognized but not supported.
    NotImplemented(String),
    /// Internal consistency failure: manifest/index disagree with stored
    /// documents. Not reachable through any documented public operation.
    Fatal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
            Error::DuplicateKey(s) => write!(f, "duplicate key: {}", s),
            Error::InvalidOperation(s) => write!(f, "invalid operation: {}", s),
            Error::InvalidUpdate(s) => write!(f, "invalid update: {}", s),
            Error::StorageIo(s) => write!(f, "storage I/O error: {}", s),
            Error::NotImplemented(s) => write!(f, "not implemented: {}", s),
            Error::Fatal(s) => write!(f, "fatal: {}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::StorageIo(err.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Build an `Error` of the given variant, stamped with call-site location.
///
/// ```ignore
/// err_at!(InvalidArgument, msg: "unknown operator {}", op)?;
/// err_at!(StorageIo, io_result)?;
/// ```
#[macro_export]
macro_rules! err_at {
    ($variant:ident, msg: $($arg:tt)+) => {{
        let msg = format!("{}:{} {}", file!(), line!(), format_args!($($arg)+));
        Err($crate::error::Error::$variant(msg))
    }};
    ($variant:ident, $result:expr) => {{
        match $result {
            Ok(val) => Ok(val),
            Err(err) => {
                let msg = format!("{}:{} {}", file!(), line!(), err);
                Err($crate::error::Error::$variant(msg))
            }
        }
    }};
}
