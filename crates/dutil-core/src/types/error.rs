//! Error types shared by every container in the toolkit
//!
//! All components report failures through one flat enum so callers can funnel
//! every outcome through a single dispatch point. Components never log, retry
//! or abort on failure; the error is handed back to the immediate caller.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Flat error type for all toolkit operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Memory allocation failed
    #[error("Memory allocation failed")]
    OutOfMemory,

    /// Index outside `[0, len)` (or `[0, len]` for insertion)
    #[error("Illegal index {index} for length {len}")]
    IllegalIndex {
        /// Requested index
        index: usize,
        /// Length of the container at the time of the call
        len: usize,
    },

    /// Size argument is not acceptable
    #[error("Illegal size: {0}")]
    IllegalSize(String),

    /// Key is not acceptable (empty keys are rejected)
    #[error("Illegal key")]
    IllegalKey,

    /// Generic caller programming error
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    /// Handle refers to a removed element or a cleared container
    #[error("Handle is stale or does not belong to this container")]
    InvalidHandle,

    /// Vertices or edges from two different graphs were mixed
    #[error("Vertices belong to different graphs")]
    DifferentGraphs,

    /// An edge between the same ordered vertex pair already exists
    #[error("Duplicate edge")]
    DuplicateEdge,

    /// Keyed lookup or removal found nothing
    #[error("Element not found")]
    NotFound,

    /// Operation requires a non-empty list
    #[error("List is empty")]
    EmptyList,

    /// Cursor is at the last element
    #[error("No next element")]
    NoNext,

    /// Cursor is at the first element
    #[error("No previous element")]
    NoPrev,

    /// Guard bytes around a pool allocation were overwritten
    #[error("Memory pool overflow detected at offset {offset} (allocation of {size} bytes)")]
    MempoolOverflow {
        /// Offset of the allocation inside its block
        offset: usize,
        /// Size of the allocation
        size: usize,
    },

    /// Pool allocation was already freed
    #[error("Memory pool allocation already freed")]
    MempoolAlreadyFree,

    /// Read past the end of the serialized data
    #[error("No more data: needed {needed} bytes, {remaining} remaining")]
    NoMoreData {
        /// Bytes required by the read
        needed: usize,
        /// Bytes left after the cursor
        remaining: usize,
    },

    /// Read type does not match the written type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type requested by the reader
        expected: &'static str,
        /// Type recorded by the writer
        found: &'static str,
    },

    /// Malformed encoded input
    #[error("Illegal message: {0}")]
    IllegalMessage(String),

    /// Integrity tag does not match the payload
    #[error("Checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the envelope
        expected: u32,
        /// Checksum computed over the payload
        actual: u32,
    },

    /// Envelope written by an unsupported format version
    #[error("Incompatible version {found} (supported: {supported})")]
    IncompatibleVersion {
        /// Version found in the input
        found: u8,
        /// Version this build reads and writes
        supported: u8,
    },

    /// A graph enumeration callback reported an error
    #[error("Callback reported an error")]
    CallbackError,
}

/// Failure classes shared by all components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Allocation failure; the operation had no effect
    OutOfMemory,
    /// Caller programming error; the operation had no effect
    IllegalArgument,
    /// Keyed lookup or removal miss
    NotFound,
    /// Operation needs a non-empty container
    StructuralEmpty,
    /// Cursor moved past either end
    Boundary,
    /// Memory safety contract already violated
    Corruption,
    /// Malformed or mismatched encoded data
    Protocol,
}

impl Error {
    /// Create an illegal size error
    pub fn illegal_size(msg: impl Into<String>) -> Self {
        Self::IllegalSize(msg.into())
    }

    /// Create an illegal argument error
    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        Self::IllegalArgument(msg.into())
    }

    /// Create an illegal message error
    pub fn illegal_message(msg: impl Into<String>) -> Self {
        Self::IllegalMessage(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::OutOfMemory => ErrorKind::OutOfMemory,
            Error::IllegalIndex { .. }
            | Error::IllegalSize(_)
            | Error::IllegalKey
            | Error::IllegalArgument(_)
            | Error::InvalidHandle
            | Error::DifferentGraphs
            | Error::DuplicateEdge => ErrorKind::IllegalArgument,
            Error::NotFound => ErrorKind::NotFound,
            Error::EmptyList => ErrorKind::StructuralEmpty,
            Error::NoNext | Error::NoPrev => ErrorKind::Boundary,
            Error::MempoolOverflow { .. } | Error::MempoolAlreadyFree => ErrorKind::Corruption,
            Error::NoMoreData { .. }
            | Error::TypeMismatch { .. }
            | Error::IllegalMessage(_)
            | Error::ChecksumMismatch { .. }
            | Error::IncompatibleVersion { .. }
            | Error::CallbackError => ErrorKind::Protocol,
        }
    }

    /// Check if memory safety may already have been violated
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Corruption
    }

    /// Check if this is a caller programming error
    pub fn is_caller_error(&self) -> bool {
        self.kind() == ErrorKind::IllegalArgument
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
