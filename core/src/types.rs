use std::io;
use num_enum::TryFromPrimitive;
use thiserror::Error;

/// Stable numeric codes for each failure kind.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum ErrorCode {
    InvalidArgument    = 3,
    FailedPrecondition = 9,
    ResourceExhausted  = 8,
    Unimplemented      = 12,
    Internal           = 13,
    DataLoss           = 15,
    Unknown            = 2,
}

/// Unified error for every reader, writer and codec in the crate.
/// - Cloneable so a failed reader can hand out its status repeatedly.
/// - Messages carry the provider's own text (io, crypto) where one exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Bad offset, oversized chunk, missing or malformed codec parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation requested on a source that cannot perform it (e.g. seeking).
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// Object used in the wrong state (cipher not initialized, writer closed).
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("data loss: {0}")]
    DataLoss(String),

    /// Broken internal invariant.
    #[error("internal error: {0}")]
    Internal(String),

    /// Opaque I/O or crypto-provider failure.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl StreamError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StreamError::InvalidArgument(_)    => ErrorCode::InvalidArgument,
            StreamError::Unimplemented(_)      => ErrorCode::Unimplemented,
            StreamError::FailedPrecondition(_) => ErrorCode::FailedPrecondition,
            StreamError::ResourceExhausted(_)  => ErrorCode::ResourceExhausted,
            StreamError::DataLoss(_)           => ErrorCode::DataLoss,
            StreamError::Internal(_)           => ErrorCode::Internal,
            StreamError::Unknown(_)            => ErrorCode::Unknown,
        }
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            StreamError::InvalidArgument(m)
            | StreamError::Unimplemented(m)
            | StreamError::FailedPrecondition(m)
            | StreamError::ResourceExhausted(m)
            | StreamError::DataLoss(m)
            | StreamError::Internal(m)
            | StreamError::Unknown(m) => m,
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::InvalidInput  => StreamError::InvalidArgument(e.to_string()),
            io::ErrorKind::Unsupported   => StreamError::Unimplemented(e.to_string()),
            io::ErrorKind::OutOfMemory   => StreamError::ResourceExhausted(e.to_string()),
            io::ErrorKind::UnexpectedEof => StreamError::DataLoss(e.to_string()),
            _                            => StreamError::Unknown(e.to_string()),
        }
    }
}

/// Outcome of the last operation on a reader or writer.
pub type Status = Result<(), StreamError>;
