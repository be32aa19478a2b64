use std::fmt;

use thiserror::Error;

use crate::primitive::{PrimitiveKind, PropKind};
use crate::tensor::Precision;

/// Errors raised while describing tensors, creating primitives or executing them.
///
/// Every variant is a caller configuration problem detected before any output
/// is written; none of them is worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    #[error("invalid dimensions {dims:?}: {reason}")]
    InvalidDims { dims: Vec<usize>, reason: &'static str },

    #[error("dimension order {order:?} is not a permutation of 0..{rank}")]
    InvalidOrder { order: Vec<usize>, rank: usize },

    #[error("format {format} expects {expected} dimensions, got {got}")]
    RankMismatch { format: String, expected: usize, got: usize },

    #[error("channel extent {channels} is not divisible by block size {block}")]
    IndivisibleBlock { channels: usize, block: usize },

    #[error("{operand} shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        operand: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("{operand} descriptor differs from the one the primitive was created with")]
    DescriptorMismatch { operand: &'static str },

    #[error("{operand} operand is required by the descriptor but was not supplied")]
    MissingOperand { operand: &'static str },

    #[error("{operand} operand was supplied but the descriptor has none")]
    UnexpectedOperand { operand: &'static str },

    #[error("buffer holds {len} elements, descriptor needs {required}")]
    BufferTooSmall { len: usize, required: usize },

    #[error("index {index:?} out of bounds for dims {dims:?}")]
    IndexOutOfBounds { index: Vec<usize>, dims: Vec<usize> },

    #[error("unknown memory format `{0}`")]
    UnknownFormat(String),

    #[error("{algorithm}: unsupported precision {precision}")]
    UnsupportedPrecision {
        algorithm: &'static str,
        precision: Precision,
    },

    #[error("{algorithm}: unsupported propagation kind {prop_kind}")]
    UnsupportedPropKind {
        algorithm: &'static str,
        prop_kind: PropKind,
    },

    #[error("{algorithm}: {reason}")]
    Unsupported {
        algorithm: &'static str,
        reason: String,
    },

    #[error("no implementation accepts this {primitive} descriptor: {reason}")]
    NoImplementation {
        primitive: PrimitiveKind,
        reason: String,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, PrimitiveError>;

impl From<rayon::ThreadPoolBuildError> for PrimitiveError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        PrimitiveError::ThreadPool(err.to_string())
    }
}

impl PrimitiveError {
    /// The status code a pipeline sees for this error.
    pub fn status(&self) -> Status {
        match self {
            PrimitiveError::UnsupportedPrecision { .. }
            | PrimitiveError::UnsupportedPropKind { .. }
            | PrimitiveError::Unsupported { .. }
            | PrimitiveError::NoImplementation { .. } => Status::Unimplemented,
            PrimitiveError::ThreadPool(_) => Status::RuntimeError,
            _ => Status::InvalidArguments,
        }
    }
}

/// Coarse outcome of a forward execution, as consumed by an execution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    InvalidArguments,
    Unimplemented,
    RuntimeError,
}

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl From<&PrimitiveError> for Status {
    fn from(err: &PrimitiveError) -> Self {
        err.status()
    }
}

impl<T> From<&Result<T>> for Status {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(err) => err.status(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::InvalidArguments => write!(f, "invalid_arguments"),
            Status::Unimplemented => write!(f, "unimplemented"),
            Status::RuntimeError => write!(f, "runtime_error"),
        }
    }
}
