use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("invalid handle: {0}")]
    InvalidHandle(String),
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
    #[error("unknown vertex: {0}")]
    UnknownVertex(i64),
    #[error("unknown edge: {0}")]
    UnknownEdge(i64),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(String),
    #[error("no such element")]
    NoSuchElement,
    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl GraphError {
    pub fn invalid_handle<T: Into<String>>(msg: T) -> Self {
        GraphError::InvalidHandle(msg.into())
    }

    pub fn illegal_argument<T: Into<String>>(msg: T) -> Self {
        GraphError::IllegalArgument(msg.into())
    }

    pub fn unsupported<T: Into<String>>(msg: T) -> Self {
        GraphError::UnsupportedOperation(msg.into())
    }

    pub fn out_of_bounds<T: Into<String>>(msg: T) -> Self {
        GraphError::IndexOutOfBounds(msg.into())
    }

    pub fn concurrent_modification<T: Into<String>>(msg: T) -> Self {
        GraphError::ConcurrentModification(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        GraphError::Io(msg.into())
    }

    /// An algorithm reached a state its own invariants rule out.
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        GraphError::Internal(msg.into())
    }

    pub fn status(&self) -> Status {
        match self {
            GraphError::InvalidHandle(_) => Status::InvalidHandle,
            GraphError::IllegalArgument(_) => Status::IllegalArgument,
            GraphError::UnknownVertex(_) | GraphError::UnknownEdge(_) => Status::IllegalArgument,
            GraphError::UnsupportedOperation(_) => Status::UnsupportedOperation,
            GraphError::IndexOutOfBounds(_) => Status::IndexOutOfBounds,
            GraphError::NoSuchElement => Status::NoSuchElement,
            GraphError::ConcurrentModification(_) => Status::ConcurrentModification,
            GraphError::Io(_) => Status::IoError,
            GraphError::Internal(_) => Status::Error,
        }
    }
}

impl From<std::io::Error> for GraphError {
    fn from(err: std::io::Error) -> Self {
        GraphError::Io(err.to_string())
    }
}

/// Discrete result code recorded by every engine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Status {
    Success = 0,
    Error = 1,
    IllegalArgument = 2,
    UnsupportedOperation = 3,
    IndexOutOfBounds = 4,
    NoSuchElement = 5,
    InvalidHandle = 6,
    ConcurrentModification = 7,
    IoError = 8,
}

impl Status {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Success => "success",
            Status::Error => "error",
            Status::IllegalArgument => "illegal argument",
            Status::UnsupportedOperation => "unsupported operation",
            Status::IndexOutOfBounds => "index out of bounds",
            Status::NoSuchElement => "no such element",
            Status::InvalidHandle => "invalid handle",
            Status::ConcurrentModification => "concurrent modification",
            Status::IoError => "io error",
        };
        write!(f, "{name}")
    }
}
