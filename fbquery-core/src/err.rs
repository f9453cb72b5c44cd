//! Errors are carried as `anyhow::Error` throughout the workspace.
//!
//! Failures the caller is expected to tell apart are raised as a [`CompileError`]
//! inside the `anyhow::Error` and can be recovered with `err.downcast_ref::<CompileError>()`.

use std::fmt::{self, Display};

pub use anyhow::{anyhow, bail, ensure, Context, Error, Result};

/// Translation-time failures, none of which are retryable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The query tree has a shape the translator cannot handle at all
    UnsupportedExpression(String),
    /// A member access or method call has no registered translation for its arity
    UnmappedOperation { operation: String, arity: usize },
    /// The construct is valid in principle but not supported by the target server version
    UnsupportedFeature(String),
    /// A malformed argument, such as a negative row count
    InvalidArgument(String),
}

impl CompileError {
    pub fn unsupported_expression(msg: impl Into<String>) -> Self {
        Self::UnsupportedExpression(msg.into())
    }

    pub fn unmapped(operation: impl Into<String>, arity: usize) -> Self {
        Self::UnmappedOperation {
            operation: operation.into(),
            arity,
        }
    }

    pub fn unsupported_feature(msg: impl Into<String>) -> Self {
        Self::UnsupportedFeature(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Finds the compile error carried by the supplied error, if any
    pub fn of(err: &Error) -> Option<&CompileError> {
        err.downcast_ref::<CompileError>()
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnsupportedExpression(msg) => {
                write!(f, "Unsupported expression: {msg}")
            }
            CompileError::UnmappedOperation { operation, arity } => write!(
                f,
                "No translation registered for {operation} with {arity} argument(s)"
            ),
            CompileError::UnsupportedFeature(msg) => write!(f, "Unsupported feature: {msg}"),
            CompileError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for CompileError {}
