//! Module with the error types used by the expectation engine.

use ethabi::Error as AbiError;
use thiserror::Error;
use web3::error::Error as Web3Error;

/// Error that can occur while declaring or installing expectations.
#[derive(Debug, Error)]
pub enum ExpectationError {
    /// A rule of the fluent declaration chain was violated, for example
    /// arguments were set twice or an outcome followed a revert.
    #[error("{0}")]
    Sequence(String),

    /// Declared values don't match the function's parameter types or count.
    #[error("[{signature}]: {source}")]
    Encoding {
        /// Human-readable signature of the offending function.
        signature: String,
        /// The underlying mismatch.
        #[source]
        source: EncodingError,
    },

    /// A function or its selector could not be found in the interface.
    #[error("{0}")]
    Resolution(String),

    /// The operation can never be performed on this stub.
    #[error("{0}")]
    Unsupported(&'static str),

    /// The execution environment failed to store an expectation.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

impl ExpectationError {
    /// Creates a new sequence error.
    pub(crate) fn sequence(message: impl Into<String>) -> Self {
        ExpectationError::Sequence(message.into())
    }

    /// Wraps an encoding failure with the signature of the function that
    /// caused it.
    pub(crate) fn encoding(signature: impl Into<String>, source: impl Into<EncodingError>) -> Self {
        ExpectationError::Encoding {
            signature: signature.into(),
            source: source.into(),
        }
    }
}

/// Cause of an [`ExpectationError::Encoding`].
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The ABI coder rejected the values.
    #[error("ABI encoding error: {0}")]
    Abi(#[from] AbiError),

    /// Wrong number of values.
    #[error("expected {expected} values but got {actual}")]
    Arity {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied values.
        actual: usize,
    },

    /// Return values were declared for a function that has none.
    #[error("cannot mock return values of a function without outputs")]
    NoOutputs,

    /// Values have the right count but not the right types.
    #[error("values {values} do not match types ({types})")]
    Types {
        /// Supplied values.
        values: String,
        /// Declared parameter types.
        types: String,
    },
}

/// An opaque failure reported by an execution environment.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// An error occurred while performing a web3 call.
    #[error("web3 error: {0}")]
    Web3(#[from] Web3Error),

    /// The environment refused the request.
    #[error("environment rejected request: {0}")]
    Rejected(String),
}

/// Error produced when invoking a mocked function on the in-memory
/// environment.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CallError {
    /// The call matched a declared revert.
    #[error("reverted with reason string '{0}'")]
    Revert(String),

    /// No response was ever declared for the call.
    #[error("Mock on the method is not initialized")]
    NotInitialized,
}
