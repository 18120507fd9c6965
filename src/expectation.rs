//! Declared behaviours of mocked functions.

use crate::abi::FunctionExt;
use crate::errors::{EncodingError, ExpectationError};
use crate::tokens::Tokens;
use ethabi::{Function, Token};
use std::sync::Arc;

/// A single declared behaviour of a mocked function.
///
/// Each expectation refers to a function of the mocked interface, optionally
/// narrowed to specific argument values. Without arguments it applies to
/// every call of the function.
#[derive(Clone, Debug, PartialEq)]
pub enum Expectation {
    /// The call succeeds and returns the given values.
    Read(ReadExpectation),
    /// The call succeeds without return data.
    Write(WriteExpectation),
    /// The call reverts with the given reason.
    Revert(RevertExpectation),
}

/// See [`Expectation::Read`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReadExpectation {
    function: Arc<Function>,
    inputs: Option<Vec<Token>>,
    outputs: Vec<Token>,
}

/// See [`Expectation::Write`].
#[derive(Clone, Debug, PartialEq)]
pub struct WriteExpectation {
    function: Arc<Function>,
    inputs: Option<Vec<Token>>,
}

/// See [`Expectation::Revert`].
#[derive(Clone, Debug, PartialEq)]
pub struct RevertExpectation {
    function: Arc<Function>,
    inputs: Option<Vec<Token>>,
    reason: String,
}

impl Expectation {
    /// Expects a call that returns `outputs`.
    ///
    /// Fails if the function declares no outputs, since there would be
    /// nothing to return.
    pub fn read(function: Arc<Function>, outputs: impl Tokens) -> Result<Self, ExpectationError> {
        if function.outputs.is_empty() {
            return Err(ExpectationError::encoding(
                function.human_readable(),
                EncodingError::NoOutputs,
            ));
        }
        Ok(Expectation::Read(ReadExpectation {
            function,
            inputs: None,
            outputs: outputs.into_tokens(),
        }))
    }

    /// Expects a call that is accepted without return data.
    pub fn write(function: Arc<Function>) -> Self {
        Expectation::Write(WriteExpectation {
            function,
            inputs: None,
        })
    }

    /// Expects a call that reverts with an empty reason.
    pub fn revert(function: Arc<Function>) -> Self {
        Expectation::revert_with_reason(function, "")
    }

    /// Expects a call that reverts with `reason`.
    pub fn revert_with_reason(function: Arc<Function>, reason: impl Into<String>) -> Self {
        Expectation::Revert(RevertExpectation {
            function,
            inputs: None,
            reason: reason.into(),
        })
    }

    /// Narrows this expectation to calls with exactly these arguments.
    pub fn with_inputs(self, inputs: impl Tokens) -> Self {
        self.with_optional_inputs(Some(inputs.into_tokens()))
    }

    pub(crate) fn with_optional_inputs(mut self, inputs: Option<Vec<Token>>) -> Self {
        match &mut self {
            Expectation::Read(read) => read.inputs = inputs,
            Expectation::Write(write) => write.inputs = inputs,
            Expectation::Revert(revert) => revert.inputs = inputs,
        }
        self
    }

    /// The function this expectation applies to.
    pub fn function(&self) -> &Arc<Function> {
        match self {
            Expectation::Read(read) => &read.function,
            Expectation::Write(write) => &write.function,
            Expectation::Revert(revert) => &revert.function,
        }
    }

    /// Arguments this expectation is narrowed to, if any.
    pub fn inputs(&self) -> Option<&[Token]> {
        match self {
            Expectation::Read(read) => read.inputs.as_deref(),
            Expectation::Write(write) => write.inputs.as_deref(),
            Expectation::Revert(revert) => revert.inputs.as_deref(),
        }
    }
}

impl ReadExpectation {
    /// Values the call returns.
    pub fn outputs(&self) -> &[Token] {
        &self.outputs
    }
}

impl RevertExpectation {
    /// Reason the call reverts with.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
