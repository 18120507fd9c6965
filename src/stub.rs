//! Fluent declaration of expectations.
//!
//! A [`Stub`] accumulates one declaration chain for a single function and
//! installs it as one batch on [`Stub::commit`]:
//!
//! ```text
//! mock.stub("balanceOf")?
//!     .with_args((owner,))?
//!     .returns((U256::from(100),))?
//!     .commit()
//!     .await?;
//! ```

use crate::abi::FunctionExt;
use crate::codec;
use crate::environment::Environment;
use crate::errors::{EncodingError, ExpectationError};
use crate::expectation::Expectation;
use crate::install::Installer;
use crate::signature;
use crate::tokens::Tokens;
use ethabi::{Function, Token};
use std::sync::Arc;

/// Reason used by [`Stub::reverts`] and [`ReceiveStub::reverts`].
pub const DEFAULT_REVERT_REASON: &str = "Mock revert";

/// Chainable expectation builder for one function of a mocked contract.
///
/// Rules of a declaration chain:
///
/// - [`with_args`] can be called at most once;
/// - [`returns`] can be called several times to queue several responses;
/// - a revert must be the last outcome of the chain.
///
/// Breaking a rule fails with [`ExpectationError::Sequence`] and discards
/// the chain. Nothing reaches the environment until [`commit`], after which
/// the stub is empty again and ready for the next declaration.
///
/// [`with_args`]: Stub::with_args
/// [`returns`]: Stub::returns
/// [`commit`]: Stub::commit
pub struct Stub<E> {
    installer: Installer<E>,
    function: Arc<Function>,
    pending: Vec<Expectation>,
    inputs: Option<Vec<Token>>,
    revert_set: bool,
    args_set: bool,
}

impl<E: Environment> Stub<E> {
    pub(crate) fn new(installer: Installer<E>, function: Arc<Function>) -> Self {
        Stub {
            installer,
            function,
            pending: Vec::new(),
            inputs: None,
            revert_set: false,
            args_set: false,
        }
    }

    /// The function this stub declares expectations for.
    pub fn function(&self) -> &Arc<Function> {
        &self.function
    }

    /// Expectations declared since the last commit.
    pub fn pending(&self) -> &[Expectation] {
        &self.pending
    }

    /// Narrows the following outcomes to calls with exactly these arguments.
    pub fn with_args(&mut self, args: impl Tokens) -> Result<&mut Self, ExpectationError> {
        if self.args_set {
            return Err(self.fail(ExpectationError::sequence(
                "withArgs can be called only once",
            )));
        }
        let args = args.into_tokens();
        if let Err(err) = signature::encode_input(&self.function, &args) {
            return Err(self.fail(err));
        }
        self.inputs = Some(args);
        self.args_set = true;
        Ok(self)
    }

    /// Declares that the call returns `values`.
    ///
    /// On a function without outputs, an empty tuple declares that the call
    /// is accepted.
    pub fn returns(&mut self, values: impl Tokens) -> Result<&mut Self, ExpectationError> {
        if self.revert_set {
            return Err(self.fail(ExpectationError::sequence("Revert must be the last call")));
        }
        let values = values.into_tokens();

        let expectation = if self.function.outputs.is_empty() {
            if !values.is_empty() {
                let err = ExpectationError::encoding(
                    self.function.human_readable(),
                    EncodingError::NoOutputs,
                );
                return Err(self.fail(err));
            }
            Expectation::write(self.function.clone())
        } else {
            if let Err(err) = codec::encode_output(&self.function, &values) {
                return Err(self.fail(err));
            }
            Expectation::read(self.function.clone(), values)?
        };

        self.pending
            .push(expectation.with_optional_inputs(self.inputs.clone()));
        Ok(self)
    }

    /// Declares that the call reverts with [`DEFAULT_REVERT_REASON`].
    pub fn reverts(&mut self) -> Result<&mut Self, ExpectationError> {
        self.reverts_with_reason(DEFAULT_REVERT_REASON)
    }

    /// Declares that the call reverts with `reason`.
    pub fn reverts_with_reason(
        &mut self,
        reason: impl Into<String>,
    ) -> Result<&mut Self, ExpectationError> {
        if self.revert_set {
            return Err(self.fail(ExpectationError::sequence("Revert must be the last call")));
        }
        let expectation = Expectation::revert_with_reason(self.function.clone(), reason);
        self.pending
            .push(expectation.with_optional_inputs(self.inputs.clone()));
        self.revert_set = true;
        Ok(self)
    }

    /// Installs the declared chain as one batch.
    ///
    /// Arguments set without any outcome declare that exactly that call is
    /// accepted. The stub is reset whether or not the installation succeeds.
    pub async fn commit(&mut self) -> Result<(), ExpectationError> {
        if self.args_set && self.pending.is_empty() {
            let accept = Expectation::write(self.function.clone());
            self.pending
                .push(accept.with_optional_inputs(self.inputs.clone()));
        }

        let pending = std::mem::take(&mut self.pending);
        self.reset();
        self.installer.install(&pending).await
    }

    fn fail(&mut self, err: ExpectationError) -> ExpectationError {
        self.pending.clear();
        self.reset();
        err
    }

    fn reset(&mut self) {
        self.inputs = None;
        self.revert_set = false;
        self.args_set = false;
    }
}

impl<E> std::fmt::Debug for Stub<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stub")
            .field("function", &self.function.abi_signature())
            .field("pending", &self.pending.len())
            .field("revert_set", &self.revert_set)
            .field("args_set", &self.args_set)
            .finish()
    }
}

/// Stub for plain value transfers to the mocked contract.
///
/// Transfers carry no call data and return nothing, so only reverts can be
/// declared. They take effect immediately instead of being batched.
pub struct ReceiveStub<E> {
    installer: Installer<E>,
}

impl<E: Environment> ReceiveStub<E> {
    pub(crate) fn new(installer: Installer<E>) -> Self {
        ReceiveStub { installer }
    }

    /// Always fails: plain transfers have no return value.
    pub fn returns(&mut self, _: impl Tokens) -> Result<&mut Self, ExpectationError> {
        Err(ExpectationError::Unsupported(
            "Receive function return is not implemented.",
        ))
    }

    /// Always fails: plain transfers have no arguments.
    pub fn with_args(&mut self, _: impl Tokens) -> Result<&mut Self, ExpectationError> {
        Err(ExpectationError::Unsupported(
            "Receive function return is not implemented.",
        ))
    }

    /// Makes plain transfers revert with [`DEFAULT_REVERT_REASON`].
    pub async fn reverts(&self) -> Result<(), ExpectationError> {
        self.reverts_with_reason(DEFAULT_REVERT_REASON).await
    }

    /// Makes plain transfers revert with `reason`.
    pub async fn reverts_with_reason(&self, reason: impl Into<String>) -> Result<(), ExpectationError> {
        self.installer.reject_transfers(reason.into()).await
    }
}

impl<E> std::fmt::Debug for ReceiveStub<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ReceiveStub")
    }
}
