//! Installation of expectations into an execution environment.

use crate::abi::Interface;
use crate::codec;
use crate::environment::Environment;
use crate::errors::ExpectationError;
use crate::expectation::Expectation;
use crate::signature::{self, AddressKey};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Installs batches of expectations for one mocked contract.
///
/// The very first response ever installed through an installer becomes the
/// default response for its key. Every later response, whatever its key, is
/// queued behind the defaults. The flag tracking this is shared by all
/// clones, so every stub of a mock contract observes the same history.
pub struct Installer<E> {
    interface: Arc<Interface>,
    environment: Arc<E>,
    first_call: Arc<AtomicBool>,
}

/// A resolved and encoded expectation, ready to be sent.
#[derive(Debug)]
enum Install {
    Return { key: AddressKey, payload: Vec<u8> },
    Revert { key: AddressKey, reason: String },
}

impl<E: Environment> Installer<E> {
    /// Creates an installer for a freshly deployed mock.
    pub fn new(interface: Arc<Interface>, environment: Arc<E>) -> Self {
        Installer {
            interface,
            environment,
            first_call: Arc::new(AtomicBool::new(true)),
        }
    }

    /// The environment expectations are installed into.
    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Returns `true` until the first response was installed.
    pub fn is_pristine(&self) -> bool {
        self.first_call.load(Ordering::SeqCst)
    }

    /// Installs `expectations` in order.
    ///
    /// Every expectation of the batch is resolved and encoded before anything
    /// is sent, so an invalid declaration leaves the environment untouched.
    /// Environment failures, however, are not rolled back: responses
    /// installed before the failing one stay in place.
    pub async fn install(&self, expectations: &[Expectation]) -> Result<(), ExpectationError> {
        let installs = expectations
            .iter()
            .map(|expectation| self.prepare(expectation))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::trace!(count = installs.len(), "installing expectation batch");

        for install in installs {
            self.send(install).await?;
        }
        Ok(())
    }

    /// Makes plain value transfers revert with `reason`.
    pub async fn reject_transfers(&self, reason: String) -> Result<(), ExpectationError> {
        tracing::debug!(%reason, "rejecting plain transfers");
        self.environment.set_transfer_reject(reason).await?;
        Ok(())
    }

    fn prepare(&self, expectation: &Expectation) -> Result<Install, ExpectationError> {
        let key = signature::resolve(&self.interface, expectation.function(), expectation.inputs())?;
        Ok(match expectation {
            Expectation::Read(read) => Install::Return {
                key,
                payload: codec::encode_output(expectation.function(), read.outputs())?,
            },
            Expectation::Write(_) => Install::Return {
                key,
                payload: codec::empty_payload(),
            },
            Expectation::Revert(revert) => Install::Revert {
                key,
                reason: revert.reason().to_owned(),
            },
        })
    }

    async fn send(&self, install: Install) -> Result<(), ExpectationError> {
        let first = self.first_call.load(Ordering::SeqCst);
        match install {
            Install::Return { key, payload } => {
                tracing::debug!(%key, default = first, "installing return");
                if first {
                    self.environment.set_default_return(key, payload).await?;
                } else {
                    self.environment.queue_return(key, payload).await?;
                }
            }
            Install::Revert { key, reason } => {
                tracing::debug!(%key, default = first, %reason, "installing revert");
                if first {
                    self.environment.set_default_revert(key, reason).await?;
                } else {
                    self.environment.queue_revert(key, reason).await?;
                }
            }
        }
        self.first_call.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl<E> Clone for Installer<E> {
    fn clone(&self) -> Self {
        Installer {
            interface: self.interface.clone(),
            environment: self.environment.clone(),
            first_call: self.first_call.clone(),
        }
    }
}

impl<E> std::fmt::Debug for Installer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("first_call", &self.first_call.load(Ordering::SeqCst))
            .finish()
    }
}
