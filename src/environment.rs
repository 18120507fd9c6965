//! The execution environment that stores installed expectations and serves
//! them when the mocked contract is invoked.

use crate::errors::EnvironmentError;
use crate::signature::AddressKey;
use futures::future::BoxFuture;

mod memory;
mod node;

pub use self::memory::MemoryEnvironment;
pub use self::node::{TransactionDefaults, Web3Environment};

/// Future returned by every environment primitive.
pub type EnvironmentFuture<'a> = BoxFuture<'a, Result<(), EnvironmentError>>;

/// Storage primitives of a doppelganger contract.
///
/// For every address key the environment keeps a default response and a
/// FIFO queue of further responses. Each primitive is a round-trip that must
/// complete before the next one is started, since queue order is
/// significant.
pub trait Environment: Send + Sync {
    /// Sets the default response for `key` to a successful return of
    /// `payload`.
    fn set_default_return(&self, key: AddressKey, payload: Vec<u8>) -> EnvironmentFuture<'_>;

    /// Queues a successful return of `payload` for `key`.
    fn queue_return(&self, key: AddressKey, payload: Vec<u8>) -> EnvironmentFuture<'_>;

    /// Sets the default response for `key` to a revert with `reason`.
    fn set_default_revert(&self, key: AddressKey, reason: String) -> EnvironmentFuture<'_>;

    /// Queues a revert with `reason` for `key`.
    fn queue_revert(&self, key: AddressKey, reason: String) -> EnvironmentFuture<'_>;

    /// Makes plain value transfers to the contract revert with `reason`.
    fn set_transfer_reject(&self, reason: String) -> EnvironmentFuture<'_>;
}
