#![deny(missing_docs, unsafe_code)]

//! This crate declares the behaviour of mocked ethereum contracts.
//!
//! A mocked contract is a doppelganger: a contract that answers every call
//! with a response stored in it beforehand. This crate turns declarations
//! such as "`balanceOf(alice)` returns `100`" or "`transfer` reverts" into
//! those stored responses.
//!
//! Create a [`MockContract`] from the ABI of the contract to mock and an
//! [`Environment`] that stores responses. [`Web3Environment`] drives a
//! doppelganger deployed on a node, [`MemoryEnvironment`] emulates one in
//! process.
//!
//! # Example
//!
//! ```
//! # const ABI: &str = r#"[{
//! #     "type": "function",
//! #     "name": "balanceOf",
//! #     "stateMutability": "view",
//! #     "inputs": [{ "name": "owner", "type": "address" }],
//! #     "outputs": [{ "name": "", "type": "uint256" }]
//! # }]"#;
//! use doppelganger::tokens::Tokens;
//! use doppelganger::{Interface, MemoryEnvironment, MockContract};
//! use web3::types::{Address, U256};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # futures::executor::block_on(async {
//! let env = MemoryEnvironment::new();
//! let mut mock = MockContract::new(Interface::from_json(ABI)?, env.clone());
//!
//! let owner = Address::repeat_byte(0x42);
//! mock.stub("balanceOf")?
//!     .with_args((owner,))?
//!     .returns((U256::from(100),))?
//!     .commit()
//!     .await?;
//!
//! let balance_of = mock.function("balanceOf")?;
//! let returned = env.call(&balance_of.encode_input(&(owner,).into_tokens())?)?;
//! let (balance,) = <(U256,)>::from_tokens(balance_of.decode_output(&returned)?)?;
//! assert_eq!(balance, U256::from(100));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # })
//! # }
//! ```
//!
//! # Ordering
//!
//! Several responses can be declared for the same call. The first response
//! ever installed on a mock becomes the default response of its call; every
//! later response is queued. A call is answered with its current response,
//! which then advances to the oldest queued one. The last response keeps
//! being served once the queue is drained.
//!
//! Note that "first" is tracked per mock contract, not per function: only
//! the very first installed response, whatever its function, is a default.
//!
//! # Declaring expectations
//!
//! Use [`MockContract::stub`] for the fluent API, see [`Stub`], or build
//! [`Expectation`] values and pass them to [`MockContract::setup`].

use ethabi::Function;
use std::sync::Arc;

pub mod abi;
pub mod codec;
pub mod environment;
pub mod errors;
pub mod expectation;
pub mod hash;
mod install;
pub mod signature;
pub mod stub;
pub mod tokens;
pub mod utils;

#[cfg(test)]
mod test;

pub use crate::abi::{FunctionExt, Interface};
pub use crate::environment::{
    Environment, MemoryEnvironment, TransactionDefaults, Web3Environment,
};
pub use crate::errors::{CallError, EncodingError, EnvironmentError, ExpectationError};
pub use crate::expectation::Expectation;
pub use crate::install::Installer;
pub use crate::signature::AddressKey;
pub use crate::stub::{ReceiveStub, Stub, DEFAULT_REVERT_REASON};

/// A mocked contract.
///
/// Owns one [`Stub`] per function of the interface and one [`ReceiveStub`]
/// for plain value transfers. All of them install through the same
/// [`Installer`], so they share the mock's default/queue history.
pub struct MockContract<E> {
    interface: Arc<Interface>,
    installer: Installer<E>,
    stubs: Vec<Stub<E>>,
    receive: ReceiveStub<E>,
}

impl<E: Environment> MockContract<E> {
    /// Creates a mock for `interface` whose responses are stored in
    /// `environment`. The environment must not have been used by another
    /// mock before.
    pub fn new(interface: Interface, environment: E) -> Self {
        let interface = Arc::new(interface);
        let installer = Installer::new(interface.clone(), Arc::new(environment));
        let stubs = interface
            .functions()
            .map(|function| Stub::new(installer.clone(), function.clone()))
            .collect();
        let receive = ReceiveStub::new(installer.clone());

        MockContract {
            interface,
            installer,
            stubs,
            receive,
        }
    }

    /// Returns the mocked interface.
    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// Returns the environment that stores this mock's responses.
    pub fn environment(&self) -> &E {
        self.installer.environment()
    }

    /// Returns the descriptor of a function, looked up by name or signature.
    pub fn function(&self, name_or_signature: &str) -> Result<Arc<Function>, ExpectationError> {
        self.interface.function(name_or_signature).cloned()
    }

    /// Returns the stub of a function, looked up by bare name or, for
    /// overloaded functions, by signature such as `approve(address)`.
    pub fn stub(&mut self, name_or_signature: &str) -> Result<&mut Stub<E>, ExpectationError> {
        let index = self.interface.index_of(name_or_signature)?;
        Ok(&mut self.stubs[index])
    }

    /// Returns the stub for plain value transfers.
    pub fn receive(&mut self) -> &mut ReceiveStub<E> {
        &mut self.receive
    }

    /// Installs expectations in the given order.
    pub async fn setup(&self, expectations: &[Expectation]) -> Result<(), ExpectationError> {
        self.installer.install(expectations).await
    }
}

impl<E> std::fmt::Debug for MockContract<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockContract")
            .field("functions", &self.stubs.len())
            .field("installer", &self.installer)
            .finish()
    }
}
