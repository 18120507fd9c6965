//! Doppelganger contract deployed on a node, driven through a `web3`
//! transport.

use super::{Environment, EnvironmentFuture};
use crate::hash::{self, H32};
use crate::signature::AddressKey;
use ethabi::Token;
use futures::FutureExt as _;
use lazy_static::lazy_static;
use web3::types::{Address, Bytes, TransactionRequest, U256};
use web3::{Transport, Web3};

lazy_static! {
    static ref MOCK_RETURNS: H32 = hash::function_selector("__doppelganger__mockReturns(bytes,bytes)");
    static ref QUEUE_RETURN: H32 = hash::function_selector("__doppelganger__queueReturn(bytes,bytes)");
    static ref MOCK_REVERTS: H32 = hash::function_selector("__doppelganger__mockReverts(bytes,string)");
    static ref QUEUE_REVERT: H32 = hash::function_selector("__doppelganger__queueRevert(bytes,string)");
    static ref RECEIVE_REVERTS: H32 = hash::function_selector("__doppelganger__receiveReverts(string)");
}

/// Parameters applied to every transaction sent to the doppelganger.
#[derive(Clone, Debug, Default)]
pub struct TransactionDefaults {
    /// Account that sends the transactions. The node must be able to sign
    /// for it.
    pub from: Address,
    /// Gas limit, estimated by the node when unset.
    pub gas: Option<U256>,
    /// Gas price, chosen by the node when unset.
    pub gas_price: Option<U256>,
}

/// Execution environment backed by a deployed doppelganger contract.
///
/// Every primitive is a single `eth_sendTransaction` calling one of the
/// contract's `__doppelganger__*` administration functions.
#[derive(Clone, Debug)]
pub struct Web3Environment<T: Transport> {
    web3: Web3<T>,
    address: Address,
    defaults: TransactionDefaults,
}

impl<T: Transport> Web3Environment<T> {
    /// Creates an environment for the doppelganger at `address`.
    pub fn new(web3: Web3<T>, address: Address, defaults: TransactionDefaults) -> Self {
        Web3Environment {
            web3,
            address,
            defaults,
        }
    }

    /// Address of the doppelganger contract.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Returns a mutable reference to the transaction defaults.
    pub fn defaults_mut(&mut self) -> &mut TransactionDefaults {
        &mut self.defaults
    }
}

impl<T> Web3Environment<T>
where
    T: Transport + Send + Sync,
    T::Out: Send,
{
    fn send(&self, selector: H32, params: &[Token]) -> EnvironmentFuture<'_> {
        let mut data = selector.to_vec();
        data.extend(ethabi::encode(params));
        let request = TransactionRequest {
            from: self.defaults.from,
            to: Some(self.address),
            gas: self.defaults.gas,
            gas_price: self.defaults.gas_price,
            data: Some(Bytes(data)),
            ..Default::default()
        };

        let eth = self.web3.eth();
        async move {
            let hash = eth.send_transaction(request).await?;
            tracing::trace!(?hash, "doppelganger transaction sent");
            Ok(())
        }
        .boxed()
    }
}

impl<T> Environment for Web3Environment<T>
where
    T: Transport + Send + Sync,
    T::Out: Send,
{
    fn set_default_return(&self, key: AddressKey, payload: Vec<u8>) -> EnvironmentFuture<'_> {
        self.send(
            *MOCK_RETURNS,
            &[Token::Bytes(key.as_bytes().to_vec()), Token::Bytes(payload)],
        )
    }

    fn queue_return(&self, key: AddressKey, payload: Vec<u8>) -> EnvironmentFuture<'_> {
        self.send(
            *QUEUE_RETURN,
            &[Token::Bytes(key.as_bytes().to_vec()), Token::Bytes(payload)],
        )
    }

    fn set_default_revert(&self, key: AddressKey, reason: String) -> EnvironmentFuture<'_> {
        self.send(
            *MOCK_REVERTS,
            &[Token::Bytes(key.as_bytes().to_vec()), Token::String(reason)],
        )
    }

    fn queue_revert(&self, key: AddressKey, reason: String) -> EnvironmentFuture<'_> {
        self.send(
            *QUEUE_REVERT,
            &[Token::Bytes(key.as_bytes().to_vec()), Token::String(reason)],
        )
    }

    fn set_transfer_reject(&self, reason: String) -> EnvironmentFuture<'_> {
        self.send(*RECEIVE_REVERTS, &[Token::String(reason)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EnvironmentError;
    use crate::test::transport::TestTransport;
    use serde_json::json;

    const TX_HASH: &str = "0x000000000000000000000000000000000000000000000000000000000000002a";

    fn environment(transport: &TestTransport) -> Web3Environment<TestTransport> {
        Web3Environment::new(
            Web3::new(transport.clone()),
            Address::repeat_byte(0xdd),
            TransactionDefaults {
                from: Address::repeat_byte(0xaa),
                gas: Some(100_000.into()),
                gas_price: None,
            },
        )
    }

    #[tokio::test]
    async fn set_default_return_sends_admin_transaction() {
        let mut transport = TestTransport::new();
        let env = environment(&transport);

        transport.add_response(json!(TX_HASH));
        env.set_default_return(AddressKey::Selector([0x70, 0xa0, 0x82, 0x31]), vec![0x01])
            .await
            .unwrap();

        let mut data = MOCK_RETURNS.to_vec();
        data.extend(ethabi::encode(&[
            Token::Bytes(vec![0x70, 0xa0, 0x82, 0x31]),
            Token::Bytes(vec![0x01]),
        ]));
        let params = transport.pop_request("eth_sendTransaction");
        let request = &params[0];
        assert_eq!(request["from"], json!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert_eq!(request["to"], json!("0xdddddddddddddddddddddddddddddddddddddddd"));
        assert_eq!(request["gas"], json!("0x186a0"));
        assert_eq!(request["data"], json!(format!("0x{}", hex::encode(data))));
        transport.assert_no_more_requests();
    }

    #[tokio::test]
    async fn transfer_reject_encodes_reason() {
        let mut transport = TestTransport::new();
        let env = environment(&transport);

        transport.add_response(json!(TX_HASH));
        env.set_transfer_reject("Mock revert".into()).await.unwrap();

        let mut data = RECEIVE_REVERTS.to_vec();
        data.extend(ethabi::encode(&[Token::String("Mock revert".into())]));
        let params = transport.pop_request("eth_sendTransaction");
        assert_eq!(params[0]["data"], json!(format!("0x{}", hex::encode(data))));
        transport.assert_no_more_requests();
    }

    #[tokio::test]
    async fn transport_failure_is_passed_through() {
        let transport = TestTransport::new();
        let env = environment(&transport);

        let err = env
            .queue_revert(AddressKey::Selector([0; 4]), String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::Web3(_)));
    }

    #[test]
    fn admin_selectors_are_distinct() {
        assert_ne!(*MOCK_RETURNS, *QUEUE_RETURN);
        assert_ne!(*MOCK_REVERTS, *QUEUE_REVERT);
    }
}
