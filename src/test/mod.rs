//! End-to-end tests: expectations are declared through the public API and
//! the mocked contract is then invoked through the in-memory doppelganger.

use crate::abi::tests::ERC20_ABI;
use crate::tokens::Tokens;
use crate::utils::*;
use crate::*;
use ethabi::Token;
use web3::types::{Address, U256};


type Result = std::result::Result<(), Box<dyn std::error::Error>>;

fn deploy() -> (MockContract<MemoryEnvironment>, MemoryEnvironment) {
    let env = MemoryEnvironment::new();
    let interface = Interface::from_json(ERC20_ABI).expect("valid ERC20 ABI");
    (MockContract::new(interface, env.clone()), env)
}

/// Invokes `name` on the mock and decodes its return values.
fn invoke<R: Tokens>(
    mock: &MockContract<MemoryEnvironment>,
    name: &str,
    args: impl Tokens,
) -> std::result::Result<R, CallError> {
    let function = mock.function(name).expect("function exists");
    let data = function
        .encode_input(&args.into_tokens())
        .expect("valid arguments");
    let returned = mock.environment().call(&data)?;
    let tokens = function.decode_output(&returned).expect("valid return data");
    Ok(R::from_tokens(tokens).expect("expected return types"))
}

#[test]
fn uninitialized_method_fails() {
    let (mock, _) = deploy();
    let err = invoke::<(U256,)>(&mock, "balanceOf", (Address::zero(),)).unwrap_err();
    assert!(err
        .to_string()
        .to_lowercase()
        .contains("mock on the method is not initialized"));
}

#[tokio::test]
async fn general_test() -> Result {
    let (mut mock, env) = deploy();
    let alice = address_for("Alice");
    let bob = address_for("Bob");

    mock.stub("balanceOf")?
        .with_args((alice,))?
        .returns((U256::from(100),))?
        .commit()
        .await?;
    mock.stub("balanceOf")?
        .returns((U256::from(7),))?
        .commit()
        .await?;
    mock.stub("decimals")?.returns((18u8,))?.commit().await?;
    mock.stub("transfer")?
        .with_args((bob, U256::from(5)))?
        .commit()
        .await?;
    mock.stub("transfer")?
        .with_args((alice, U256::from(5)))?
        .reverts_with_reason("self transfer")?
        .commit()
        .await?;
    mock.receive().reverts().await?;

    assert_eq!(invoke::<(U256,)>(&mock, "balanceOf", (alice,))?, (U256::from(100),));
    assert_eq!(invoke::<(U256,)>(&mock, "balanceOf", (bob,))?, (U256::from(7),));
    assert_eq!(invoke::<(u8,)>(&mock, "decimals", ())?, (18,));
    invoke::<()>(&mock, "transfer", (bob, U256::from(5)))?;
    assert_eq!(
        invoke::<()>(&mock, "transfer", (alice, U256::from(5))),
        Err(CallError::Revert("self transfer".into()))
    );
    assert_eq!(
        invoke::<()>(&mock, "transfer", (bob, U256::from(6))),
        Err(CallError::NotInitialized)
    );
    assert_eq!(
        env.call(&[]),
        Err(CallError::Revert(DEFAULT_REVERT_REASON.into()))
    );

    Ok(())
}

#[tokio::test]
async fn setup_and_stubs_share_history() -> Result {
    let (mut mock, _) = deploy();
    let balance_of = mock.function("balanceOf")?;

    mock.setup(&[Expectation::read(balance_of, (U256::from(1),))?])
        .await?;
    assert!(!mock.installer.is_pristine());

    // Queued, not a default, even though it's the first `decimals` response.
    mock.stub("decimals")?.returns((6u8,))?.commit().await?;
    assert_eq!(invoke::<(u8,)>(&mock, "decimals", ())?, (6,));
    assert_eq!(invoke::<(U256,)>(&mock, "balanceOf", (address(),))?, (U256::from(1),));

    Ok(())
}

#[test]
fn raw_tokens_are_accepted() {
    let (mut mock, _) = deploy();
    let stub = mock.stub("transfer(address,uint256)").unwrap();
    stub.with_args(vec![Token::Address(Address::zero()), Token::Uint(1.into())])
        .unwrap();
    assert!(stub.pending().is_empty());
}

#[test]
fn overloaded_stub_needs_signature() {
    let (mut mock, _) = deploy();
    assert!(matches!(
        mock.stub("approve"),
        Err(ExpectationError::Resolution(_))
    ));
    let stub = mock.stub("approve(address,uint256)").unwrap();
    assert_eq!(stub.function().inputs.len(), 2);
    assert!(matches!(
        mock.stub("mint"),
        Err(ExpectationError::Resolution(_))
    ));
}
