//! Interface descriptions and extensions to the `ethabi` API.

use crate::errors::ExpectationError;
use crate::hash::{self, H32};
use ethabi::{Contract, Function, StateMutability};
use std::collections::HashMap;
use std::sync::Arc;

/// Extension trait for `ethabi::Function`.
pub trait FunctionExt {
    /// Compute the method signature in the standard ABI format,
    /// e.g. `transfer(address,uint256)`.
    fn abi_signature(&self) -> String;

    /// Compute the Keccak256 function selector used by contract ABIs.
    fn selector(&self) -> H32;

    /// Format the function in the minimal human-readable form,
    /// e.g. `function balanceOf(address) view returns (uint256)`.
    fn human_readable(&self) -> String;

    /// Returns `true` if calling this function can't change contract state.
    fn is_read_only(&self) -> bool;
}

impl FunctionExt for Function {
    fn abi_signature(&self) -> String {
        format!(
            "{}({})",
            self.name,
            self.inputs
                .iter()
                .map(|input| input.kind.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    fn selector(&self) -> H32 {
        hash::function_selector(self.abi_signature())
    }

    fn human_readable(&self) -> String {
        let mut formatted = format!("function {}", self.abi_signature());
        match self.state_mutability {
            StateMutability::Pure => formatted.push_str(" pure"),
            StateMutability::View => formatted.push_str(" view"),
            StateMutability::Payable => formatted.push_str(" payable"),
            StateMutability::NonPayable => {}
        }
        if !self.outputs.is_empty() {
            let outputs = self
                .outputs
                .iter()
                .map(|output| output.kind.to_string())
                .collect::<Vec<_>>()
                .join(",");
            formatted.push_str(&format!(" returns ({})", outputs));
        }
        formatted
    }

    fn is_read_only(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::Pure | StateMutability::View
        )
    }
}

/// A parsed contract interface.
///
/// Function descriptors are parsed once and shared by reference with every
/// expectation that refers to them.
#[derive(Clone, Debug)]
pub struct Interface {
    functions: Vec<Arc<Function>>,
    by_signature: HashMap<String, usize>,
    by_name: HashMap<String, Vec<usize>>,
    receive: bool,
}

impl Interface {
    /// Parses an interface from its JSON ABI.
    pub fn from_json(json: &str) -> Result<Self, ExpectationError> {
        let contract = serde_json::from_str::<Contract>(json)
            .map_err(|err| ExpectationError::Resolution(format!("invalid ABI: {}", err)))?;
        Ok(Interface::new(&contract))
    }

    /// Creates an interface from an already parsed `ethabi` contract.
    pub fn new(contract: &Contract) -> Self {
        let mut interface = Interface {
            functions: Vec::new(),
            by_signature: HashMap::new(),
            by_name: HashMap::new(),
            receive: contract.receive,
        };

        for function in contract.functions() {
            let index = interface.functions.len();
            interface
                .by_signature
                .insert(function.abi_signature(), index);
            interface
                .by_name
                .entry(function.name.clone())
                .or_default()
                .push(index);
            interface.functions.push(Arc::new(function.clone()));
        }

        interface
    }

    /// Iterates over all function descriptors, ordered by name.
    pub fn functions(&self) -> impl Iterator<Item = &Arc<Function>> {
        self.functions.iter()
    }

    /// Returns `true` if the ABI declares a `receive` function.
    pub fn has_receive(&self) -> bool {
        self.receive
    }

    /// Looks up a function either by its canonical signature, or by its bare
    /// name if that name is not overloaded.
    pub fn function(&self, name_or_signature: &str) -> Result<&Arc<Function>, ExpectationError> {
        self.index_of(name_or_signature)
            .map(|index| &self.functions[index])
    }

    /// Returns `true` if this interface declares a function with the same
    /// signature as `function`.
    pub fn contains(&self, function: &Function) -> bool {
        self.by_signature.contains_key(&function.abi_signature())
    }

    pub(crate) fn index_of(&self, name_or_signature: &str) -> Result<usize, ExpectationError> {
        if let Some(index) = self.by_signature.get(name_or_signature) {
            return Ok(*index);
        }
        match self.by_name.get(name_or_signature).map(Vec::as_slice) {
            Some([index]) => Ok(*index),
            Some(overloads) => Err(ExpectationError::Resolution(format!(
                "function '{}' is overloaded, use one of: {}",
                name_or_signature,
                overloads
                    .iter()
                    .map(|index| self.functions[*index].abi_signature())
                    .collect::<Vec<_>>()
                    .join(", "),
            ))),
            None => Err(ExpectationError::Resolution(format!(
                "function '{}' is not declared in the interface",
                name_or_signature
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const ERC20_ABI: &str = r#"[
        {
            "type": "function",
            "name": "balanceOf",
            "stateMutability": "view",
            "constant": true,
            "inputs": [{ "name": "owner", "type": "address" }],
            "outputs": [{ "name": "", "type": "uint256" }]
        },
        {
            "type": "function",
            "name": "decimals",
            "stateMutability": "view",
            "constant": true,
            "inputs": [],
            "outputs": [{ "name": "", "type": "uint8" }]
        },
        {
            "type": "function",
            "name": "transfer",
            "stateMutability": "nonpayable",
            "constant": false,
            "inputs": [
                { "name": "to", "type": "address" },
                { "name": "amount", "type": "uint256" }
            ],
            "outputs": []
        },
        {
            "type": "function",
            "name": "approve",
            "stateMutability": "nonpayable",
            "constant": false,
            "inputs": [
                { "name": "spender", "type": "address" },
                { "name": "amount", "type": "uint256" }
            ],
            "outputs": [{ "name": "", "type": "bool" }]
        },
        {
            "type": "function",
            "name": "approve",
            "stateMutability": "nonpayable",
            "constant": false,
            "inputs": [{ "name": "spender", "type": "address" }],
            "outputs": [{ "name": "", "type": "bool" }]
        },
        {
            "type": "event",
            "name": "Transfer",
            "inputs": [
                { "name": "from", "type": "address", "indexed": true },
                { "name": "to", "type": "address", "indexed": true },
                { "name": "value", "type": "uint256", "indexed": false }
            ],
            "anonymous": false
        }
    ]"#;

    pub(crate) fn erc20() -> Interface {
        Interface::from_json(ERC20_ABI).expect("valid ERC20 ABI")
    }

    #[test]
    fn format_function_signatures() {
        let interface = erc20();
        let balance_of = interface.function("balanceOf").unwrap();
        assert_eq!(balance_of.abi_signature(), "balanceOf(address)");
        assert_eq!(
            balance_of.human_readable(),
            "function balanceOf(address) view returns (uint256)"
        );
        assert!(balance_of.is_read_only());

        let transfer = interface.function("transfer").unwrap();
        assert_eq!(
            transfer.human_readable(),
            "function transfer(address,uint256)"
        );
        assert!(!transfer.is_read_only());
    }

    #[test]
    fn functions_skip_events() {
        assert_eq!(erc20().functions().count(), 5);
    }

    #[test]
    fn overloads_require_a_signature() {
        let interface = erc20();
        assert!(matches!(
            interface.function("approve"),
            Err(ExpectationError::Resolution(_))
        ));
        let approve = interface.function("approve(address)").unwrap();
        assert_eq!(approve.inputs.len(), 1);
    }

    #[test]
    fn unknown_function() {
        let err = erc20().function("mint").unwrap_err();
        assert!(err.to_string().contains("'mint' is not declared"));
    }

    #[test]
    fn invalid_json() {
        assert!(Interface::from_json("{").is_err());
    }
}
