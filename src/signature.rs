//! Addressing of expectations inside the execution environment.
//!
//! An expectation declared without arguments is stored under the function
//! selector and matches any call to the function. An expectation declared
//! with arguments is stored under the complete call data and only matches
//! that exact call. Both can coexist for the same function.

use crate::abi::{FunctionExt, Interface};
use crate::errors::{EncodingError, ExpectationError};
use crate::hash::H32;
use ethabi::{Function, ParamType, Token};
use std::fmt;

/// Key under which an expectation is stored by the execution environment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AddressKey {
    /// Function selector, matches calls with any arguments.
    Selector(H32),
    /// Selector followed by the ABI-encoded arguments.
    Calldata(Vec<u8>),
}

impl AddressKey {
    /// Raw key bytes as stored by the execution environment.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AddressKey::Selector(selector) => selector,
            AddressKey::Calldata(data) => data,
        }
    }

    /// Returns the function selector this key starts with.
    pub fn selector(&self) -> H32 {
        let mut selector = H32::default();
        selector.copy_from_slice(&self.as_bytes()[..4]);
        selector
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.as_bytes()))
    }
}

/// Derives the key for `function`, optionally narrowed to the given
/// argument values.
///
/// The function must be declared by `interface`.
pub fn resolve(
    interface: &Interface,
    function: &Function,
    inputs: Option<&[Token]>,
) -> Result<AddressKey, ExpectationError> {
    if !interface.contains(function) {
        return Err(ExpectationError::Resolution(format!(
            "could not find function selector for {}",
            function.human_readable()
        )));
    }

    match inputs {
        None => Ok(AddressKey::Selector(function.selector())),
        Some(inputs) => encode_input(function, inputs).map(AddressKey::Calldata),
    }
}

/// Encodes call data, annotating failures with the function signature.
pub(crate) fn encode_input(function: &Function, inputs: &[Token]) -> Result<Vec<u8>, ExpectationError> {
    let types = function
        .inputs
        .iter()
        .map(|param| param.kind.clone())
        .collect::<Vec<_>>();
    check_types(function, &types, inputs)?;
    function
        .encode_input(inputs)
        .map_err(|err| ExpectationError::encoding(function.human_readable(), err))
}

/// Checks values against parameter types, reporting arity mismatches
/// separately from type mismatches.
pub(crate) fn check_types(
    function: &Function,
    types: &[ParamType],
    values: &[Token],
) -> Result<(), ExpectationError> {
    if types.len() != values.len() {
        return Err(ExpectationError::encoding(
            function.human_readable(),
            EncodingError::Arity {
                expected: types.len(),
                actual: values.len(),
            },
        ));
    }
    let conforms = Token::types_check(values, types)
        && values.iter().zip(types).all(|(value, kind)| in_range(value, kind));
    if !conforms {
        return Err(ExpectationError::encoding(
            function.human_readable(),
            EncodingError::Types {
                values: format!("{:?}", values),
                types: types
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            },
        ));
    }
    Ok(())
}

/// Checks the value ranges that `Token::types_check` leaves out: integer
/// widths and fixed bytes lengths, down through arrays and tuples.
fn in_range(value: &Token, kind: &ParamType) -> bool {
    match (value, kind) {
        (Token::Uint(value), ParamType::Uint(bits)) => value.bits() <= *bits,
        (Token::Int(value), ParamType::Int(bits)) => {
            // Two's complement: the magnitude of a negative value is `!value`,
            // and either one must leave room for the sign bit.
            let magnitude = if value.bit(255) { !*value } else { *value };
            *bits >= 256 || magnitude.bits() < *bits
        }
        (Token::FixedBytes(bytes), ParamType::FixedBytes(len)) => bytes.len() == *len,
        (Token::Array(values), ParamType::Array(kind))
        | (Token::FixedArray(values), ParamType::FixedArray(kind, _)) => {
            values.iter().all(|value| in_range(value, kind))
        }
        (Token::Tuple(values), ParamType::Tuple(kinds)) => values
            .iter()
            .zip(kinds)
            .all(|(value, kind)| in_range(value, kind)),
        _ => true,
    }
}
