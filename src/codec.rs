//! Encoding of declared return values.

use crate::abi::FunctionExt;
use crate::errors::ExpectationError;
use crate::signature::check_types;
use ethabi::{Function, Token};

/// Encodes `outputs` as the return data of `function`.
///
/// The values must match the function's output types one to one. An empty
/// output list encodes to an empty payload.
pub fn encode_output(function: &Function, outputs: &[Token]) -> Result<Vec<u8>, ExpectationError> {
    let types = function
        .outputs
        .iter()
        .map(|param| param.kind.clone())
        .collect::<Vec<_>>();
    check_types(function, &types, outputs)?;
    Ok(ethabi::encode(outputs))
}

/// Decodes return data of `function`, the inverse of [`encode_output`].
pub fn decode_output(function: &Function, data: &[u8]) -> Result<Vec<Token>, ExpectationError> {
    function
        .decode_output(data)
        .map_err(|err| ExpectationError::encoding(function.human_readable(), err))
}

/// Payload returned by calls that were merely accepted.
pub fn empty_payload() -> Vec<u8> {
    Vec::new()
}
