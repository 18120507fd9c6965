//! Keccak256 hashing and function selectors.

use tiny_keccak::{Hasher, Keccak};

/// A 4-byte function selector.
pub type H32 = [u8; 4];

/// Perform a Keccak256 hash of data and return its 32-byte result.
pub fn keccak256<B>(data: B) -> [u8; 32]
where
    B: AsRef<[u8]>,
{
    let mut output = [0u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(data.as_ref());
    hasher.finalize(&mut output);
    output
}

/// Calculate the selector for a canonical function signature such as
/// `balanceOf(address)`. This is the first 4 bytes of its Keccak256 hash.
pub fn function_selector<S>(signature: S) -> H32
where
    S: AsRef<str>,
{
    let hash = keccak256(signature.as_ref());
    let mut selector = H32::default();
    selector.copy_from_slice(&hash[0..4]);
    selector
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            keccak256([]),
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"),
        );
    }

    #[test]
    fn erc20_selectors() {
        assert_eq!(function_selector("balanceOf(address)"), hex!("70a08231"));
        assert_eq!(function_selector("transfer(address,uint256)"), hex!("a9059cbb"));
        assert_eq!(function_selector("decimals()"), hex!("313ce567"));
    }
}
