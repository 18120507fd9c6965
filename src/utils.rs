//! Convenience utilities for tests.

use crate::hash::keccak256;
use web3::types::Address;

/// Generate an address by hashing the given string.
///
/// The same name always yields the same address, which keeps test
/// expectations readable.
///
/// # Examples
///
/// ```
/// # use doppelganger::utils::address_for;
/// let alice = address_for("Alice");
/// assert_eq!(alice, address_for("Alice"));
/// assert_ne!(alice, address_for("Bob"));
/// ```
pub fn address_for(who: &str) -> Address {
    Address::from_slice(&keccak256(who.as_bytes())[12..])
}

/// Shortcut for [`address_for`]`("Alice")`.
pub fn address() -> Address {
    address_for("Alice")
}
