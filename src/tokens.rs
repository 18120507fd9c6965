//! Conversion between rust values and ABI tokens.
//!
//! Expectations store raw `ethabi` tokens. `Tokenize` maps a single rust
//! value to a single token and back, and `Tokens` maps a tuple of such values
//! to the token list of a parameter list, so that arguments and return
//! values can be declared as `(address, U256::from(100))`.

use ethabi::Token;
use std::convert::TryInto;
use web3::types::{Address, U256};

/// A tokenization related error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Token type doesn't match the rust type.
    #[error("expected a different token type")]
    TypeMismatch,
    /// Integer token doesn't fit in the rust type.
    #[error("abi integer does not fit rust integer")]
    IntegerMismatch,
    /// Fixed array token has the wrong number of elements.
    #[error("expected {expected} tokens in fixed array but got {actual}")]
    FixedArrayLengthMismatch {
        /// Array length.
        expected: usize,
        /// Number of tokens.
        actual: usize,
    },
    /// Token list has the wrong length for the tuple.
    #[error("expected {expected} tokens but got {actual}")]
    LengthMismatch {
        /// Tuple arity.
        expected: usize,
        /// Number of tokens.
        actual: usize,
    },
}

/// Rust type and single token conversion.
pub trait Tokenize {
    /// Convert token into Self.
    fn from_token(token: Token) -> Result<Self, Error>
    where
        Self: Sized;

    /// Convert self into token.
    fn into_token(self) -> Token;
}

impl Tokenize for Token {
    fn from_token(token: Token) -> Result<Self, Error> {
        Ok(token)
    }

    fn into_token(self) -> Token {
        self
    }
}

impl Tokenize for Vec<u8> {
    fn from_token(token: Token) -> Result<Self, Error> {
        match token {
            Token::Bytes(bytes) => Ok(bytes),
            _ => Err(Error::TypeMismatch),
        }
    }

    fn into_token(self) -> Token {
        Token::Bytes(self)
    }
}

impl Tokenize for String {
    fn from_token(token: Token) -> Result<Self, Error> {
        match token {
            Token::String(s) => Ok(s),
            _ => Err(Error::TypeMismatch),
        }
    }

    fn into_token(self) -> Token {
        Token::String(self)
    }
}

impl Tokenize for &'_ str {
    fn from_token(_: Token) -> Result<Self, Error> {
        Err(Error::TypeMismatch)
    }

    fn into_token(self) -> Token {
        Token::String(self.to_owned())
    }
}

impl Tokenize for Address {
    fn from_token(token: Token) -> Result<Self, Error> {
        match token {
            Token::Address(address) => Ok(address),
            _ => Err(Error::TypeMismatch),
        }
    }

    fn into_token(self) -> Token {
        Token::Address(self)
    }
}

impl Tokenize for U256 {
    fn from_token(token: Token) -> Result<Self, Error> {
        match token {
            Token::Uint(value) => Ok(value),
            _ => Err(Error::TypeMismatch),
        }
    }

    fn into_token(self) -> Token {
        Token::Uint(self)
    }
}

impl Tokenize for bool {
    fn from_token(token: Token) -> Result<Self, Error> {
        match token {
            Token::Bool(value) => Ok(value),
            _ => Err(Error::TypeMismatch),
        }
    }

    fn into_token(self) -> Token {
        Token::Bool(self)
    }
}

macro_rules! uint_tokenize {
    ($($int: ident),*) => {$(
        impl Tokenize for $int {
            fn from_token(token: Token) -> Result<Self, Error> {
                U256::from_token(token)?
                    .try_into()
                    .map_err(|_| Error::IntegerMismatch)
            }

            fn into_token(self) -> Token {
                Token::Uint(self.into())
            }
        }
    )*};
}

uint_tokenize!(u8, u16, u32, u64, u128);

// Signed values travel as two's complement `U256`s.
macro_rules! int_tokenize {
    ($($int: ident),*) => {$(
        impl Tokenize for $int {
            fn from_token(token: Token) -> Result<Self, Error> {
                let raw = match token {
                    Token::Int(raw) => raw,
                    _ => return Err(Error::TypeMismatch),
                };
                let negative = raw.bit(255);
                let magnitude = if negative { !raw } else { raw };
                if magnitude.bits() > 127 {
                    return Err(Error::IntegerMismatch);
                }
                let value = magnitude.as_u128() as i128;
                let value = if negative { !value } else { value };
                value.try_into().map_err(|_| Error::IntegerMismatch)
            }

            fn into_token(self) -> Token {
                let value = self as i128;
                if value < 0 {
                    Token::Int(!U256::from(!value as u128))
                } else {
                    Token::Int(U256::from(value as u128))
                }
            }
        }
    )*};
}

int_tokenize!(i8, i16, i32, i64, i128);

/// Marker for `Tokenize` types that can be elements of `Token::Array` and
/// `Token::FixedArray`. This is everything except `u8`, because `Vec<u8>`
/// and `[u8; N]` tokenize as bytes.
pub trait TokenizeArray: Tokenize {}

macro_rules! single_tokenize_array {
    ($($type: ty,)*) => {
        $(
            impl TokenizeArray for $type {}
        )*
    };
}

single_tokenize_array! {
    String, Address, U256, Vec<u8>, bool,
    i8, i16, i32, i64, i128, u16, u32, u64, u128,
}

impl<T: TokenizeArray> Tokenize for Vec<T> {
    fn from_token(token: Token) -> Result<Self, Error> {
        match token {
            Token::FixedArray(tokens) | Token::Array(tokens) => {
                tokens.into_iter().map(Tokenize::from_token).collect()
            }
            _ => Err(Error::TypeMismatch),
        }
    }

    fn into_token(self) -> Token {
        Token::Array(self.into_iter().map(Tokenize::into_token).collect())
    }
}

impl<T: TokenizeArray> TokenizeArray for Vec<T> {}

impl<T: TokenizeArray, const N: usize> Tokenize for [T; N] {
    fn from_token(token: Token) -> Result<Self, Error> {
        let tokens = match token {
            Token::FixedArray(tokens) => tokens,
            _ => return Err(Error::TypeMismatch),
        };
        if tokens.len() != N {
            return Err(Error::FixedArrayLengthMismatch {
                expected: N,
                actual: tokens.len(),
            });
        }
        let values = tokens
            .into_iter()
            .map(T::from_token)
            .collect::<Result<Vec<_>, _>>()?;
        values.try_into().map_err(|_| Error::FixedArrayLengthMismatch {
            expected: N,
            actual: N,
        })
    }

    fn into_token(self) -> Token {
        Token::FixedArray(self.into_iter().map(T::into_token).collect())
    }
}

impl<T: TokenizeArray, const N: usize> TokenizeArray for [T; N] {}

impl<const N: usize> Tokenize for [u8; N] {
    fn from_token(token: Token) -> Result<Self, Error> {
        match token {
            Token::FixedBytes(bytes) => bytes.try_into().map_err(|_| Error::TypeMismatch),
            _ => Err(Error::TypeMismatch),
        }
    }

    fn into_token(self) -> Token {
        Token::FixedBytes(self.to_vec())
    }
}

impl<const N: usize> TokenizeArray for [u8; N] {}

/// A parameter list: conversion between a tuple of rust values and the
/// token list of a function's inputs or outputs.
pub trait Tokens {
    /// Convert tokens into Self.
    fn from_tokens(tokens: Vec<Token>) -> Result<Self, Error>
    where
        Self: Sized;

    /// Convert self into tokens.
    fn into_tokens(self) -> Vec<Token>;
}

impl Tokens for Vec<Token> {
    fn from_tokens(tokens: Vec<Token>) -> Result<Self, Error> {
        Ok(tokens)
    }

    fn into_tokens(self) -> Vec<Token> {
        self
    }
}

macro_rules! impl_tokens_for_tuple {
    ($count: expr, $( $ty: ident : $no: tt, )*) => {
        impl<$($ty, )*> Tokens for ($($ty,)*)
        where
            $($ty: Tokenize,)*
        {
            fn from_tokens(tokens: Vec<Token>) -> Result<Self, Error> {
                if tokens.len() != $count {
                    return Err(Error::LengthMismatch {
                        expected: $count,
                        actual: tokens.len(),
                    });
                }
                #[allow(unused_variables)]
                #[allow(unused_mut)]
                let mut drain = tokens.into_iter();
                Ok(($($ty::from_token(drain.next().unwrap())?,)*))
            }

            fn into_tokens(self) -> Vec<Token> {
                vec![$(self.$no.into_token(),)*]
            }
        }
    }
}

impl_tokens_for_tuple!(0,);
impl_tokens_for_tuple!(1, A:0, );
impl_tokens_for_tuple!(2, A:0, B:1, );
impl_tokens_for_tuple!(3, A:0, B:1, C:2, );
impl_tokens_for_tuple!(4, A:0, B:1, C:2, D:3, );
impl_tokens_for_tuple!(5, A:0, B:1, C:2, D:3, E:4, );
impl_tokens_for_tuple!(6, A:0, B:1, C:2, D:3, E:4, F:5, );

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_into_tokens() {
        let to = Address::repeat_byte(0x42);
        assert_eq!(
            (to, U256::from(100), true).into_tokens(),
            vec![
                Token::Address(to),
                Token::Uint(100.into()),
                Token::Bool(true)
            ],
        );
        assert!(().into_tokens().is_empty());
    }

    #[test]
    fn tuple_from_tokens() {
        let (value,) = <(u8,)>::from_tokens(vec![Token::Uint(18.into())]).unwrap();
        assert_eq!(value, 18);

        assert!(matches!(
            <(u8,)>::from_tokens(vec![Token::Uint(256.into())]),
            Err(Error::IntegerMismatch)
        ));
        assert!(matches!(
            <(bool, bool)>::from_tokens(vec![Token::Bool(true)]),
            Err(Error::LengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            <(String,)>::from_tokens(vec![Token::Bool(true)]),
            Err(Error::TypeMismatch)
        ));
    }

    #[test]
    fn signed_integers() {
        assert_eq!((-1i8).into_token(), Token::Int(U256::MAX));
        assert_eq!(5i64.into_token(), Token::Int(5.into()));
        assert_eq!(i8::from_token((-128i8).into_token()).unwrap(), -128);
        assert_eq!(i128::from_token(i128::MIN.into_token()).unwrap(), i128::MIN);
        assert!(matches!(
            i8::from_token(200i16.into_token()),
            Err(Error::IntegerMismatch)
        ));
        assert!(matches!(
            i8::from_token(Token::Uint(1.into())),
            Err(Error::TypeMismatch)
        ));
    }

    #[test]
    fn arrays_and_fixed_bytes() {
        let owners = vec![Address::repeat_byte(1), Address::repeat_byte(2)];
        assert_eq!(
            owners.clone().into_token(),
            Token::Array(vec![Token::Address(owners[0]), Token::Address(owners[1])]),
        );
        assert_eq!(
            Vec::<Address>::from_token(owners.clone().into_token()).unwrap(),
            owners,
        );

        assert_eq!(
            [true, false].into_token(),
            Token::FixedArray(vec![Token::Bool(true), Token::Bool(false)]),
        );
        assert!(matches!(
            <[bool; 3]>::from_token([true, false].into_token()),
            Err(Error::FixedArrayLengthMismatch {
                expected: 3,
                actual: 2
            })
        ));

        assert_eq!([0xab_u8; 4].into_token(), Token::FixedBytes(vec![0xab; 4]));
        assert!(matches!(vec![0u8].into_token(), Token::Bytes(_)));
        assert!(matches!(
            <[u8; 32]>::from_token(Token::FixedBytes(vec![0; 4])),
            Err(Error::TypeMismatch)
        ));
    }

    #[test]
    fn str_tokenizes_as_string() {
        assert_eq!("Mock revert".into_token(), Token::String("Mock revert".into()));
    }
}
