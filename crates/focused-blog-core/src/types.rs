//! Strong type definitions for Focused Blog.
//!
//! Identifiers are newtypes so an account can never be passed where a token
//! is expected.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A 20-byte account identifier.
///
/// The all-zero value is the null account. It never owns tokens and is
/// rejected as a post author.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The null account.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derive a deterministic account from a label.
    ///
    /// Blake3(domain || label), truncated to 20 bytes.
    pub fn derive(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"focused-blog-account-v0:");
        hasher.update(label.as_bytes());
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&hasher.finalize().as_bytes()[..20]);
        Self(arr)
    }

    /// Generate a random account.
    pub fn random() -> Self {
        let mut arr = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut arr);
        Self(arr)
    }

    /// Whether this is the null account.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Convert to a `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)?;
        let arr: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| {
            CoreError::InvalidAccountId(format!("expected 20 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for AccountId {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for AccountId {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 20] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// Sequential identifier of a minted post token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl TokenId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The identifier minted after this one.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for TokenId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_hex_roundtrip() {
        let id = AccountId::from_bytes([0x42; 20]);
        let hex = id.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(AccountId::from_hex(&hex).unwrap(), id);
        assert_eq!(AccountId::from_hex(&hex[2..]).unwrap(), id);
    }

    #[test]
    fn test_account_from_hex_wrong_length() {
        let err = AccountId::from_hex("0xabcd").unwrap_err();
        assert!(matches!(err, CoreError::InvalidAccountId(_)));
    }

    #[test]
    fn test_account_derive_deterministic() {
        assert_eq!(AccountId::derive("alice"), AccountId::derive("alice"));
        assert_ne!(AccountId::derive("alice"), AccountId::derive("bob"));
        assert!(!AccountId::derive("alice").is_zero());
    }

    #[test]
    fn test_random_accounts_differ() {
        let a = AccountId::random();
        let b = AccountId::random();
        assert_ne!(a, b);
        assert_eq!(AccountId::try_from(a.as_ref()).unwrap(), a);
    }

    #[test]
    fn test_zero_account() {
        assert!(AccountId::ZERO.is_zero());
        assert!(!AccountId::from_bytes([1; 20]).is_zero());
    }

    #[test]
    fn test_account_debug() {
        let debug = format!("{:?}", AccountId::from_bytes([0xcd; 20]));
        assert_eq!(debug, "AccountId(0xcdcdcdcdcd)");
    }

    #[test]
    fn test_token_id_display() {
        assert_eq!(format!("{}", TokenId(7)), "#7");
        assert_eq!(TokenId(7).next(), TokenId(8));
    }
}
