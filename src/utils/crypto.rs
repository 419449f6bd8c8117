//! Identity and hashing primitives.
//!
//! - Addresses (20-byte principals for accounts, the engine and token owners)
//! - Hashes (SHA256) used to chain the audit log

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::constants::{ADDRESS_LENGTH, HASH_LENGTH};

fn decode_fixed<const N: usize>(name: &str, s: &str) -> Result<[u8; N]> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| Error::InvalidParameter {
        name: name.into(),
        reason: e.to_string(),
    })?;
    if bytes.len() != N {
        return Err(Error::InvalidParameter {
            name: name.into(),
            reason: format!("expected {} bytes, got {}", N, bytes.len()),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

// ═══════════════════════════════════════════════════════════════════════════════
// HASH
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte SHA256 digest
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    /// Create a new hash from bytes
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Compute SHA256 hash of data
    pub fn sha256(data: &[u8]) -> Self {
        let result = Sha256::digest(data);
        let mut bytes = [0u8; HASH_LENGTH];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Hash of `self` followed by `data`
    pub fn chain(&self, data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(data);
        let mut bytes = [0u8; HASH_LENGTH];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }

    /// Get the hash as bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Zero hash (all zeros)
    pub fn zero() -> Self {
        Self([0u8; HASH_LENGTH])
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        decode_fixed::<HASH_LENGTH>("hash", &s)
            .map(Hash)
            .map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte principal identifying an account, the engine, or a token owner
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The zero address
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    /// Create from raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive a stable address from a human label (last 20 bytes of its SHA256)
    pub fn from_label(label: &str) -> Self {
        let digest = Hash::sha256(label.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest.as_bytes()[HASH_LENGTH - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// Get the address as bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Check for the zero address
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// 0x-prefixed hex representation
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Short form for logs (0x1234…abcd)
    pub fn short(&self) -> String {
        let hex = hex::encode(self.0);
        format!("0x{}…{}", &hex[..4], &hex[hex.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode_fixed::<ADDRESS_LENGTH>("address", s).map(Self)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let h1 = Hash::sha256(b"hello");
        let h2 = Hash::sha256(b"hello");
        let h3 = Hash::sha256(b"world");
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_hash_chain_depends_on_prefix() {
        let a = Hash::zero().chain(b"event");
        let b = Hash::sha256(b"other").chain(b"event");
        assert_ne!(a, b);
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::from_label("alice");
        let parsed: Address = addr.to_hex().parse().unwrap();
        assert_eq!(addr, parsed);

        let unprefixed: Address = addr.to_hex()[2..].parse().unwrap();
        assert_eq!(addr, unprefixed);
    }

    #[test]
    fn test_address_from_label_deterministic() {
        assert_eq!(Address::from_label("bob"), Address::from_label("bob"));
        assert_ne!(Address::from_label("bob"), Address::from_label("alice"));
        assert!(!Address::from_label("bob").is_zero());
    }

    #[test]
    fn test_address_rejects_bad_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("zz".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_serde_json() {
        let addr = Address::from_label("carol");
        let json = serde_json::to_string(&addr).unwrap();
        assert!(json.contains("0x"));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }
}
