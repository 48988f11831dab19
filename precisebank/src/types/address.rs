//! # Account Addresses
//!
//! Addresses are opaque byte strings owned by the account layer. This crate
//! never validates them beyond decoding; it only needs them as map keys with
//! a stable ordering and a printable form.
//!
//! The printable form is bech32 with the [`ADDRESS_HRP`] prefix
//! (`cosmos1...`). Payloads too long for a bech32 checksum fall back to
//! `0x`-prefixed hex, which [`Address::from_str`](std::str::FromStr) also
//! accepts.

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::config::{ADDRESS_HRP, MODULE_ADDRESS_LENGTH};
use crate::error::PreciseBankError;

/// An account identifier in the base ledger.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(Vec<u8>);

impl Address {
    /// Wraps raw address bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Derives the address of a named module account.
    ///
    /// `SHA-256(name)` truncated to [`MODULE_ADDRESS_LENGTH`] bytes. The
    /// reserve account is `Address::module(MODULE_NAME)`.
    pub fn module(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        Self(digest[..MODULE_ADDRESS_LENGTH].to_vec())
    }

    /// Returns the raw address bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` for the zero-length address.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes the address as bech32, or `None` if the payload is too long
    /// for a bech32 checksum.
    pub fn to_bech32(&self) -> Option<String> {
        let hrp = Hrp::parse(ADDRESS_HRP).expect("static HRP is valid");
        bech32::encode::<Bech32>(hrp, &self.0).ok()
    }

    /// Decodes a bech32 address carrying the [`ADDRESS_HRP`] prefix.
    pub fn from_bech32(s: &str) -> Result<Self, PreciseBankError> {
        let (hrp, data) =
            bech32::decode(s).map_err(|e| PreciseBankError::InvalidAddress(e.to_string()))?;

        let expected = Hrp::parse(ADDRESS_HRP).expect("static HRP is valid");
        if hrp != expected {
            return Err(PreciseBankError::InvalidAddress(format!(
                "expected prefix '{ADDRESS_HRP}', got '{hrp}'"
            )));
        }
        Ok(Self(data))
    }
}

impl From<&[u8]> for Address {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Some(encoded) => f.write_str(&encoded),
            None => write!(f, "0x{}", hex::encode(&self.0)),
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = PreciseBankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("0x") {
            Some(hex_part) => hex::decode(hex_part)
                .map(Self)
                .map_err(|e| PreciseBankError::InvalidAddress(e.to_string())),
            None => Self::from_bech32(s),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
