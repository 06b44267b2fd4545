use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Wallet-style author identifier.
///
/// The store treats addresses as opaque strings and matches them exactly;
/// `0xAbC...` and `0xabc...` are different authors. EVM checks are offered
/// for callers that want them but are never applied implicitly.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Parse a `0x`-prefixed, 20-byte hex address.
    pub fn parse_evm(address: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        };
        let digits = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .ok_or_else(|| invalid("missing 0x prefix"))?;
        if digits.len() != 40 {
            return Err(invalid("expected 40 hex digits"));
        }
        hex::decode(digits).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(address.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this looks like an EVM address.
    pub fn is_evm_address(&self) -> bool {
        Self::parse_evm(&self.0).is_ok()
    }

    /// Abbreviated form for display: first 6 and last 4 characters.
    ///
    /// Addresses too short to abbreviate are returned unchanged.
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletAddress({})", self.short())
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}
