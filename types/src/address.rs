use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of hex digits after the `0x` prefix of an account or contract address.
pub const ADDRESS_HEX_LEN: usize = 40;

/// A blockchain account or contract identifier.
///
/// Construction never validates: any string is accepted, exactly like the
/// client state it is stored in. Use [`Address::validate`] when a caller wants
/// to know whether the value looks like a real `0x`-prefixed address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedAddress {
    #[error("address must start with 0x")]
    MissingPrefix,
    #[error("address must have {ADDRESS_HEX_LEN} hex digits after 0x, found {0}")]
    WrongLength(usize),
    #[error("address has non-hex character {ch:?} at position {index}")]
    NonHexDigit { index: usize, ch: char },
}

impl Address {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the `0x` + 40 hex digit shape. Case (checksum) is not verified.
    pub fn validate(&self) -> Result<(), MalformedAddress> {
        let digits = self
            .0
            .strip_prefix("0x")
            .or_else(|| self.0.strip_prefix("0X"))
            .ok_or(MalformedAddress::MissingPrefix)?;

        if let Some((index, ch)) = digits.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit())
        {
            return Err(MalformedAddress::NonHexDigit { index: index + 2, ch });
        }

        let len = digits.len();
        if len != ADDRESS_HEX_LEN {
            return Err(MalformedAddress::WrongLength(len));
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
