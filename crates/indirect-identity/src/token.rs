//! Function tokens
//!
//! A [`FunctionToken`] is a 32-bit metadata handle: the upper byte names the
//! metadata table, the lower 24 bits the row within it.

use crate::error::IdentityError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Metadata table a token points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Method definition (`0x06`)
    MethodDef,
    /// Member reference (`0x0A`)
    MemberRef,
    /// Generic method instantiation (`0x2B`)
    MethodSpec,
    /// Any other table
    Other(u8),
}

impl TokenKind {
    /// Decode from the table byte
    #[inline]
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x06 => Self::MethodDef,
            0x0A => Self::MemberRef,
            0x2B => Self::MethodSpec,
            other => Self::Other(other),
        }
    }

    /// Table byte
    #[inline]
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::MethodDef => 0x06,
            Self::MemberRef => 0x0A,
            Self::MethodSpec => 0x2B,
            Self::Other(b) => b,
        }
    }
}

/// 32-bit function token
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct FunctionToken(u32);

impl FunctionToken {
    /// Wrap a raw token
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Build from table kind and row number (row is truncated to 24 bits)
    #[inline]
    #[must_use]
    pub const fn from_parts(kind: TokenKind, row: u32) -> Self {
        Self(((kind.as_byte() as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Table kind (upper byte)
    #[inline]
    #[must_use]
    pub const fn kind(self) -> TokenKind {
        TokenKind::from_byte((self.0 >> 24) as u8)
    }

    /// Row number (lower 24 bits)
    #[inline]
    #[must_use]
    pub const fn row(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }
}

impl Display for FunctionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl FromStr for FunctionToken {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => trimmed.parse::<u32>(),
        };
        parsed
            .map(Self)
            .map_err(|_| IdentityError::InvalidToken(s.to_string()))
    }
}

impl From<u32> for FunctionToken {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
