//! TargetIdentity - the registry key
//!
//! Provides [`TargetIdentity`], an immutable `(module, token)` pair naming one
//! redirectable function overload.

use crate::module::ModuleIdentity;
use crate::token::FunctionToken;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Identity of one redirectable function
///
/// Equality and hashing are structural over `(module, token)`. The identity
/// only has to be stable within one process run; nothing is persisted.
///
/// # Example
/// ```
/// use indirect_identity::TargetIdentity;
///
/// let a = TargetIdentity::new("app", 7);
/// let b = TargetIdentity::new(String::from("app"), 7);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetIdentity {
    module: Arc<str>,
    token: u64,
}

impl TargetIdentity {
    /// Create from any module string and token
    #[inline]
    #[must_use]
    pub fn new(module: impl Into<Arc<str>>, token: u64) -> Self {
        Self {
            module: module.into(),
            token,
        }
    }

    /// Create from a structured module identity and metadata token
    #[must_use]
    pub fn from_module(module: &ModuleIdentity, token: FunctionToken) -> Self {
        Self::new(module.to_string(), u64::from(token.raw()))
    }

    /// Create from a fully-qualified symbol path and signature text
    ///
    /// For hosts without metadata tokens: the token is the first eight bytes
    /// of a Blake3 hash over `path` and `signature`, so overloads that differ
    /// only in signature get distinct identities.
    #[must_use]
    pub fn from_symbol(module: impl Into<Arc<str>>, path: &str, signature: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(path.as_bytes());
        hasher.update(&[0]);
        hasher.update(signature.as_bytes());
        let digest = hasher.finalize();

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        Self::new(module, u64::from_le_bytes(head))
    }

    /// Module identity string
    #[inline]
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Function token
    #[inline]
    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }
}

impl Display for TargetIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Ok(narrow) = u32::try_from(self.token) {
            write!(f, "{}#{}", self.module, FunctionToken::new(narrow))
        } else {
            write!(f, "{}#0x{:016X}", self.module, self.token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn structural_equality() {
        let a = TargetIdentity::new("m", 1);
        assert_eq!(a, TargetIdentity::new("m", 1));
        assert_ne!(a, TargetIdentity::new("m", 2));
        assert_ne!(a, TargetIdentity::new("n", 1));
    }

    #[test]
    fn from_module_uses_display_form() {
        let module: ModuleIdentity =
            "mscorlib, Version=2.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
                .parse()
                .unwrap();
        let id = TargetIdentity::from_module(&module, FunctionToken::new(0x0600_001A));
        assert_eq!(id.module(), module.to_string());
        assert_eq!(id.token(), 0x0600_001A);
        assert_eq!(
            id.to_string(),
            "mscorlib, Version=2.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089#0x0600001A"
        );
    }

    #[test]
    fn from_symbol_separates_overloads() {
        let a = TargetIdentity::from_symbol("app", "num::parse", "fn(&str) -> i32");
        let b = TargetIdentity::from_symbol("app", "num::parse", "fn(&str, u32) -> i32");
        let again = TargetIdentity::from_symbol("app", "num::parse", "fn(&str) -> i32");
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn from_symbol_separator_prevents_concatenation_clash() {
        let a = TargetIdentity::from_symbol("app", "ab", "c");
        let b = TargetIdentity::from_symbol("app", "a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn wide_token_display() {
        let id = TargetIdentity::new("m", 0x1_0000_0000);
        assert_eq!(id.to_string(), "m#0x0000000100000000");
    }

    proptest! {
        #[test]
        fn prop_hash_set_dedups_structurally(
            entries in proptest::collection::vec(("[a-c]{1,2}", 0u64..4), 0..40)
        ) {
            let ids: HashSet<TargetIdentity> = entries
                .iter()
                .map(|(m, t)| TargetIdentity::new(m.as_str(), *t))
                .collect();
            let raw: HashSet<(String, u64)> = entries.into_iter().collect();
            prop_assert_eq!(ids.len(), raw.len());
        }
    }
}
