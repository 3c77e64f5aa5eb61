//! Registry configuration

use serde::{Deserialize, Serialize};

/// Environment variable toggling [`RegistryConfig::strict_signatures`]
pub const ENV_STRICT_SIGNATURES: &str = "INDIRECT_STRICT_SIGNATURES";

/// Environment variable setting [`RegistryConfig::initial_capacity`]
pub const ENV_INITIAL_CAPACITY: &str = "INDIRECT_INITIAL_CAPACITY";

/// Largest shard count the registry will create
pub const MAX_SHARD_AMOUNT: usize = 1 << 16;

/// Override registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Reject installs whose delegate type differs from the active one
    pub strict_signatures: bool,
    /// Identities to pre-allocate room for
    pub initial_capacity: usize,
    /// Map shard count (rounded up to a power of two, clamped to
    /// `2..=MAX_SHARD_AMOUNT`)
    pub shard_amount: Option<usize>,
}

impl RegistryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration overridden by `INDIRECT_*` environment variables
    ///
    /// Used for the process-shared registry, which is constructed by the
    /// locator rather than by a caller. Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_STRICT_SIGNATURES) {
            match parse_flag(&raw) {
                Some(flag) => config.strict_signatures = flag,
                None => tracing::warn!("Ignoring {}={:?}: not a boolean", ENV_STRICT_SIGNATURES, raw),
            }
        }

        if let Some(raw) = lookup(ENV_INITIAL_CAPACITY) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => config.initial_capacity = capacity,
                Err(_) => tracing::warn!("Ignoring {}={:?}: not a count", ENV_INITIAL_CAPACITY, raw),
            }
        }

        config
    }

    /// With strict signature checking
    #[inline]
    #[must_use]
    pub fn with_strict_signatures(mut self, strict: bool) -> Self {
        self.strict_signatures = strict;
        self
    }

    /// With initial capacity
    #[inline]
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// With shard amount
    #[inline]
    #[must_use]
    pub fn with_shard_amount(mut self, shards: usize) -> Self {
        self.shard_amount = Some(shards);
        self
    }

    /// Shard amount normalized to what the map accepts
    #[inline]
    #[must_use]
    pub fn effective_shard_amount(&self) -> Option<usize> {
        self.shard_amount.map(|n| {
            n.clamp(2, MAX_SHARD_AMOUNT)
                .checked_next_power_of_two()
                .unwrap_or(MAX_SHARD_AMOUNT)
        })
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_signatures: true,
            initial_capacity: 64,
            shard_amount: None,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
