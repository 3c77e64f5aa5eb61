//! Indirect Registry
//!
//! Thread-safe mapping from [`TargetIdentity`] to a LIFO stack of
//! replacement delegates.
//!
//! # Core Concepts
//!
//! - [`OverrideRegistry`]: install / lookup / uninstall / reset-all
//! - [`OverrideSlot`]: one identity's stack; the top entry is active
//! - [`OverrideHandle`]: names exactly one installed entry for removal
//! - [`Delegate`]: type-erased replacement callable
//!
//! Removal is strictly LIFO per identity: uninstalling anything but the most
//! recent install fails with [`RegistryError::ScopeViolation`].
//!
//! # Example
//!
//! ```rust
//! use indirect_identity::TargetIdentity;
//! use indirect_registry::{Delegate, OverrideRegistry};
//!
//! let registry = OverrideRegistry::new();
//! let id = TargetIdentity::new("app", 1);
//!
//! let outer = registry.install(id.clone(), Delegate::new(1_u32)).unwrap();
//! let inner = registry.install(id.clone(), Delegate::new(2_u32)).unwrap();
//! assert_eq!(*registry.lookup_typed::<u32>(&id).unwrap().unwrap(), 2);
//!
//! registry.uninstall(&inner).unwrap();
//! assert_eq!(*registry.lookup_typed::<u32>(&id).unwrap().unwrap(), 1);
//!
//! registry.uninstall(&outer).unwrap();
//! assert!(registry.lookup(&id).is_none());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod delegate;
mod error;
mod registry;
mod slot;

pub use config::{RegistryConfig, ENV_INITIAL_CAPACITY, ENV_STRICT_SIGNATURES, MAX_SHARD_AMOUNT};
pub use delegate::{Delegate, Signature};
pub use error::RegistryError;
pub use registry::{OverrideHandle, OverrideRegistry, RegistrySnapshot, SnapshotEntry};
pub use slot::{OverrideEntry, OverrideSlot};

pub use indirect_identity::TargetIdentity;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
