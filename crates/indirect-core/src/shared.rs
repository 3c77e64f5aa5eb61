//! The process-wide override registry
//!
//! Every execution context must observe the same [`OverrideRegistry`], so
//! the registry is published through the locator under a fixed contract
//! rather than held in a per-context static.

use crate::error::IndirectError;
use indirect_locator::{Contract, ProcessLocator, SharedSingletonLocator};
use indirect_registry::{OverrideRegistry, RegistryConfig};
use std::sync::Arc;

/// Contract under which the shared registry is published
///
/// Bump [`Contract::VERSION`] whenever the registry's in-memory layout
/// changes, so that contexts built against an older layout fail to bind
/// instead of sharing a mismatched instance.
#[derive(Debug, Clone, Copy)]
pub struct RegistryContract;

impl Contract for RegistryContract {
    type Instance = OverrideRegistry;
    const NAME: &'static str = "indirect::OverrideRegistry";
    const VERSION: u32 = 1;

    fn create() -> OverrideRegistry {
        let config = RegistryConfig::from_env();
        tracing::info!(
            "Creating shared override registry (strict_signatures={}, capacity={})",
            config.strict_signatures,
            config.initial_capacity
        );
        OverrideRegistry::with_config(config)
    }
}

/// The registry shared by every context in the process
///
/// # Errors
/// Returns [`IndirectError::Boundary`] if the shared slot holds an
/// incompatible registry.
pub fn shared_registry() -> Result<Arc<OverrideRegistry>, IndirectError> {
    resolve_in(&ProcessLocator::new())
}

/// The registry as seen through `locator`
///
/// # Errors
/// Returns [`IndirectError::Boundary`] if the shared slot holds an
/// incompatible registry.
pub fn resolve_in<L>(locator: &L) -> Result<Arc<OverrideRegistry>, IndirectError>
where
    L: SharedSingletonLocator + ?Sized,
{
    Ok(locator.get_or_register::<RegistryContract>()?)
}
