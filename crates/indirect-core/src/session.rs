//! Override sessions
//!
//! An [`OverrideSession`] brackets one test: whatever is still installed
//! when the session ends is reported and cleared, so the next session starts
//! from an empty registry. Sessions act on the whole registry, so the test
//! runner must not run two of them against one registry at the same time.

use crate::binding::{Binding, RegistrySource};
use crate::error::IndirectError;
use crate::shared::{resolve_in, shared_registry};
use indirect_identity::TargetIdentity;
use indirect_locator::SharedSingletonLocator;
use indirect_registry::{OverrideRegistry, RegistrySnapshot};
use std::sync::Arc;

/// Scope that resets the registry when it ends
#[derive(Debug)]
#[must_use = "dropping the session immediately resets the registry"]
pub struct OverrideSession {
    registry: Arc<OverrideRegistry>,
    ended: bool,
}

impl OverrideSession {
    /// Begin a session on the process-wide registry
    ///
    /// # Errors
    /// Returns [`IndirectError::Boundary`] if the shared registry cannot be
    /// located.
    pub fn begin() -> Result<Self, IndirectError> {
        Ok(Self::with_registry(shared_registry()?))
    }

    /// Begin a session on the registry `locator` resolves
    ///
    /// # Errors
    /// Returns [`IndirectError::Boundary`] if the shared registry cannot be
    /// located.
    pub fn begin_in<L>(locator: &L) -> Result<Self, IndirectError>
    where
        L: SharedSingletonLocator + ?Sized,
    {
        Ok(Self::with_registry(resolve_in(locator)?))
    }

    /// Begin a session on a registry the caller owns
    pub fn with_registry(registry: Arc<OverrideRegistry>) -> Self {
        if !registry.is_empty() {
            tracing::debug!(
                "Session starting with {} identities already overridden",
                registry.len()
            );
        }
        Self {
            registry,
            ended: false,
        }
    }

    /// Registry this session clears
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<OverrideRegistry> {
        &self.registry
    }

    /// Binding for `identity` against this session's registry
    #[must_use]
    pub fn bind<D>(&self, identity: TargetIdentity) -> Binding<D>
    where
        D: Send + Sync + 'static,
    {
        Binding::with_source(identity, RegistrySource::Explicit(Arc::clone(&self.registry)))
    }

    /// End the session, returning what was still installed
    ///
    /// The report lists exactly the overrides the reset removed.
    pub fn end(mut self) -> RegistrySnapshot {
        self.finish()
    }

    fn finish(&mut self) -> RegistrySnapshot {
        self.ended = true;
        let leaked = self.registry.drain();
        for entry in &leaked.entries {
            tracing::warn!(
                "Override left installed at session end: {}#0x{:08X} (depth {}, {})",
                entry.module,
                entry.token,
                entry.depth,
                entry.delegate
            );
        }
        leaked
    }
}

impl Drop for OverrideSession {
    fn drop(&mut self) {
        if !self.ended {
            self.finish();
        }
    }
}
