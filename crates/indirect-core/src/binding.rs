//! Typed bindings and override guards
//!
//! A [`Binding<D>`] pairs one [`TargetIdentity`] with the delegate shape `D`
//! its replacements must have. Installing through a binding returns an
//! [`OverrideGuard`] that uninstalls on drop, so nested scopes unwind in
//! LIFO order on their own.

use crate::error::IndirectError;
use crate::shape::{Func, OutFunc};
use crate::shared::resolve_in;
use indirect_identity::TargetIdentity;
use indirect_locator::{ExecutionContext, ProcessLocator};
use indirect_registry::{Delegate, OverrideHandle, OverrideRegistry, RegistryError};
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// Where a binding finds its registry
#[derive(Debug, Clone)]
pub enum RegistrySource {
    /// The process-wide shared registry
    Process,
    /// The shared registry as resolved by a specific execution context
    Context(Arc<ExecutionContext>),
    /// A registry the caller owns
    Explicit(Arc<OverrideRegistry>),
}

impl RegistrySource {
    /// Resolve the registry
    ///
    /// # Errors
    /// Returns [`IndirectError::Boundary`] if the shared registry cannot be
    /// located.
    pub fn registry(&self) -> Result<Arc<OverrideRegistry>, IndirectError> {
        match self {
            Self::Process => resolve_in(&ProcessLocator::new()),
            Self::Context(context) => resolve_in(context.as_ref()),
            Self::Explicit(registry) => Ok(Arc::clone(registry)),
        }
    }
}

/// Typed accessor for one intercepted function
pub struct Binding<D> {
    identity: TargetIdentity,
    source: RegistrySource,
    _delegate: PhantomData<fn() -> D>,
}

impl<D> Binding<D>
where
    D: Send + Sync + 'static,
{
    /// Bind `identity` against the process-wide registry
    #[must_use]
    pub fn new(identity: TargetIdentity) -> Self {
        Self::with_source(identity, RegistrySource::Process)
    }

    /// Bind `identity` against a specific registry source
    #[must_use]
    pub fn with_source(identity: TargetIdentity, source: RegistrySource) -> Self {
        Self {
            identity,
            source,
            _delegate: PhantomData,
        }
    }

    /// Same identity, resolved through `context`
    #[must_use]
    pub fn in_context(self, context: Arc<ExecutionContext>) -> Self {
        Self::with_source(self.identity, RegistrySource::Context(context))
    }

    /// Same identity, against a registry the caller owns
    #[must_use]
    pub fn with_registry(self, registry: Arc<OverrideRegistry>) -> Self {
        Self::with_source(self.identity, RegistrySource::Explicit(registry))
    }

    /// Intercepted function's identity
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &TargetIdentity {
        &self.identity
    }

    /// Registry source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &RegistrySource {
        &self.source
    }

    /// Install `delegate` as the active replacement
    ///
    /// # Errors
    /// - [`IndirectError::Boundary`] if the registry cannot be located
    /// - [`IndirectError::Registry`] if a replacement of another shape is
    ///   active and signatures are strict
    pub fn install(&self, delegate: D) -> Result<OverrideGuard, IndirectError> {
        let registry = self.source.registry()?;
        let handle = registry.install(self.identity.clone(), Delegate::new(delegate))?;
        Ok(OverrideGuard {
            registry,
            handle: Some(handle),
        })
    }

    /// Active replacement, if any
    ///
    /// # Errors
    /// - [`IndirectError::Boundary`] if the registry cannot be located
    /// - [`IndirectError::Registry`] if the active replacement is not a `D`
    pub fn resolve(&self) -> Result<Option<Arc<D>>, IndirectError> {
        let registry = self.source.registry()?;
        Ok(registry.lookup_typed::<D>(&self.identity)?)
    }

    /// Number of stacked replacements
    ///
    /// # Errors
    /// Returns [`IndirectError::Boundary`] if the registry cannot be located.
    pub fn depth(&self) -> Result<usize, IndirectError> {
        Ok(self.source.registry()?.depth(&self.identity))
    }
}

impl<A, R> Binding<Func<A, R>>
where
    A: ?Sized + 'static,
    R: 'static,
{
    /// Install a closure as the replacement
    ///
    /// # Errors
    /// See [`Binding::install`].
    pub fn install_fn<F>(&self, f: F) -> Result<OverrideGuard, IndirectError>
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.install(Func::new(f))
    }
}

impl<A, O, R> Binding<OutFunc<A, O, R>>
where
    A: ?Sized + 'static,
    O: 'static,
    R: 'static,
{
    /// Install a closure as the replacement
    ///
    /// # Errors
    /// See [`Binding::install`].
    pub fn install_fn<F>(&self, f: F) -> Result<OverrideGuard, IndirectError>
    where
        F: Fn(&A, &mut O) -> R + Send + Sync + 'static,
    {
        self.install(OutFunc::new(f))
    }
}

impl<D> Clone for Binding<D> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            source: self.source.clone(),
            _delegate: PhantomData,
        }
    }
}

impl<D> Debug for Binding<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("identity", &self.identity)
            .field("delegate", &std::any::type_name::<D>())
            .field("source", &self.source)
            .finish()
    }
}

/// Binding for `identity` against the process-wide registry
///
/// Shorthand for [`Binding::new`] when the delegate shape is inferred.
#[must_use]
pub fn bind<D>(identity: TargetIdentity) -> Binding<D>
where
    D: Send + Sync + 'static,
{
    Binding::new(identity)
}

/// Scoped ownership of one installed replacement
///
/// Dropping the guard uninstalls the replacement. A guard whose override was
/// already cleared by a registry reset drops quietly. Dropping a guard out of
/// LIFO order is a programming error and panics unless the thread is already
/// unwinding.
#[derive(Debug)]
#[must_use = "dropping the guard immediately uninstalls the override"]
pub struct OverrideGuard {
    registry: Arc<OverrideRegistry>,
    handle: Option<OverrideHandle>,
}

impl OverrideGuard {
    /// Handle of the guarded override
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Option<&OverrideHandle> {
        self.handle.as_ref()
    }

    /// Registry the override lives in
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<OverrideRegistry> {
        &self.registry
    }

    /// Uninstall now and report the outcome
    ///
    /// # Errors
    /// - [`IndirectError::Registry`] with a scope violation if a newer
    ///   override for the same identity is still installed; the stack is
    ///   left unchanged
    /// - [`IndirectError::Registry`] with a stale handle if the override was
    ///   already removed
    pub fn release(mut self) -> Result<(), IndirectError> {
        match self.handle.take() {
            Some(handle) => Ok(self.registry.uninstall(&handle)?),
            None => Ok(()),
        }
    }

    /// Leave the override installed and hand back its handle
    ///
    /// The override then lives until it is uninstalled through the handle or
    /// the registry is reset.
    pub fn forget(mut self) -> Option<OverrideHandle> {
        self.handle.take()
    }
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match self.registry.uninstall(&handle) {
            Ok(()) => {}
            Err(RegistryError::StaleHandle { .. }) => {
                tracing::debug!(
                    "Override #{} for {} was already cleared",
                    handle.seq(),
                    handle.identity()
                );
            }
            Err(err) => {
                if std::thread::panicking() {
                    tracing::error!("Override guard dropped during unwind: {}", err);
                } else {
                    panic!("override guard dropped out of order: {err}");
                }
            }
        }
    }
}
