//! Singleton locators
//!
//! - [`SharedSingletonLocator`]: the `get_or_register` contract
//! - [`ProcessLocator`]: resolves straight through the process rendezvous
//! - [`ExecutionContext`]: an isolated context with its own resolution cache
//!   that still converges on the process-wide instance

use crate::contract::Contract;
use crate::error::BoundaryBindingError;
use crate::rendezvous::{Published, Rendezvous};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use uuid::Uuid;

/// Resolves the one shared instance of a contract
pub trait SharedSingletonLocator {
    /// Existing shared instance for `C`, or a freshly published one
    ///
    /// Concurrent first callers observe the same instance.
    ///
    /// # Errors
    /// Returns [`BoundaryBindingError`] if the shared slot holds an
    /// incompatible instance or construction failed. Never falls back to a
    /// private instance.
    fn get_or_register<C: Contract>(&self) -> Result<Arc<C::Instance>, BoundaryBindingError>;
}

/// Locator backed directly by the process-wide rendezvous
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLocator;

impl ProcessLocator {
    /// Create locator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SharedSingletonLocator for ProcessLocator {
    fn get_or_register<C: Contract>(&self) -> Result<Arc<C::Instance>, BoundaryBindingError> {
        Rendezvous::process().resolve::<C>()
    }
}

/// An isolated execution context
///
/// Each context keeps its own cache of resolved instances (its "ordinary
/// memory"), which no other context can see. The cache is only filled from
/// the rendezvous, so every context sharing a rendezvous resolves the same
/// instance for a contract. Cache reads never lock.
#[derive(Debug)]
pub struct ExecutionContext {
    id: Uuid,
    label: String,
    rendezvous: Arc<Rendezvous>,
    cache: ArcSwap<HashMap<&'static str, Published>>,
}

impl ExecutionContext {
    /// Create a context bound to the process rendezvous
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::within(Rendezvous::process(), label)
    }

    /// Create a context bound to a specific rendezvous
    #[must_use]
    pub fn within(rendezvous: Arc<Rendezvous>, label: impl Into<String>) -> Self {
        let context = Self {
            id: Uuid::new_v4(),
            label: label.into(),
            rendezvous,
            cache: ArcSwap::from_pointee(HashMap::new()),
        };
        tracing::debug!("Created execution context {} ({})", context.label, context.id);
        context
    }

    /// Run `f` on a dedicated thread inside a fresh context
    pub fn spawn<F, T>(
        rendezvous: Arc<Rendezvous>,
        label: impl Into<String>,
        f: F,
    ) -> JoinHandle<T>
    where
        F: FnOnce(&ExecutionContext) -> T + Send + 'static,
        T: Send + 'static,
    {
        let label = label.into();
        thread::spawn(move || {
            let context = ExecutionContext::within(rendezvous, label);
            f(&context)
        })
    }

    /// Unique context id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rendezvous this context resolves through
    #[inline]
    #[must_use]
    pub fn rendezvous(&self) -> &Arc<Rendezvous> {
        &self.rendezvous
    }

    /// Number of contracts this context has resolved
    #[inline]
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.load().len()
    }
}

impl SharedSingletonLocator for ExecutionContext {
    fn get_or_register<C: Contract>(&self) -> Result<Arc<C::Instance>, BoundaryBindingError> {
        if let Some(cached) = self.cache.load().get(C::NAME) {
            return cached.bind::<C>();
        }

        let instance = self.rendezvous.resolve::<C>()?;
        if let Some(published) = self.rendezvous.published::<C>() {
            self.cache.rcu(|cache| {
                let mut next = HashMap::clone(cache);
                next.insert(C::NAME, published.clone());
                next
            });
        }
        Ok(instance)
    }
}
