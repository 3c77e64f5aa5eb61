//! Error types for the binding surface

use indirect_locator::BoundaryBindingError;
use indirect_registry::RegistryError;

/// Errors raised by bindings, guards and sessions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndirectError {
    /// Registry rejected the operation
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Shared registry could not be located
    #[error(transparent)]
    Boundary(#[from] BoundaryBindingError),
}

impl IndirectError {
    /// Check if the calling context cannot continue
    ///
    /// Boundary failures mean the caller would otherwise operate on a
    /// registry nobody else sees; they are never retried.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Boundary(_))
    }

    /// Check if error is a LIFO discipline violation
    #[inline]
    #[must_use]
    pub fn is_scope_violation(&self) -> bool {
        matches!(self, Self::Registry(err) if err.is_scope_violation())
    }
}
