//! Boundary binding errors

/// Failure to bind to the process-wide shared instance
///
/// Always fatal for the calling context: the locator never falls back to a
/// private instance, since two live instances would split state silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoundaryBindingError {
    /// Contract name is published with a different version
    #[error("contract {name:?} is published at version {found}, caller expects {expected}")]
    IncompatibleContract {
        /// Contract name
        name: &'static str,
        /// Version the caller was built against
        expected: u32,
        /// Version already published
        found: u32,
    },

    /// Contract name and version match but the instance type differs
    #[error("contract {name:?} holds a {found}, caller expects {expected}")]
    TypeMismatch {
        /// Contract name
        name: &'static str,
        /// Type the caller expects
        expected: &'static str,
        /// Type already published
        found: &'static str,
    },

    /// The constructor panicked; nothing was published
    #[error("constructing contract {name:?} panicked: {message}")]
    ConstructionPanicked {
        /// Contract name
        name: &'static str,
        /// Panic payload, if it was a string
        message: String,
    },

    /// The constructor tried to resolve its own contract
    #[error("contract {name:?} was resolved from inside its own constructor")]
    ReentrantConstruction {
        /// Contract name
        name: &'static str,
    },
}

impl BoundaryBindingError {
    /// Contract the error concerns
    #[inline]
    #[must_use]
    pub fn contract_name(&self) -> &'static str {
        match self {
            Self::IncompatibleContract { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::ConstructionPanicked { name, .. }
            | Self::ReentrantConstruction { name } => name,
        }
    }
}
