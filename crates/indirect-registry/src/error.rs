//! Registry errors

use indirect_identity::TargetIdentity;

/// Errors raised by [`OverrideRegistry`](crate::OverrideRegistry) operations
///
/// Absence of an override is not an error; `lookup` returns `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Uninstall targeted an entry that is not the top of its stack
    #[error(
        "scope violation on {identity}: override #{attempted} is not the most recent install (top is #{top})"
    )]
    ScopeViolation {
        /// Identity whose stack was targeted
        identity: TargetIdentity,
        /// Sequence number the caller tried to remove
        attempted: u64,
        /// Sequence number currently on top
        top: u64,
    },

    /// Two delegates of different concrete types claim the same identity
    #[error("identity conflict on {identity}: installed delegate is {installed}, got {requested}")]
    IdentityConflict {
        /// Contested identity
        identity: TargetIdentity,
        /// Type name of the delegate already on top
        installed: &'static str,
        /// Type name offered or requested by the caller
        requested: &'static str,
    },

    /// Handle refers to an entry that is no longer installed
    #[error("stale override handle for {identity}: override #{seq} is no longer installed")]
    StaleHandle {
        /// Identity named by the handle
        identity: TargetIdentity,
        /// Sequence number named by the handle
        seq: u64,
    },
}

impl RegistryError {
    /// Identity the error concerns
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &TargetIdentity {
        match self {
            Self::ScopeViolation { identity, .. }
            | Self::IdentityConflict { identity, .. }
            | Self::StaleHandle { identity, .. } => identity,
        }
    }

    /// Check if error is a LIFO discipline violation
    #[inline]
    #[must_use]
    pub fn is_scope_violation(&self) -> bool {
        matches!(self, Self::ScopeViolation { .. })
    }
}
