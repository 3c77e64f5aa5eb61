//! Per-identity override stacks
//!
//! Provides [`OverrideSlot`], the LIFO stack of [`OverrideEntry`] values
//! installed for one identity.

use crate::delegate::{Delegate, Signature};
use crate::error::RegistryError;
use indirect_identity::TargetIdentity;
use smallvec::SmallVec;

/// One installed override
#[derive(Debug, Clone)]
pub struct OverrideEntry {
    delegate: Delegate,
    seq: u64,
}

impl OverrideEntry {
    #[inline]
    pub(crate) fn new(delegate: Delegate, seq: u64) -> Self {
        Self { delegate, seq }
    }

    /// Installed delegate
    #[inline]
    #[must_use]
    pub fn delegate(&self) -> &Delegate {
        &self.delegate
    }

    /// Concrete type of the delegate
    #[inline]
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.delegate.signature()
    }

    /// Install sequence number (monotonic within the registry)
    #[inline]
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// LIFO stack of overrides for one identity
///
/// Most identities carry a single override, so the stack stays inline until
/// a test nests a second one.
#[derive(Debug, Clone)]
pub struct OverrideSlot {
    identity: TargetIdentity,
    stack: SmallVec<[OverrideEntry; 2]>,
}

impl OverrideSlot {
    #[inline]
    pub(crate) fn new(identity: TargetIdentity) -> Self {
        Self {
            identity,
            stack: SmallVec::new(),
        }
    }

    /// Identity this slot belongs to
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &TargetIdentity {
        &self.identity
    }

    /// Active override (top of stack)
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&OverrideEntry> {
        self.stack.last()
    }

    /// Number of stacked overrides
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Check if no override is installed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Entries from bottom (oldest) to top (active)
    pub fn iter(&self) -> impl Iterator<Item = &OverrideEntry> {
        self.stack.iter()
    }

    #[inline]
    pub(crate) fn push(&mut self, entry: OverrideEntry) {
        self.stack.push(entry);
    }

    /// Pop the top entry if it carries `seq`
    ///
    /// The stack is left untouched on error.
    pub(crate) fn pop_if_top(&mut self, seq: u64) -> Result<OverrideEntry, RegistryError> {
        let Some(top) = self.stack.last() else {
            return Err(self.stale(seq));
        };

        if top.seq == seq {
            // Checked non-empty above
            return self.stack.pop().ok_or_else(|| self.stale(seq));
        }

        if self.stack.iter().any(|e| e.seq == seq) {
            Err(RegistryError::ScopeViolation {
                identity: self.identity.clone(),
                attempted: seq,
                top: top.seq,
            })
        } else {
            Err(self.stale(seq))
        }
    }

    fn stale(&self, seq: u64) -> RegistryError {
        RegistryError::StaleHandle {
            identity: self.identity.clone(),
            seq,
        }
    }
}
