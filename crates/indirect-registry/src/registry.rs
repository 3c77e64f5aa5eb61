//! Override registry
//!
//! Provides [`OverrideRegistry`], the thread-safe mapping from
//! [`TargetIdentity`] to [`OverrideSlot`].
//!
//! # Concurrency
//!
//! Slots live in a sharded concurrent map. `install` and `uninstall` on one
//! identity run under that identity's shard write lock, so they form a single
//! critical section and `lookup` (shard read lock) only ever sees a complete
//! stack. Different identities on different shards never contend.

use crate::config::RegistryConfig;
use crate::delegate::{Delegate, Signature};
use crate::error::RegistryError;
use crate::slot::{OverrideEntry, OverrideSlot};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indirect_identity::TargetIdentity;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle naming exactly one installed override
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use = "dropping the handle makes the override impossible to uninstall precisely"]
pub struct OverrideHandle {
    identity: TargetIdentity,
    seq: u64,
}

impl OverrideHandle {
    /// Identity the override was installed for
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &TargetIdentity {
        &self.identity
    }

    /// Install sequence number
    #[inline]
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Identity-keyed override registry
#[derive(Debug)]
pub struct OverrideRegistry {
    slots: DashMap<TargetIdentity, OverrideSlot>,
    next_seq: AtomicU64,
    config: RegistryConfig,
}

impl OverrideRegistry {
    /// Create an empty registry with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let slots = match config.effective_shard_amount() {
            Some(shards) => DashMap::with_capacity_and_shard_amount(config.initial_capacity, shards),
            None => DashMap::with_capacity(config.initial_capacity),
        };
        Self {
            slots,
            next_seq: AtomicU64::new(0),
            config,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Push `delegate` onto the stack for `identity`
    ///
    /// Subsequent lookups return `delegate` until it is uninstalled or the
    /// registry is reset.
    ///
    /// # Errors
    /// - `RegistryError::IdentityConflict` if strict signatures are enabled
    ///   and the active delegate for `identity` has a different concrete type
    pub fn install(
        &self,
        identity: TargetIdentity,
        delegate: Delegate,
    ) -> Result<OverrideHandle, RegistryError> {
        let key = identity.clone();
        let (seq, depth) = match self.slots.entry(identity) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                if self.config.strict_signatures {
                    if let Some(top) = slot.top() {
                        check_signature(slot.identity(), top.signature(), delegate.signature())?;
                    }
                }
                let seq = self.allocate_seq();
                slot.push(OverrideEntry::new(delegate, seq));
                (seq, slot.depth())
            }
            Entry::Vacant(vacant) => {
                let mut slot = OverrideSlot::new(key.clone());
                let seq = self.allocate_seq();
                slot.push(OverrideEntry::new(delegate, seq));
                vacant.insert(slot);
                (seq, 1)
            }
        };

        let handle = OverrideHandle { identity: key, seq };
        tracing::debug!(
            "Installed override #{} for {} (depth {})",
            seq,
            handle.identity,
            depth
        );
        Ok(handle)
    }

    /// Active delegate for `identity`, if any
    ///
    /// This is the hot path for every intercepted call: a single hash probe
    /// under a shard read lock, no allocation beyond an `Arc` clone.
    #[inline]
    #[must_use]
    pub fn lookup(&self, identity: &TargetIdentity) -> Option<Delegate> {
        let delegate = self
            .slots
            .get(identity)
            .and_then(|slot| slot.top().map(|entry| entry.delegate().clone()));
        if delegate.is_some() {
            tracing::trace!("Override hit for {}", identity);
        }
        delegate
    }

    /// Active delegate for `identity`, downcast to `D`
    ///
    /// # Errors
    /// - `RegistryError::IdentityConflict` if the active delegate is not a `D`
    pub fn lookup_typed<D>(&self, identity: &TargetIdentity) -> Result<Option<Arc<D>>, RegistryError>
    where
        D: Send + Sync + 'static,
    {
        let Some(delegate) = self.lookup(identity) else {
            return Ok(None);
        };
        match delegate.downcast::<D>() {
            Some(typed) => Ok(Some(typed)),
            None => {
                let err = RegistryError::IdentityConflict {
                    identity: identity.clone(),
                    installed: delegate.signature().type_name(),
                    requested: Signature::of::<D>().type_name(),
                };
                tracing::warn!("Rejected typed lookup: {}", err);
                Err(err)
            }
        }
    }

    /// Remove exactly the override `handle` names
    ///
    /// Emptied slots are removed from the map.
    ///
    /// # Errors
    /// - `RegistryError::ScopeViolation` if the entry is buried under a newer
    ///   install; the stack is left unchanged
    /// - `RegistryError::StaleHandle` if the entry is no longer installed
    pub fn uninstall(&self, handle: &OverrideHandle) -> Result<(), RegistryError> {
        let result = match self.slots.entry(handle.identity.clone()) {
            Entry::Vacant(_) => Err(RegistryError::StaleHandle {
                identity: handle.identity.clone(),
                seq: handle.seq,
            }),
            Entry::Occupied(mut occupied) => {
                let popped = occupied.get_mut().pop_if_top(handle.seq);
                if popped.is_ok() && occupied.get().is_empty() {
                    occupied.remove();
                }
                popped.map(|_| ())
            }
        };

        match &result {
            Ok(()) => tracing::debug!("Uninstalled override #{} for {}", handle.seq, handle.identity),
            Err(err) => tracing::warn!("Rejected uninstall: {}", err),
        }
        result
    }

    /// Clear every slot
    ///
    /// Returns the number of identities that had an active override. Safe to
    /// call on an empty registry. Handles issued before the reset become
    /// stale.
    pub fn reset_all(&self) -> usize {
        self.drain().len()
    }

    /// Clear every slot, listing exactly what was removed
    ///
    /// Each slot is recorded and removed under its shard lock, so an install
    /// racing with the drain is either listed and removed or left installed.
    pub fn drain(&self) -> RegistrySnapshot {
        let mut entries = Vec::new();
        self.slots.retain(|_, slot| {
            entries.extend(SnapshotEntry::of(slot));
            false
        });
        tracing::debug!("Reset override registry ({} identities cleared)", entries.len());
        RegistrySnapshot::sorted(entries)
    }

    /// Check if `identity` has an active override
    #[inline]
    #[must_use]
    pub fn contains(&self, identity: &TargetIdentity) -> bool {
        self.slots.contains_key(identity)
    }

    /// Number of stacked overrides for `identity`
    #[inline]
    #[must_use]
    pub fn depth(&self, identity: &TargetIdentity) -> usize {
        self.slots.get(identity).map_or(0, |slot| slot.depth())
    }

    /// Number of identities with an active override
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no override is installed anywhere
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Point-in-time listing of active overrides, sorted by identity
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::sorted(
            self.slots
                .iter()
                .filter_map(|slot| SnapshotEntry::of(&slot))
                .collect(),
        )
    }

    #[inline]
    fn allocate_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for OverrideRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn check_signature(
    identity: &TargetIdentity,
    installed: Signature,
    requested: Signature,
) -> Result<(), RegistryError> {
    if installed == requested {
        return Ok(());
    }
    let err = RegistryError::IdentityConflict {
        identity: identity.clone(),
        installed: installed.type_name(),
        requested: requested.type_name(),
    };
    tracing::warn!("Rejected install: {}", err);
    Err(err)
}

/// Serializable listing of active overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// One entry per identity with an active override
    pub entries: Vec<SnapshotEntry>,
}

impl RegistrySnapshot {
    fn sorted(mut entries: Vec<SnapshotEntry>) -> Self {
        entries.sort_by(|a, b| (&a.module, a.token).cmp(&(&b.module, b.token)));
        Self { entries }
    }

    /// Check if nothing was installed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of identities listed
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One active identity in a [`RegistrySnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Module identity string
    pub module: String,
    /// Function token
    pub token: u64,
    /// Stacked override count
    pub depth: usize,
    /// Type name of the active delegate
    pub delegate: String,
}

impl SnapshotEntry {
    fn of(slot: &OverrideSlot) -> Option<Self> {
        let top = slot.top()?;
        Some(Self {
            module: slot.identity().module().to_string(),
            token: slot.identity().token(),
            depth: slot.depth(),
            delegate: top.signature().type_name().to_string(),
        })
    }
}
