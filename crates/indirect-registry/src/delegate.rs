//! Type-erased replacement delegates
//!
//! The registry stores delegates without knowing their call shape. Each
//! [`Delegate`] remembers the concrete Rust type it was built from so a slot
//! can reject a delegate of a different shape and typed lookups can downcast.

use std::any::{self, Any, TypeId};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Concrete type of a delegate
#[derive(Clone, Copy)]
pub struct Signature {
    type_id: TypeId,
    type_name: &'static str,
}

impl Signature {
    /// Signature of `D`
    #[inline]
    #[must_use]
    pub fn of<D: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<D>(),
            type_name: any::type_name::<D>(),
        }
    }

    /// Type name (diagnostic only)
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Signature {}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Opaque replacement callable
///
/// Cheap to clone; clones share the same underlying value, so
/// [`Delegate::ptr_eq`] identifies "the same delegate" across lookups.
#[derive(Clone)]
pub struct Delegate {
    inner: Arc<dyn Any + Send + Sync>,
    signature: Signature,
}

impl Delegate {
    /// Erase a delegate value
    #[must_use]
    pub fn new<D>(value: D) -> Self
    where
        D: Send + Sync + 'static,
    {
        Self::from_arc(Arc::new(value))
    }

    /// Erase an already shared delegate value
    #[must_use]
    pub fn from_arc<D>(value: Arc<D>) -> Self
    where
        D: Send + Sync + 'static,
    {
        Self {
            inner: value,
            signature: Signature::of::<D>(),
        }
    }

    /// Concrete type of the delegate
    #[inline]
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Check the concrete type
    #[inline]
    #[must_use]
    pub fn is<D: 'static>(&self) -> bool {
        self.inner.is::<D>()
    }

    /// Recover the typed delegate, or `None` if `D` is not its type
    #[must_use]
    pub fn downcast<D>(&self) -> Option<Arc<D>>
    where
        D: Send + Sync + 'static,
    {
        Arc::clone(&self.inner).downcast::<D>().ok()
    }

    /// Check if both handles share one underlying delegate
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for Delegate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
