//! Process-wide rendezvous table
//!
//! Provides [`Rendezvous`], the well-known location every execution context
//! consults to find shared instances. "First writer wins, all readers
//! converge": construction is serialized per contract name, while published
//! entries are read from an atomically swapped snapshot without locking.
//!
//! A constructor may resolve other contracts through the same rendezvous. A
//! constructor that resolves its own contract fails with
//! [`BoundaryBindingError::ReentrantConstruction`].

use crate::contract::Contract;
use crate::error::BoundaryBindingError;
use arc_swap::ArcSwap;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::any::{self, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

static PROCESS: Lazy<Arc<Rendezvous>> = Lazy::new(|| Arc::new(Rendezvous::new()));

thread_local! {
    static CONSTRUCTING: RefCell<Vec<(usize, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a contract of one rendezvous as under construction on this thread
struct ConstructionMark((usize, &'static str));

impl ConstructionMark {
    fn enter(rendezvous: &Rendezvous, name: &'static str) -> Option<Self> {
        let key = (rendezvous as *const Rendezvous as usize, name);
        CONSTRUCTING.with(|marks| {
            let mut marks = marks.borrow_mut();
            if marks.contains(&key) {
                return None;
            }
            marks.push(key);
            Some(Self(key))
        })
    }
}

impl Drop for ConstructionMark {
    fn drop(&mut self) {
        CONSTRUCTING.with(|marks| {
            let mut marks = marks.borrow_mut();
            if let Some(pos) = marks.iter().rposition(|key| *key == self.0) {
                marks.remove(pos);
            }
        });
    }
}

type PendingCell = Arc<OnceCell<Published>>;

/// One published instance
#[derive(Clone)]
pub(crate) struct Published {
    version: u32,
    type_id: TypeId,
    type_name: &'static str,
    instance: Arc<dyn Any + Send + Sync>,
}

impl Published {
    fn new<C: Contract>(instance: Arc<C::Instance>) -> Self {
        Self {
            version: C::VERSION,
            type_id: TypeId::of::<C::Instance>(),
            type_name: any::type_name::<C::Instance>(),
            instance,
        }
    }

    /// Typed view for contract `C`, validating version and type
    pub(crate) fn bind<C: Contract>(&self) -> Result<Arc<C::Instance>, BoundaryBindingError> {
        if self.version != C::VERSION {
            return Err(BoundaryBindingError::IncompatibleContract {
                name: C::NAME,
                expected: C::VERSION,
                found: self.version,
            });
        }
        if self.type_id != TypeId::of::<C::Instance>() {
            return Err(self.type_mismatch::<C>());
        }
        Arc::clone(&self.instance)
            .downcast::<C::Instance>()
            .map_err(|_| self.type_mismatch::<C>())
    }

    fn type_mismatch<C: Contract>(&self) -> BoundaryBindingError {
        BoundaryBindingError::TypeMismatch {
            name: C::NAME,
            expected: any::type_name::<C::Instance>(),
            found: self.type_name,
        }
    }
}

impl std::fmt::Debug for Published {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Published")
            .field("version", &self.version)
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Table of published shared instances, keyed by contract name
pub struct Rendezvous {
    table: ArcSwap<HashMap<&'static str, Published>>,
    pending: Mutex<HashMap<&'static str, PendingCell>>,
}

impl Rendezvous {
    /// Create an empty, private rendezvous
    ///
    /// Only useful for tests that must not touch the process table; real
    /// callers go through [`Rendezvous::process`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide rendezvous
    #[must_use]
    pub fn process() -> Arc<Self> {
        Arc::clone(&PROCESS)
    }

    /// Shared instance for `C`, constructing and publishing it on first use
    ///
    /// # Errors
    /// - `BoundaryBindingError::IncompatibleContract` on version mismatch
    /// - `BoundaryBindingError::TypeMismatch` on instance type mismatch
    /// - `BoundaryBindingError::ConstructionPanicked` if `C::create` panicked
    /// - `BoundaryBindingError::ReentrantConstruction` if called from
    ///   within `C::create`
    pub fn resolve<C: Contract>(&self) -> Result<Arc<C::Instance>, BoundaryBindingError> {
        let result = match self.published::<C>() {
            Some(existing) => existing.bind::<C>(),
            None => self.publish::<C>(),
        };
        if let Err(err) = &result {
            tracing::error!("Boundary binding failed: {}", err);
        }
        result
    }

    /// Published record for `C`, if any (lock-free)
    pub(crate) fn published<C: Contract>(&self) -> Option<Published> {
        self.table.load().get(C::NAME).cloned()
    }

    /// Check if a contract name has been published
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.load().contains_key(name)
    }

    /// Names of every published contract
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.table.load().keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn publish<C: Contract>(&self) -> Result<Arc<C::Instance>, BoundaryBindingError> {
        let Some(_mark) = ConstructionMark::enter(self, C::NAME) else {
            return Err(BoundaryBindingError::ReentrantConstruction { name: C::NAME });
        };

        // Only the cell lookup is under the lock; construction runs per cell.
        let cell = Arc::clone(self.pending.lock().entry(C::NAME).or_default());
        cell.get_or_try_init(|| self.construct::<C>())?.bind::<C>()
    }

    fn construct<C: Contract>(&self) -> Result<Published, BoundaryBindingError> {
        let instance = panic::catch_unwind(AssertUnwindSafe(C::create)).map_err(|payload| {
            BoundaryBindingError::ConstructionPanicked {
                name: C::NAME,
                message: panic_message(payload.as_ref()),
            }
        })?;
        let published = Published::new::<C>(Arc::new(instance));

        self.table.rcu(|table| {
            let mut next = HashMap::clone(table);
            next.insert(C::NAME, published.clone());
            next
        });

        tracing::debug!(
            "Published shared instance {:?} v{} ({})",
            C::NAME,
            C::VERSION,
            any::type_name::<C::Instance>()
        );
        Ok(published)
    }
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Rendezvous {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rendezvous")
            .field("published", &self.names())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CREATED: AtomicUsize = AtomicUsize::new(0);

    struct Counted;
    impl Contract for Counted {
        type Instance = AtomicUsize;
        const NAME: &'static str = "tests::Counted";
        const VERSION: u32 = 1;
        fn create() -> AtomicUsize {
            AtomicUsize::new(0)
        }
    }

    struct CountedOnce;
    impl Contract for CountedOnce {
        type Instance = AtomicUsize;
        const NAME: &'static str = "tests::CountedOnce";
        const VERSION: u32 = 1;
        fn create() -> AtomicUsize {
            CREATED.fetch_add(1, Ordering::SeqCst);
            AtomicUsize::new(0)
        }
    }

    struct CountedV2;
    impl Contract for CountedV2 {
        type Instance = AtomicUsize;
        const NAME: &'static str = "tests::Counted";
        const VERSION: u32 = 2;
        fn create() -> AtomicUsize {
            AtomicUsize::new(0)
        }
    }

    struct Impostor;
    impl Contract for Impostor {
        type Instance = String;
        const NAME: &'static str = "tests::Counted";
        const VERSION: u32 = 1;
        fn create() -> String {
            String::new()
        }
    }

    struct Exploding;
    impl Contract for Exploding {
        type Instance = u8;
        const NAME: &'static str = "tests::Exploding";
        const VERSION: u32 = 1;
        fn create() -> u8 {
            panic!("boom")
        }
    }

    struct Inner;
    impl Contract for Inner {
        type Instance = u32;
        const NAME: &'static str = "tests::Inner";
        const VERSION: u32 = 1;
        fn create() -> u32 {
            7
        }
    }

    struct Outer;
    impl Contract for Outer {
        type Instance = (u32, Arc<u32>);
        const NAME: &'static str = "tests::Outer";
        const VERSION: u32 = 1;
        fn create() -> Self::Instance {
            let inner = Rendezvous::process().resolve::<Inner>().unwrap();
            (*inner + 1, inner)
        }
    }

    struct SelfReferential;
    impl Contract for SelfReferential {
        type Instance = Result<u8, BoundaryBindingError>;
        const NAME: &'static str = "tests::SelfReferential";
        const VERSION: u32 = 1;
        fn create() -> Self::Instance {
            Rendezvous::process().resolve::<SelfReferential>().map(|_| 0)
        }
    }

    #[test]
    fn constructor_may_resolve_another_contract() {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(Rendezvous::process().resolve::<Outer>());
        });

        let outer = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("nested resolution finished")
            .unwrap();
        assert_eq!(outer.0, 8);
        assert!(Arc::ptr_eq(
            &outer.1,
            &Rendezvous::process().resolve::<Inner>().unwrap()
        ));
    }

    #[test]
    fn constructor_resolving_itself_is_rejected() {
        let published = Rendezvous::process().resolve::<SelfReferential>().unwrap();
        assert_eq!(
            *published,
            Err(BoundaryBindingError::ReentrantConstruction {
                name: "tests::SelfReferential",
            })
        );
    }

    #[test]
    fn same_name_on_another_rendezvous_is_not_reentry() {
        // The constructor resolves the same name on the process rendezvous.
        let private = Rendezvous::new();
        assert_eq!(*private.resolve::<SelfReferential>().unwrap(), Ok(0));
    }

    #[test]
    fn retry_after_panicking_constructor_fails_again() {
        let rendezvous = Rendezvous::new();
        assert!(rendezvous.resolve::<Exploding>().is_err());
        assert!(matches!(
            rendezvous.resolve::<Exploding>(),
            Err(BoundaryBindingError::ConstructionPanicked { .. })
        ));
    }

    #[test]
    fn first_resolve_constructs_then_reuses() {
        let rendezvous = Rendezvous::new();
        let a = rendezvous.resolve::<CountedOnce>().unwrap();
        let b = rendezvous.resolve::<CountedOnce>().unwrap();
        a.fetch_add(5, Ordering::SeqCst);

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.load(Ordering::SeqCst), 5);
        assert_eq!(CREATED.load(Ordering::SeqCst), 1);
        assert!(rendezvous.contains("tests::CountedOnce"));
        assert_eq!(rendezvous.names(), vec!["tests::CountedOnce"]);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let rendezvous = Rendezvous::new();
        rendezvous.resolve::<Counted>().unwrap();

        assert_eq!(
            rendezvous.resolve::<CountedV2>().unwrap_err(),
            BoundaryBindingError::IncompatibleContract {
                name: "tests::Counted",
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let rendezvous = Rendezvous::new();
        rendezvous.resolve::<Counted>().unwrap();

        let err = rendezvous.resolve::<Impostor>().unwrap_err();
        assert!(matches!(err, BoundaryBindingError::TypeMismatch { .. }));
        assert_eq!(err.contract_name(), "tests::Counted");
    }

    #[test]
    fn panicking_constructor_publishes_nothing() {
        let rendezvous = Rendezvous::new();
        let err = rendezvous.resolve::<Exploding>().unwrap_err();

        assert_eq!(
            err,
            BoundaryBindingError::ConstructionPanicked {
                name: "tests::Exploding",
                message: "boom".to_string(),
            }
        );
        assert!(!rendezvous.contains("tests::Exploding"));
    }

    #[test]
    fn process_rendezvous_is_shared() {
        assert!(Arc::ptr_eq(&Rendezvous::process(), &Rendezvous::process()));
    }
}
